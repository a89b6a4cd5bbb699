use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::auth::register,
        crate::api::auth::login,
        crate::api::products::create_product,
        crate::api::products::list_products,
        crate::api::products::search_products,
        crate::api::products::low_stock_products,
        crate::api::products::get_product,
        crate::api::products::update_product,
        crate::api::products::delete_product,
        crate::api::orders::create_order,
        crate::api::orders::list_orders,
        crate::api::orders::orders_by_customer,
        crate::api::orders::get_order,
        crate::api::orders::update_order_status,
        crate::api::orders::cancel_order,
        crate::api::payments::create_payment,
        crate::api::payments::list_payments,
        crate::api::payments::payment_by_order,
        crate::api::payments::payments_by_status,
        crate::api::payments::process_payment,
        crate::api::payments::get_payment,
        crate::api::analytics::products_count,
        crate::api::analytics::products_by_category,
        crate::api::analytics::inventory_value,
        crate::api::analytics::order_stats,
        crate::api::analytics::orders_by_status,
        crate::api::analytics::recent_orders,
        crate::api::analytics::top_products,
        crate::api::analytics::payments_by_method,
        crate::api::analytics::payment_success_rate,
        crate::api::analytics::revenue_by_status,
        crate::api::analytics::daily_revenue
    ),
    components(
        schemas(
            crate::api::auth::RegisterRequest,
            crate::api::auth::LoginRequest,
            crate::api::auth::AuthResponse,
            crate::models::Category,
            crate::models::OrderStatus,
            crate::models::PaymentStatus,
            crate::models::PaymentMethod,
            crate::models::Product,
            crate::models::ProductSummary,
            crate::models::Order,
            crate::models::OrderItem,
            crate::models::OrderSummary,
            crate::models::Payment,
            crate::models::CreateProductRequest,
            crate::models::UpdateProductRequest,
            crate::models::OrderItemInput,
            crate::models::CreateOrderRequest,
            crate::models::CreatePaymentRequest,
            crate::models::UpdateOrderStatusRequest,
            crate::models::ProcessPaymentRequest,
            crate::db::analytics::CategoryStats,
            crate::db::analytics::InventoryValue,
            crate::db::analytics::OrderStats,
            crate::db::analytics::OrderStatusStats,
            crate::db::analytics::TopProduct,
            crate::db::analytics::MethodStats,
            crate::db::analytics::PaymentSuccessRate,
            crate::db::analytics::PaymentStatusRevenue,
            crate::db::analytics::DailyRevenue
        )
    ),
    tags(
        (name = "auth", description = "Authentication"),
        (name = "products", description = "Product catalog"),
        (name = "orders", description = "Order lifecycle"),
        (name = "payments", description = "Payment lifecycle"),
        (name = "analytics", description = "Admin reporting")
    )
)]
pub struct ApiDoc;
