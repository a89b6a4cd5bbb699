// src/models.rs

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Category {
    Electronics,
    Clothing,
    Food,
    Books,
    Other,
}

impl Category {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Electronics" => Some(Self::Electronics),
            "Clothing" => Some(Self::Clothing),
            "Food" => Some(Self::Food),
            "Books" => Some(Self::Books),
            "Other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Electronics => "Electronics",
            Self::Clothing => "Clothing",
            Self::Food => "Food",
            Self::Books => "Books",
            Self::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(Self::Pending),
            "Processing" => Some(Self::Processing),
            "Shipped" => Some(Self::Shipped),
            "Delivered" => Some(Self::Delivered),
            "Cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(Self::Pending),
            "Completed" => Some(Self::Completed),
            "Failed" => Some(Self::Failed),
            "Refunded" => Some(Self::Refunded),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::Refunded => "Refunded",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PaymentMethod {
    CreditCard,
    DebitCard,
    PayPal,
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreditCard => "CreditCard",
            Self::DebitCard => "DebitCard",
            Self::PayPal => "PayPal",
            Self::Cash => "Cash",
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: Option<Category>,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
}

/// Partial product projection attached to resolved order items. Which
/// optional fields are filled depends on the endpoint: list views carry
/// name/price/category, the single-order view everything, recent-orders
/// only name/category.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: i32,
    pub quantity: i32,
    pub price: f64,
    /// None when the reference is unresolved or the product was deleted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i32,
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Partial order projection attached to payments.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: i32,
    pub order_number: String,
    pub customer_name: String,
    pub total_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: i32,
    pub order_id: i32,
    pub customer_name: String,
    pub customer_email: String,
    pub amount: f64,
    pub payment_method: PaymentMethod,
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderSummary>,
}

// ---------- request bodies ----------

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: Option<Category>,
    pub stock: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<Category>,
    pub stock: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    pub product_id: i32,
    pub quantity: i32,
    pub price: f64,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub customer_name: String,
    pub customer_email: String,
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
    pub total_amount: f64,
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub order_id: i32,
    pub customer_name: String,
    pub customer_email: String,
    pub amount: f64,
    pub payment_method: PaymentMethod,
    pub status: Option<PaymentStatus>,
    pub transaction_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPaymentRequest {
    pub transaction_id: Option<String>,
}

// ---------- helpers ----------

/// Format: ORD-YYYYMMDD-XXXX. The 4-digit suffix is random; collisions are
/// not checked for, the unique index on order_number surfaces them as an
/// insert error. Known weak uniqueness guarantee.
pub fn generate_order_number() -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix: u32 = rand::thread_rng().gen_range(0..10_000);
    format!("ORD-{date}-{suffix:04}")
}

/// Accepts something@something.tld with no whitespace anywhere. Deliberately
/// loose, actual deliverability is the mail provider's problem.
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_number_format() {
        let n = generate_order_number();
        assert_eq!(n.len(), "ORD-20240101-0000".len());
        assert!(n.starts_with("ORD-"));
        let date = &n[4..12];
        assert!(date.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(&n[12..13], "-");
        let suffix = &n[13..];
        assert_eq!(suffix.len(), 4);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("alice@example.com"));
        assert!(is_valid_email("a.b+c@mail.example.org"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("alice@nodot"));
        assert!(!is_valid_email("alice@example."));
        assert!(!is_valid_email("alice @example.com"));
    }

    #[test]
    fn enum_round_trips() {
        for s in ["Pending", "Processing", "Shipped", "Delivered", "Cancelled"] {
            assert_eq!(OrderStatus::parse(s).unwrap().as_str(), s);
        }
        for s in ["Pending", "Completed", "Failed", "Refunded"] {
            assert_eq!(PaymentStatus::parse(s).unwrap().as_str(), s);
        }
        for s in ["Electronics", "Clothing", "Food", "Books", "Other"] {
            assert_eq!(Category::parse(s).unwrap().as_str(), s);
        }
        assert!(OrderStatus::parse("Unknown").is_none());
        assert!(PaymentStatus::parse("").is_none());
    }

    #[test]
    fn payment_method_json_names() {
        let m: PaymentMethod = serde_json::from_str("\"CreditCard\"").unwrap();
        assert_eq!(m, PaymentMethod::CreditCard);
        assert_eq!(
            serde_json::to_string(&PaymentMethod::PayPal).unwrap(),
            "\"PayPal\""
        );
    }
}
