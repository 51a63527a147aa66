use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};

pub type OrderId = i64;

/// Lifecycle label of an order.
///
/// Only used for defaults and diagnostics: the stored status is free text and
/// any transition is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Preparing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_known(status: &str) -> bool {
        status.parse::<OrderStatus>().is_ok()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown order status: {}", s))
    }
}

/// Identifiers arrive from the frontend either as JSON strings or integers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Integer(i64),
}

pub fn deserialize_flexible_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Integer(id) => id.to_string(),
    })
}

fn default_status() -> String {
    OrderStatus::default().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrderItem {
    #[serde(deserialize_with = "deserialize_flexible_id")]
    pub cocktail_id: String,
    pub quantity: i32,
    pub price: f64,
}

/// Order submission payload. `total_price` is supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_name: String,
    pub total_price: f64,
    #[serde(default = "default_status")]
    pub status: String,
    pub items: Vec<NewOrderItem>,
}

impl NewOrder {
    /// Checks the constraints the JSON shape alone cannot express.
    pub fn validate(&self) -> Result<(), String> {
        let mut problems = Vec::new();

        if self.customer_name.trim().is_empty() {
            problems.push("customer_name must not be empty".to_string());
        }
        if !is_valid_amount(self.total_price) {
            problems.push(format!(
                "total_price must be a non-negative number, got {}",
                self.total_price
            ));
        }
        for (index, item) in self.items.iter().enumerate() {
            if item.cocktail_id.trim().is_empty() {
                problems.push(format!("items[{}].cocktail_id must not be empty", index));
            }
            if item.quantity <= 0 {
                problems.push(format!(
                    "items[{}].quantity must be positive, got {}",
                    index, item.quantity
                ));
            }
            if !is_valid_amount(item.price) {
                problems.push(format!(
                    "items[{}].price must be a non-negative number, got {}",
                    index, item.price
                ));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems.join("; "))
        }
    }

    /// Sum of price × quantity over the items.
    pub fn items_total(&self) -> f64 {
        self.items
            .iter()
            .map(|item| item.price * f64::from(item.quantity))
            .sum()
    }
}

fn is_valid_amount(amount: f64) -> bool {
    amount.is_finite() && amount >= 0.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderId,
    pub order_id: OrderId,
    pub cocktail_id: String,
    pub quantity: i32,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_name: String,
    pub items: Vec<OrderItem>,
    pub total_price: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Most recent first; equal timestamps fall back to the newer id.
pub fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

fn default_quantity() -> u32 {
    1
}

/// A line of the cookie-backed cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(deserialize_with = "deserialize_flexible_id")]
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AddToCartRequest {
    #[serde(deserialize_with = "deserialize_flexible_id")]
    pub id: String,
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub orders: Vec<CartLine>,
    #[serde(default)]
    pub customer_name: Option<String>,
}

pub const GUEST_CUSTOMER: &str = "guest";

impl PlaceOrderRequest {
    /// Turns the placed cart into an order submission. The total is computed
    /// from the lines since the cart carries none. Fails when a line quantity
    /// does not fit an order item.
    pub fn to_new_order(&self) -> Result<NewOrder, String> {
        let items = self
            .orders
            .iter()
            .enumerate()
            .map(|(index, line)| {
                let quantity = i32::try_from(line.quantity).map_err(|_| {
                    format!("orders[{}].quantity is too large, got {}", index, line.quantity)
                })?;
                Ok(NewOrderItem {
                    cocktail_id: line.id.clone(),
                    quantity,
                    price: line.price,
                })
            })
            .collect::<Result<Vec<_>, String>>()?;
        let customer_name = self
            .customer_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(GUEST_CUSTOMER)
            .to_string();

        let mut order = NewOrder {
            customer_name,
            total_price: 0.0,
            status: default_status(),
            items,
        };
        order.total_price = order.items_total();
        Ok(order)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedOrderResponse {
    pub message: String,
    pub order: Order,
}
