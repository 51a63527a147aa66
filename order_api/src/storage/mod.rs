pub mod in_memory;

pub use in_memory::InMemoryOrderStorage;

use crate::model::{NewOrder, Order, OrderId};
use async_trait::async_trait;
use std::error::Error;

/// Persistence seam for orders.
///
/// Unknown ids are reported through `Option`/`bool` rather than errors; an
/// `Err` always means the backend itself failed.
#[async_trait]
pub trait OrderStorage: Send + Sync {
    /// Persists the order together with its items as one unit.
    async fn create_order(&self, order: &NewOrder) -> Result<Order, Box<dyn Error + Send + Sync>>;

    /// All orders, most recently created first.
    async fn list_orders(&self) -> Result<Vec<Order>, Box<dyn Error + Send + Sync>>;

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, Box<dyn Error + Send + Sync>>;

    /// Stores `status` verbatim and refreshes `updated_at`.
    async fn update_status(
        &self,
        id: OrderId,
        status: &str,
    ) -> Result<Option<Order>, Box<dyn Error + Send + Sync>>;

    /// Removes the order and its items. Returns `false` when the id is unknown.
    async fn delete_order(&self, id: OrderId) -> Result<bool, Box<dyn Error + Send + Sync>>;
}
