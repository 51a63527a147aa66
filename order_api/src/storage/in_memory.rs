use crate::model::{NewOrder, Order, OrderId, OrderItem, sort_newest_first};
use crate::storage::OrderStorage;
use async_trait::async_trait;
use chrono::Utc;
use std::error::Error;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct Inner {
    orders: Vec<Order>,
    next_order_id: OrderId,
    next_item_id: OrderId,
}

/// Process-local order store. State is lost on restart.
#[derive(Default)]
pub struct InMemoryOrderStorage {
    inner: RwLock<Inner>,
}

impl InMemoryOrderStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStorage for InMemoryOrderStorage {
    async fn create_order(
        &self,
        new_order: &NewOrder,
    ) -> Result<Order, Box<dyn Error + Send + Sync>> {
        let mut inner = self.inner.write().await;
        inner.next_order_id += 1;
        let order_id = inner.next_order_id;

        let mut items = Vec::with_capacity(new_order.items.len());
        for item in &new_order.items {
            inner.next_item_id += 1;
            items.push(OrderItem {
                id: inner.next_item_id,
                order_id,
                cocktail_id: item.cocktail_id.clone(),
                quantity: item.quantity,
                price: item.price,
            });
        }

        let now = Utc::now();
        let order = Order {
            id: order_id,
            customer_name: new_order.customer_name.clone(),
            items,
            total_price: new_order.total_price,
            status: new_order.status.clone(),
            created_at: now,
            updated_at: now,
        };
        inner.orders.push(order.clone());
        debug!(order_id, "Stored order in memory");
        Ok(order)
    }

    async fn list_orders(&self) -> Result<Vec<Order>, Box<dyn Error + Send + Sync>> {
        let mut orders = self.inner.read().await.orders.clone();
        sort_newest_first(&mut orders);
        Ok(orders)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, Box<dyn Error + Send + Sync>> {
        let inner = self.inner.read().await;
        Ok(inner.orders.iter().find(|order| order.id == id).cloned())
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: &str,
    ) -> Result<Option<Order>, Box<dyn Error + Send + Sync>> {
        let mut inner = self.inner.write().await;
        Ok(inner.orders.iter_mut().find(|order| order.id == id).map(|order| {
            order.status = status.to_string();
            order.updated_at = Utc::now();
            order.clone()
        }))
    }

    async fn delete_order(&self, id: OrderId) -> Result<bool, Box<dyn Error + Send + Sync>> {
        let mut inner = self.inner.write().await;
        let before = inner.orders.len();
        inner.orders.retain(|order| order.id != id);
        Ok(inner.orders.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewOrderItem;

    fn new_order(customer_name: &str, cocktails: &[&str]) -> NewOrder {
        NewOrder {
            customer_name: customer_name.to_string(),
            total_price: 10.0 * cocktails.len() as f64,
            status: "pending".to_string(),
            items: cocktails
                .iter()
                .map(|cocktail_id| NewOrderItem {
                    cocktail_id: cocktail_id.to_string(),
                    quantity: 1,
                    price: 10.0,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_ids_to_order_and_items() {
        let storage = InMemoryOrderStorage::new();

        let first = storage.create_order(&new_order("Mina", &["mojito", "negroni"])).await.unwrap();
        let second = storage.create_order(&new_order("Joon", &["sour"])).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.items.len(), 2);
        assert!(first.items.iter().all(|item| item.order_id == first.id));
        assert_eq!(second.items[0].id, 3);
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let storage = InMemoryOrderStorage::new();
        for name in ["a", "b", "c"] {
            storage.create_order(&new_order(name, &["mojito"])).await.unwrap();
        }

        let names: Vec<_> = storage
            .list_orders()
            .await
            .unwrap()
            .into_iter()
            .map(|order| order.customer_name)
            .collect();

        assert_eq!(names, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_update_status_and_delete() {
        let storage = InMemoryOrderStorage::new();
        let order = storage.create_order(&new_order("Mina", &["mojito"])).await.unwrap();

        let updated = storage
            .update_status(order.id, "shaken, not stirred")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, "shaken, not stirred");
        assert!(updated.updated_at >= order.updated_at);

        assert!(storage.update_status(999, "completed").await.unwrap().is_none());
        assert!(!storage.delete_order(999).await.unwrap());
        assert_eq!(storage.list_orders().await.unwrap().len(), 1);

        assert!(storage.delete_order(order.id).await.unwrap());
        assert!(storage.get_order(order.id).await.unwrap().is_none());
    }
}
