use crate::entities::{order, order_item};
use async_trait::async_trait;
use chrono::Utc;
use common::config::{Config, StorageKind};
use order_api::model::{NewOrder, Order, OrderId, OrderItem, sort_newest_first};
use order_api::storage::{InMemoryOrderStorage, OrderStorage};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, EntityTrait,
    LoaderTrait, ModelTrait, NotSet, QueryFilter, QueryOrder, Schema, Set, TransactionTrait,
};
use std::{error::Error, sync::Arc};
use tracing::{debug, info};

/// SeaORM-backed order storage over the `orders` and `order_items` tables.
pub struct SeaOrmOrderStorage {
    pub db: DatabaseConnection,
}

impl SeaOrmOrderStorage {
    /// Connects and makes sure both tables exist.
    pub async fn new(database_url: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let db = Database::connect(database_url).await?;
        let storage = Self::from_connection(db);
        storage.setup_schema().await?;
        Ok(storage)
    }

    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates `orders` and `order_items` from the entities unless present.
    pub async fn setup_schema(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let backend = self.db.get_database_backend();
        let schema = Schema::new(backend);

        let mut orders = schema.create_table_from_entity(order::Entity);
        orders.if_not_exists();
        self.db.execute(backend.build(&orders)).await?;

        let mut order_items = schema.create_table_from_entity(order_item::Entity);
        order_items.if_not_exists();
        self.db.execute(backend.build(&order_items)).await?;

        debug!("Order tables ready");
        Ok(())
    }

    async fn load_items(
        conn: &DatabaseConnection,
        order: &order::Model,
    ) -> Result<Vec<order_item::Model>, Box<dyn Error + Send + Sync>> {
        Ok(order
            .find_related(order_item::Entity)
            .order_by_asc(order_item::Column::Id)
            .all(conn)
            .await?)
    }
}

fn to_order(order: order::Model, mut items: Vec<order_item::Model>) -> Order {
    items.sort_by_key(|item| item.id);
    Order {
        id: order.id,
        customer_name: order.customer_name,
        items: items
            .into_iter()
            .map(|item| OrderItem {
                id: item.id,
                order_id: item.order_id,
                cocktail_id: item.cocktail_id,
                quantity: item.quantity,
                price: item.price,
            })
            .collect(),
        total_price: order.total_price,
        status: order.status,
        created_at: order.created_at,
        updated_at: order.updated_at,
    }
}

#[async_trait]
impl OrderStorage for SeaOrmOrderStorage {
    async fn create_order(
        &self,
        new_order: &NewOrder,
    ) -> Result<Order, Box<dyn Error + Send + Sync>> {
        let txn = self.db.begin().await?;
        let now = Utc::now();

        let order = order::ActiveModel {
            id: NotSet,
            customer_name: Set(new_order.customer_name.clone()),
            total_price: Set(new_order.total_price),
            status: Set(new_order.status.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let mut items = Vec::with_capacity(new_order.items.len());
        for item in &new_order.items {
            let saved = order_item::ActiveModel {
                id: NotSet,
                order_id: Set(order.id),
                cocktail_id: Set(item.cocktail_id.clone()),
                quantity: Set(item.quantity),
                price: Set(item.price),
            }
            .insert(&txn)
            .await?;
            items.push(saved);
        }

        txn.commit().await?;
        info!(order_id = order.id, "Saved order with {} items", items.len());
        Ok(to_order(order, items))
    }

    async fn list_orders(&self) -> Result<Vec<Order>, Box<dyn Error + Send + Sync>> {
        let orders = order::Entity::find()
            .order_by_desc(order::Column::CreatedAt)
            .order_by_desc(order::Column::Id)
            .all(&self.db)
            .await?;
        let items = orders.load_many(order_item::Entity, &self.db).await?;

        let mut result: Vec<Order> = orders
            .into_iter()
            .zip(items)
            .map(|(order, items)| to_order(order, items))
            .collect();
        sort_newest_first(&mut result);
        Ok(result)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, Box<dyn Error + Send + Sync>> {
        let Some(order) = order::Entity::find_by_id(id).one(&self.db).await? else {
            debug!(order_id = id, "Order not found");
            return Ok(None);
        };
        let items = Self::load_items(&self.db, &order).await?;
        Ok(Some(to_order(order, items)))
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: &str,
    ) -> Result<Option<Order>, Box<dyn Error + Send + Sync>> {
        let Some(existing) = order::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active: order::ActiveModel = existing.into();
        active.status = Set(status.to_string());
        active.updated_at = Set(Utc::now());
        let updated = active.update(&self.db).await?;

        let items = Self::load_items(&self.db, &updated).await?;
        Ok(Some(to_order(updated, items)))
    }

    async fn delete_order(&self, id: OrderId) -> Result<bool, Box<dyn Error + Send + Sync>> {
        let txn = self.db.begin().await?;
        order_item::Entity::delete_many()
            .filter(order_item::Column::OrderId.eq(id))
            .exec(&txn)
            .await?;
        let deleted = order::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(deleted.rows_affected > 0)
    }
}

/// Opens the storage backend selected in the config.
pub async fn open_storage(
    config: &Config,
) -> Result<Arc<dyn OrderStorage>, Box<dyn Error + Send + Sync>> {
    match config.backend.storage {
        StorageKind::Database => {
            info!("Using database storage");
            Ok(Arc::new(SeaOrmOrderStorage::new(&config.common.database_url).await?))
        }
        StorageKind::Memory => {
            info!("Using in-memory storage, orders are lost on restart");
            Ok(Arc::new(InMemoryOrderStorage::new()))
        }
    }
}
