use cocktail::entities::order_item;
use cocktail::{SeaOrmOrderStorage, open_storage};
use common::config::{Config, StorageKind};
use common::generate_unique_id;
use common::test_helpers::{TestResult, create_test_connection};
use order_api::model::{NewOrder, NewOrderItem};
use order_api::storage::OrderStorage;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

async fn setup_storage() -> TestResult<SeaOrmOrderStorage> {
    let storage = SeaOrmOrderStorage::from_connection(create_test_connection().await?);
    storage.setup_schema().await?;
    Ok(storage)
}

fn new_order(customer_name: &str, cocktails: &[(&str, i32, f64)]) -> NewOrder {
    let items: Vec<NewOrderItem> = cocktails
        .iter()
        .map(|(cocktail_id, quantity, price)| NewOrderItem {
            cocktail_id: cocktail_id.to_string(),
            quantity: *quantity,
            price: *price,
        })
        .collect();
    let total_price = items.iter().map(|item| f64::from(item.quantity) * item.price).sum();
    NewOrder {
        customer_name: customer_name.to_string(),
        total_price,
        status: "pending".to_string(),
        items,
    }
}

#[tokio::test]
async fn test_create_order_persists_every_item() -> TestResult {
    let storage = setup_storage().await?;

    let created = storage
        .create_order(&new_order(
            "Mina",
            &[("mojito", 2, 8.0), ("negroni", 1, 10.0), ("sour", 4, 7.5)],
        ))
        .await?;
    assert_eq!(created.items.len(), 3);
    assert_eq!(created.total_price, 56.0);
    assert!(created.items.iter().all(|item| item.order_id == created.id));

    let loaded = storage.get_order(created.id).await?.expect("order should exist");
    assert_eq!(loaded.items.len(), 3);
    let cocktails: Vec<_> = loaded.items.iter().map(|item| item.cocktail_id.as_str()).collect();
    assert_eq!(cocktails, vec!["mojito", "negroni", "sour"]);
    assert_eq!(loaded.status, "pending");
    Ok(())
}

#[tokio::test]
async fn test_setup_schema_is_idempotent() -> TestResult {
    let storage = setup_storage().await?;
    let customer = generate_unique_id("customer");
    storage.create_order(&new_order(&customer, &[("mojito", 1, 8.0)])).await?;

    storage.setup_schema().await?;
    let orders = storage.list_orders().await?;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].customer_name, customer);
    Ok(())
}

#[tokio::test]
async fn test_list_orders_newest_first() -> TestResult {
    let storage = setup_storage().await?;
    let mut ids = Vec::new();
    for name in ["first", "second", "third"] {
        ids.push(storage.create_order(&new_order(name, &[("mojito", 1, 8.0)])).await?.id);
    }

    let orders = storage.list_orders().await?;
    let listed: Vec<_> = orders.iter().map(|order| order.id).collect();
    ids.reverse();
    assert_eq!(listed, ids);
    assert!(orders.iter().all(|order| order.items.len() == 1));
    Ok(())
}

#[tokio::test]
async fn test_update_status_stores_exact_string() -> TestResult {
    let storage = setup_storage().await?;
    let created = storage.create_order(&new_order("Joon", &[("sour", 1, 9.0)])).await?;

    let updated = storage
        .update_status(created.id, "waiting for ice")
        .await?
        .expect("order should exist");
    assert_eq!(updated.status, "waiting for ice");
    assert!(updated.updated_at >= created.updated_at);
    assert_eq!(updated.items.len(), 1);

    let reloaded = storage.get_order(created.id).await?.expect("order should exist");
    assert_eq!(reloaded.status, "waiting for ice");
    Ok(())
}

#[tokio::test]
async fn test_unknown_order_lookups() -> TestResult {
    let storage = setup_storage().await?;
    storage.create_order(&new_order("Mina", &[("mojito", 1, 8.0)])).await?;

    assert!(storage.get_order(999).await?.is_none());
    assert!(storage.update_status(999, "completed").await?.is_none());
    assert!(!storage.delete_order(999).await?);
    assert_eq!(storage.list_orders().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_delete_order_removes_its_items() -> TestResult {
    let storage = setup_storage().await?;
    let doomed = storage
        .create_order(&new_order("Mina", &[("mojito", 2, 8.0), ("negroni", 1, 10.0)]))
        .await?;
    let kept = storage.create_order(&new_order("Joon", &[("sour", 1, 9.0)])).await?;

    assert!(storage.delete_order(doomed.id).await?);
    assert!(storage.get_order(doomed.id).await?.is_none());

    let orphaned = order_item::Entity::find()
        .filter(order_item::Column::OrderId.eq(doomed.id))
        .count(&storage.db)
        .await?;
    assert_eq!(orphaned, 0);

    let remaining = storage.get_order(kept.id).await?.expect("other order survives");
    assert_eq!(remaining.items.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_open_storage_memory_backend() -> TestResult {
    let mut config = Config::default();
    config.backend.storage = StorageKind::Memory;

    let storage = open_storage(&config).await?;
    let created = storage.create_order(&new_order("Mina", &[("mojito", 1, 8.0)])).await?;
    assert_eq!(storage.get_order(created.id).await?.map(|order| order.id), Some(created.id));
    Ok(())
}

#[tokio::test]
async fn test_open_storage_database_backend() -> TestResult {
    let mut config = Config::default();
    config.common.database_url = "sqlite::memory:".to_string();

    let storage = open_storage(&config).await?;
    assert!(storage.list_orders().await?.is_empty());
    Ok(())
}
