use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use tracing::{error, info};
use url::Url;

/// Body of the admin callback: `{"orders": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminUpdate {
    pub orders: Vec<Value>,
}

impl AdminUpdate {
    pub fn from_items<T: Serialize>(items: &[T]) -> Result<Self, serde_json::Error> {
        let orders = items
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { orders })
    }
}

/// Pushes the current order list to the admin frontend.
#[async_trait]
pub trait AdminNotifier: Send + Sync {
    async fn notify(&self, update: &AdminUpdate) -> Result<(), Box<dyn Error + Send + Sync>>;
}

pub struct HttpAdminNotifier {
    client: reqwest::Client,
    admin_url: Url,
}

impl HttpAdminNotifier {
    pub fn new(admin_url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            admin_url,
        }
    }

    pub fn admin_url(&self) -> &Url {
        &self.admin_url
    }
}

#[async_trait]
impl AdminNotifier for HttpAdminNotifier {
    async fn notify(&self, update: &AdminUpdate) -> Result<(), Box<dyn Error + Send + Sync>> {
        info!(
            admin_url = %self.admin_url,
            order_count = update.orders.len(),
            "Sending orders to admin page"
        );
        let response = self
            .client
            .post(self.admin_url.clone())
            .json(update)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("Admin page update failed with {}: {}", status, body).into());
        }
        info!("Admin page updated");
        Ok(())
    }
}

/// Used when notifications are switched off in the config.
pub struct DisabledNotifier;

#[async_trait]
impl AdminNotifier for DisabledNotifier {
    async fn notify(&self, _update: &AdminUpdate) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}

/// Sends `items` to the admin page. Failures are logged and swallowed; the
/// caller's request never fails because of the admin page.
pub async fn notify_admin<T: Serialize>(notifier: &dyn AdminNotifier, items: &[T]) {
    let update = match AdminUpdate::from_items(items) {
        Ok(update) => update,
        Err(e) => {
            error!(error = %e, "Failed to encode admin update");
            return;
        }
    };
    if let Err(e) = notifier.notify(&update).await {
        error!(error = %e, "Admin page notification failed");
    }
}
