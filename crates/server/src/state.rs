use std::sync::Arc;

use sea_orm::DatabaseConnection;
use service::db::booking_service::BookingPolicy;

/// Shared handler state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub policy: Arc<BookingPolicy>,
    pub booking: Arc<configs::BookingConfig>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, booking: configs::BookingConfig) -> anyhow::Result<Self> {
        let policy = BookingPolicy::from_config(&booking).map_err(|e| anyhow::anyhow!("booking config: {}", e))?;
        Ok(Self { db, policy: Arc::new(policy), booking: Arc::new(booking) })
    }
}
