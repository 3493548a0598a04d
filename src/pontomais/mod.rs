pub mod client;
pub mod models;

use async_trait::async_trait;

use crate::error::RemoteError;
pub use client::PontoMaisClient;
pub use models::{Employee, TimeBalanceEntry};

/// The slice of the HR API the bot depends on.
///
/// `create_time_balance_entry` is not idempotent: two calls with the same
/// entry produce two ledger rows. Nothing in the bot retries it.
#[async_trait]
pub trait HrApi: Send + Sync {
    async fn list_employees(&self) -> Result<Vec<Employee>, RemoteError>;

    async fn create_time_balance_entry(&self, entry: &TimeBalanceEntry) -> Result<(), RemoteError>;

    async fn update_time_balance_entry(
        &self,
        entry_id: &str,
        entry: &TimeBalanceEntry,
    ) -> Result<(), RemoteError>;
}
