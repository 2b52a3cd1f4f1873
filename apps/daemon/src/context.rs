//! Wiring of clients, storage and the sync service.

use std::sync::Arc;

use tracing::info;

use fiosync_bank_feed::FioClient;
use fiosync_core::sync::{SyncService, Tenant};
use fiosync_core::SyncConfig;
use fiosync_ledger_client::LedgerClient;
use fiosync_storage_sqlite::SqliteCheckpointStore;

pub struct ServiceContext {
    pub sync_service: SyncService,
    pub checkpoint_store: Arc<SqliteCheckpointStore>,
    pub checkpoint_namespace: String,
}

impl ServiceContext {
    pub fn new(config: &SyncConfig) -> anyhow::Result<Self> {
        let pool = fiosync_storage_sqlite::init(&config.database_url)?;
        let checkpoint_store = Arc::new(SqliteCheckpointStore::new(pool));
        let ledger = Arc::new(LedgerClient::new(&config.ledger_url, &config.tenant)?);
        let bank_feed = Arc::new(FioClient::new(&config.fio_url)?);

        let tenant = Tenant::new(config, ledger, checkpoint_store.clone());
        let sync_service = SyncService::new(bank_feed, tenant, config.jobs.clone());

        Ok(Self {
            sync_service,
            checkpoint_store,
            checkpoint_namespace: config.checkpoint_namespace.clone(),
        })
    }

    /// Logs the stored checkpoint of every configured account.
    pub fn log_checkpoints(&self) -> anyhow::Result<()> {
        let stored = self
            .checkpoint_store
            .list_checkpoints(&self.checkpoint_namespace)?;
        for job in self.sync_service.jobs() {
            let checkpoint = stored
                .iter()
                .find(|c| c.account_number == job.account_number)
                .map(|c| c.last_transaction_id);
            info!(
                "Account {} starts from checkpoint {:?}",
                job.account_number, checkpoint
            );
        }
        Ok(())
    }
}
