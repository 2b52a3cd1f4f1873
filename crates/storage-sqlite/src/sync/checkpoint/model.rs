//! Database model for sync checkpoints.

use diesel::prelude::*;

#[derive(Queryable, Insertable, Selectable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::sync_checkpoints)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SyncCheckpointDB {
    pub namespace: String,
    pub account_number: String,
    pub last_transaction_id: i64,
    pub updated_at: String,
}
