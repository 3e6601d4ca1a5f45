mod repo;
mod repo_types;

pub use repo::{PgRecordStore, RecordStore, RecordStoreError};
pub use repo_types::StoredProductRow;
