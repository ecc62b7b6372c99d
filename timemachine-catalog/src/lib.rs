mod bundled;
mod error;
mod store;

pub use bundled::{BUNDLED_VERSION, DEFAULT_RECORD_ID, bundled_documents};
pub use error::CatalogError;
pub use store::{CatalogEntry, RecordStore};
