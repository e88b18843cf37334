pub mod schema;
pub mod store;

pub use store::{Store, StoreSample, StoreStats};
