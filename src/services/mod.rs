// Service exports
pub mod cache;
pub mod crm;
pub mod export;
pub mod postgres;
pub mod rates;

pub use cache::{CacheError, CacheKey, CacheManager};
pub use crm::{CrmClient, CrmError};
pub use export::{matches_to_csv, rates_to_csv, ExportError};
pub use postgres::{LinkStats, PostgresClient, PostgresError, RateSnapshot};
pub use rates::{RatesClient, RatesError};
