pub mod error;
pub mod filter;
pub mod memory;
pub mod postgres;
pub mod traits;

pub use error::StoreError;
pub use filter::{BedroomFilter, PropertyFilter, SearchParams};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use traits::{IntakeStore, MarketStore, PartnerStore, PropertyStore, RateStore, SocietyStore};
