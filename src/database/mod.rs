pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod sort;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryRepository;
pub use postgres::PgDocumentRepository;
pub use repository::{Document, Repository};
pub use sort::{SortDirection, SortError, SortOrder};
