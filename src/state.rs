use std::sync::Arc;

use crate::config::StorageBackend;
use crate::database::models::{Product, User};
use crate::database::{DatabaseManager, MemoryRepository, PgDocumentRepository, Repository};

/// Shared handler state: one repository per collection
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn Repository<User>>,
    pub products: Arc<dyn Repository<Product>>,
    pub backend: StorageBackend,
}

impl AppState {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryRepository::<User>::new()),
            products: Arc::new(MemoryRepository::<Product>::new()),
            backend: StorageBackend::Memory,
        }
    }

    pub fn postgres(manager: &DatabaseManager) -> Self {
        Self {
            users: Arc::new(PgDocumentRepository::<User>::new(manager.pool())),
            products: Arc::new(PgDocumentRepository::<Product>::new(manager.pool())),
            backend: StorageBackend::Postgres,
        }
    }
}
