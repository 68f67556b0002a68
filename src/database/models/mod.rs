pub mod product;
pub mod user;

use serde::{Deserialize, Serialize};

pub use product::{Product, ProductPatch};
pub use user::{User, UserPatch};

/// Reference to another document by id, serialized as `{ "id": "..." }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: String,
}

impl EntityRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}
