pub mod ownership;

pub use ownership::{OwnershipError, ProductOwnership};
