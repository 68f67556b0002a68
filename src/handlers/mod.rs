// One module per resource; routes are assembled in lib.rs
pub mod checks;
pub mod products;
pub mod system;
pub mod users;
