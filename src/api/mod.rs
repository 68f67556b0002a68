pub mod extract;
pub mod response;

pub use extract::{ApiJson, ApiQuery};
pub use response::{ApiResponse, ApiResult};
