pub mod client;
pub mod credentials;
pub mod http_client;
pub mod prompts;
pub mod response;
pub mod types;

pub use client::*;
pub use credentials::*;
pub use response::{validate_response, ResponseError};
pub use types::*;
