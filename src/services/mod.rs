pub mod auth;
pub mod logger;
pub mod request_executor;
pub mod test_runner;
pub mod tool_executor;
pub mod transport;
pub mod validation;
pub mod validators;
