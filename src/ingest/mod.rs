pub mod client;
pub mod error;
pub mod ingester;
pub mod response;
