pub mod archive;
pub mod batch;
pub mod data;
pub mod error;
pub mod export;
pub mod layout;
pub mod tuner;
