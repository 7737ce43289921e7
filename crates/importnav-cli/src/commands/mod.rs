pub mod config;
pub mod explain;
pub mod resolve;
pub mod version;
