pub mod config;
pub mod types;

pub use config::OperatorSettings;
pub use types::*;
