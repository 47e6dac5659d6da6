pub mod client_config;
pub mod default_config;

pub use client_config::ClientConfig;
pub use default_config::config_from_env;
