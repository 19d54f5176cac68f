pub mod schema;

pub use schema::{resolve_config_dir, AssistantConfig, Config};
