pub mod entity;
pub mod holder;

pub use entity::{LogSection, ResolverConfig};
pub use holder::{
    ConfigError, default_config_path, get_or_init_config, load_config, read_or_create,
    try_set_config,
};
