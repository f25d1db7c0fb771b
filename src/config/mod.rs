//! Configuration management module

pub mod env;
pub mod parser;
pub mod presets;
pub mod validation;

pub use env::EnvManager;
pub use parser::{display_config_summary, load_config, ConfigParser, Destination};
pub use presets::{find_preset, Preset, PRESETS};
pub use validation::{validate_config, ConfigValidator, ValidationLevel, ValidationWarning};

pub use crate::models::Config;
