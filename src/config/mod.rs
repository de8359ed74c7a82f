//! Settings merge system
//!
//! Patch settings are built from three layers, later layers winning:
//! 1. Built-in defaults
//! 2. Settings file (TOML, or JSON for `settings.json`-style files)
//! 3. CLI flags

mod defaults;
mod effective;
mod merge;

pub use defaults::BuiltinDefaults;
pub use effective::{ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig};
pub use merge::{deep_merge, merge_layers};
