//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or built-in profile
//!     → loader.rs / presets.rs (parse & deserialize, or construct)
//!     → validation.rs (semantic checks)
//!     → Settings (validated, immutable)
//!     → one ProxyConfig handed to each proxy instance
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no hot reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod presets;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use presets::Profile;
pub use schema::BackendConfig;
pub use schema::ListenerConfig;
pub use schema::LogFormat;
pub use schema::ObservabilityConfig;
pub use schema::ProxyConfig;
pub use schema::RoutesConfig;
pub use schema::Settings;
