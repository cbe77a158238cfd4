pub mod application_settings;

pub use application_settings::{Secret, ServerConfig, Settings};
