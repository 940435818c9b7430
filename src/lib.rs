pub mod app;

pub use app::Application;
pub use rozgar_config::AppConfig;
pub use rozgar_errors::{RozgarError, RozgarResult};

#[cfg(test)]
mod integration_tests;
