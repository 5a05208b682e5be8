mod app_config;
mod providers;

pub use app_config::AppConfig;
pub use providers::{ProvidersConfig, ResolvedService};
