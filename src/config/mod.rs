pub mod toml_config;

use crate::domain::model::SetType;

pub const DEFAULT_ENDPOINT: &str = "sets";
pub const DEFAULT_EXCLUDED_TYPES: &[SetType] = &[SetType::Funny, SetType::Memorabilia];

#[cfg(feature = "cli")]
pub use cli_config::CliConfig;

#[cfg(feature = "cli")]
mod cli_config {
    use super::DEFAULT_ENDPOINT;
    use crate::adapters::http::{DEFAULT_API_BASE, DEFAULT_USER_AGENT};
    use crate::core::ConfigProvider;
    use crate::domain::model::SetType;
    use crate::utils::error::Result;
    use crate::utils::validation::{self, Validate};
    use clap::Parser;
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "set-archive")]
    #[command(about = "Ingest catalog sets and their icons into a local SQLite archive")]
    pub struct CliConfig {
        #[arg(long, help = "TOML configuration file; replaces the source/filter/output flags")]
        pub config: Option<String>,

        #[arg(long, default_value = DEFAULT_API_BASE)]
        pub api_base: String,

        #[arg(long, default_value = DEFAULT_ENDPOINT)]
        pub endpoint: String,

        #[arg(long, default_value = DEFAULT_USER_AGENT)]
        pub user_agent: String,

        #[arg(long, default_value = "100", help = "Pause before every request, in milliseconds")]
        pub throttle_ms: u64,

        #[arg(long)]
        pub timeout_seconds: Option<u64>,

        #[arg(
            long,
            value_delimiter = ',',
            value_parser = parse_set_type,
            default_values_t = [SetType::Funny, SetType::Memorabilia]
        )]
        pub exclude_types: Vec<SetType>,

        #[arg(long, help = "Keep digital-only sets")]
        pub keep_digital: bool,

        #[arg(long, default_value = "./data")]
        pub icon_root: String,

        #[arg(long, default_value = "archive.db")]
        pub database: String,

        #[arg(long, help = "Emit JSON log lines")]
        pub json_logs: bool,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,
    }

    fn parse_set_type(tag: &str) -> std::result::Result<SetType, String> {
        SetType::parse_known(tag.trim()).ok_or_else(|| {
            let known: Vec<&str> = SetType::ALL.iter().map(SetType::as_str).collect();
            format!("unknown set type '{}', expected one of: {}", tag, known.join(", "))
        })
    }

    impl ConfigProvider for CliConfig {
        fn api_base(&self) -> &str {
            &self.api_base
        }

        fn sets_endpoint(&self) -> &str {
            &self.endpoint
        }

        fn user_agent(&self) -> &str {
            &self.user_agent
        }

        fn throttle(&self) -> Duration {
            Duration::from_millis(self.throttle_ms)
        }

        fn request_timeout(&self) -> Option<Duration> {
            self.timeout_seconds.map(Duration::from_secs)
        }

        fn exclude_types(&self) -> &[SetType] {
            &self.exclude_types
        }

        fn exclude_digital(&self) -> bool {
            !self.keep_digital
        }

        fn icon_root(&self) -> &str {
            &self.icon_root
        }

        fn database_path(&self) -> &str {
            &self.database
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validation::validate_url("api_base", &self.api_base)?;
            validation::validate_non_empty_string("endpoint", &self.endpoint)?;
            validation::validate_non_empty_string("user_agent", &self.user_agent)?;
            validation::validate_path("icon_root", &self.icon_root)?;
            validation::validate_path("database", &self.database)?;
            Ok(())
        }
    }

}
