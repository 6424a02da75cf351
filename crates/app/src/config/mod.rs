use clap::Args;
use serde::Deserialize;

use crate::error::{AppError, Result};

const DEFAULT_CONFIG_PATH: &str = "config/roomies.toml";
const ENV_PREFIX: &str = "ROOMIES";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ledger_path: String,
    pub level: String,
    pub tax_rate: f64,
    /// Member id acting on the ledger when `--member` is not given.
    pub member: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ledger_path: "roomies.json".to_string(),
            level: "info".to_string(),
            tax_rate: engine::DEFAULT_TAX_RATE,
            member: None,
        }
    }
}

impl AppConfig {
    /// The acting member, or a usage error naming how to set one.
    pub fn require_member(&self) -> Result<&str> {
        self.member.as_deref().ok_or_else(|| {
            AppError::Usage(format!(
                "no acting member: pass --member or set {ENV_PREFIX}_MEMBER"
            ))
        })
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Override the ledger file path.
    #[arg(long, global = true)]
    pub ledger: Option<String>,
    /// Override the log level (e.g. debug).
    #[arg(long, global = true)]
    pub level: Option<String>,
    /// Override the acting member id.
    #[arg(long, global = true)]
    pub member: Option<String>,
}

pub fn load(args: &ConfigArgs) -> Result<AppConfig> {
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX));
    let settings: AppConfig = builder.build()?.try_deserialize()?;

    Ok(apply_overrides(settings, args))
}

fn apply_overrides(mut settings: AppConfig, args: &ConfigArgs) -> AppConfig {
    if let Some(ledger) = &args.ledger {
        settings.ledger_path = ledger.clone();
    }
    if let Some(level) = &args.level {
        settings.level = level.clone();
    }
    if let Some(member) = &args.member {
        settings.member = Some(member.clone());
    }
    settings
}
