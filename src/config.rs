use crate::error::ReportError;
use figment::providers::Env;
use figment::Figment;
use rusoto_core::Region;
use serde::Deserialize;
use std::str::FromStr;

const DEFAULT_METRIC_DAYS: i64 = 90;
/// CloudWatch keeps hourly data for 455 days.
const MAX_METRIC_DAYS: i64 = 455;

/// Runtime settings, read from `AWS_REGION` and `METRIC_DAYS`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub aws_region: Option<String>,
    #[serde(default = "default_metric_days")]
    pub metric_days: i64,
}

fn default_metric_days() -> i64 {
    DEFAULT_METRIC_DAYS
}

impl ReportConfig {
    /// Loads `.env` from the working directory when present, then the process environment.
    pub fn load() -> Result<Self, ReportError> {
        if let Err(error) = dotenv::dotenv() {
            if !error.not_found() {
                return Err(ReportError::Config(error.to_string()));
            }
        }
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, ReportError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn figment() -> Figment {
        Figment::new().merge(Env::raw().only(&["AWS_REGION", "METRIC_DAYS"]))
    }

    fn validate(&self) -> Result<(), ReportError> {
        if self.metric_days <= 0 {
            return Err(ReportError::Config(format!(
                "METRIC_DAYS must be positive, got {}",
                self.metric_days
            )));
        }
        if self.metric_days > MAX_METRIC_DAYS {
            return Err(ReportError::Config(format!(
                "METRIC_DAYS must be at most {}, got {}",
                MAX_METRIC_DAYS, self.metric_days
            )));
        }
        Ok(())
    }

    /// Falls back to rusoto's own region lookup when `AWS_REGION` is unset.
    pub fn region(&self) -> Result<Region, ReportError> {
        match self.aws_region.as_deref() {
            Some(name) if !name.trim().is_empty() => Ok(Region::from_str(name.trim())?),
            _ => Ok(Region::default()),
        }
    }
}
