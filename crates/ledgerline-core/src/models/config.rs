//! Configuration structures for an extraction run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};
use crate::locale::{BookingDate, comparable_timestamp};

/// Contents of a configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Per-institute settings, keyed by institute name (matched case-insensitively).
    pub institutes: BTreeMap<String, InstituteConfig>,
}

impl ConfigFile {
    /// Load a configuration file; `.yaml`/`.yml` are read as YAML, `.json` as JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LedgerError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension.as_deref() {
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            Some("json") => serde_json::from_str(&content).map_err(|e| {
                LedgerError::Config(format!("invalid JSON in {}: {}", path.display(), e))
            }),
            _ => Err(LedgerError::Config(format!(
                "unsupported configuration format: {}",
                path.display()
            ))),
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| LedgerError::Config(format!("invalid YAML: {}", e)))
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| LedgerError::Config(e.to_string()))
    }

    /// Sample configuration written by `config init`.
    pub fn sample() -> Self {
        let mut institutes = BTreeMap::new();
        institutes.insert(
            "DKB".to_string(),
            InstituteConfig {
                owner: None,
                validate: vec![
                    Checkpoint {
                        date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
                        value: Decimal::new(100000, 2),
                        margin: Decimal::ZERO,
                    },
                    Checkpoint {
                        date: NaiveDate::from_ymd_opt(2023, 2, 1).unwrap_or_default(),
                        value: Decimal::new(120000, 2),
                        margin: Decimal::new(50, 2),
                    },
                ],
            },
        );
        institutes.insert(
            "PayPal".to_string(),
            InstituteConfig {
                owner: Some(OwnerConfig {
                    id: Some("max.mustermann@example.com".to_string()),
                    name: Some("Max Mustermann".to_string()),
                }),
                validate: Vec::new(),
            },
        );
        Self { institutes }
    }
}

/// Settings for one institute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstituteConfig {
    /// Fallback identity of the statement holder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerConfig>,

    /// Balance checkpoints, ascending by date.
    pub validate: Vec<Checkpoint>,
}

/// Statement holder's identity at an institute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Known cumulative balance at the end of a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub date: NaiveDate,

    /// Expected cumulative balance.
    pub value: Decimal,

    /// Tolerated drift: positive tolerates sums above `value`, negative below.
    #[serde(default)]
    pub margin: Decimal,
}

/// Inclusive date window; either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateWindow {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    /// Whether the normalized date of `date` lies within the window.
    pub fn contains(&self, date: impl Into<BookingDate>) -> bool {
        let day = comparable_timestamp(date).date();
        self.from.is_none_or(|from| day >= from) && self.to.is_none_or(|to| day <= to)
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

/// Run-level configuration handed to every pipeline stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    /// Files or directories to read.
    pub input_paths: Vec<PathBuf>,

    /// Walk directories recursively.
    pub recursive: bool,

    /// First booking day to keep (inclusive).
    pub from_date: Option<NaiveDate>,

    /// Last booking day to keep (inclusive).
    pub to_date: Option<NaiveDate>,

    /// Run balance reconciliation after loading.
    pub validate: bool,

    /// Number of extraction workers.
    pub jobs: usize,

    /// Per-institute settings.
    pub institutes: BTreeMap<String, InstituteConfig>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            input_paths: Vec::new(),
            recursive: false,
            from_date: None,
            to_date: None,
            validate: false,
            jobs: default_jobs(),
            institutes: BTreeMap::new(),
        }
    }
}

impl Configuration {
    /// Apply the settings of a configuration file.
    pub fn with_file(mut self, file: ConfigFile) -> Self {
        self.institutes = file.institutes;
        self
    }

    /// Start of the window as a timestamp (midnight of `from_date`).
    pub fn from_datetime(&self) -> Option<NaiveDateTime> {
        self.from_date.map(|d| d.and_time(NaiveTime::MIN))
    }

    /// End of the window as a timestamp (last second of `to_date`).
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        self.to_date
            .and_then(|d| d.and_hms_opt(23, 59, 59))
    }

    pub fn date_window(&self) -> DateWindow {
        DateWindow::new(self.from_date, self.to_date)
    }

    /// Case-insensitive lookup of an institute's settings.
    pub fn institute(&self, name: &str) -> Option<&InstituteConfig> {
        self.institutes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, config)| config)
    }

    /// Configured owner fallback for an institute.
    pub fn owner(&self, institute: &str) -> Option<&OwnerConfig> {
        self.institute(institute).and_then(|c| c.owner.as_ref())
    }
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
