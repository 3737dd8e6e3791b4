//! Runtime settings, read from YAML with environment overrides.

use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::{error::ConfigError, ingest::columns::ColumnMap, lead_time::LeadTimeOrder};

pub const CONFIG_ENV: &str = "RYOKAN_CONFIG";
pub const INPUT_ENV: &str = "RYOKAN_INPUT";
pub const OUTPUT_ENV: &str = "RYOKAN_OUTPUT";
pub const HEADER_ROWS_ENV: &str = "RYOKAN_HEADER_ROWS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Reservation export to read.
    pub input: PathBuf,

    /// Where to write the JSON bundle; stdout when unset.
    pub output: Option<PathBuf>,

    /// Physical rows before the header row (default: 1, the export's title line).
    pub header_rows_to_skip: usize,

    pub columns: ColumnMap,

    pub lead_time_order: LeadTimeOrder,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input: PathBuf::from("reservations.csv"),
            output: None,
            header_rows_to_skip: 1,
            columns: ColumnMap::default(),
            lead_time_order: LeadTimeOrder::default(),
        }
    }
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_yaml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Settings file named by `RYOKAN_CONFIG` (or defaults), then the
    /// `RYOKAN_INPUT` / `RYOKAN_OUTPUT` / `RYOKAN_HEADER_ROWS` overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut settings = match env::var_os(CONFIG_ENV) {
            Some(path) => {
                debug!(path = ?path, "loading settings file");
                Self::load(PathBuf::from(path))?
            }
            None => Self::default(),
        };
        settings.apply_overrides(|key| env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(input) = lookup(INPUT_ENV) {
            self.input = PathBuf::from(input);
        }
        if let Some(output) = lookup(OUTPUT_ENV) {
            self.output = Some(PathBuf::from(output));
        }
        if let Some(rows) = lookup(HEADER_ROWS_ENV) {
            self.header_rows_to_skip = rows.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("{HEADER_ROWS_ENV} must be a row count, got {rows:?}"))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.columns.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_reservation_export() {
        let s = Settings::default();
        assert_eq!(s.header_rows_to_skip, 1);
        assert_eq!(s.columns.address, "住所");
        assert_eq!(s.lead_time_order, LeadTimeOrder::ApplicationMinusCheckin);
        assert!(s.output.is_none());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let s = Settings::from_yaml(
            "input: data/予約一覧.csv\nheader_rows_to_skip: 0\nlead_time_order: checkin_minus_application\ncolumns:\n  channel: source\n",
        )
        .unwrap();
        assert_eq!(s.input, PathBuf::from("data/予約一覧.csv"));
        assert_eq!(s.header_rows_to_skip, 0);
        assert_eq!(s.lead_time_order, LeadTimeOrder::CheckinMinusApplication);
        assert_eq!(s.columns.channel, "source");
        assert_eq!(s.columns.plan_name, "プラン名");
    }

    #[test]
    fn rejects_bad_yaml_and_duplicate_columns() {
        assert!(matches!(
            Settings::from_yaml("header_rows_to_skip: many"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            Settings::from_yaml("columns:\n  address: プラン名\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn loads_file_and_applies_overrides() -> anyhow::Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "input: a.csv\noutput: out.json")?;
        let mut s = Settings::load(file.path())?;
        assert_eq!(s.output, Some(PathBuf::from("out.json")));

        let env: HashMap<&str, &str> = [(INPUT_ENV, "b.csv"), (HEADER_ROWS_ENV, " 2 ")].into();
        s.apply_overrides(|k| env.get(k).map(|v| v.to_string()))?;
        assert_eq!(s.input, PathBuf::from("b.csv"));
        assert_eq!(s.header_rows_to_skip, 2);

        let bad: HashMap<&str, &str> = [(HEADER_ROWS_ENV, "x")].into();
        assert!(s
            .apply_overrides(|k| bad.get(k).map(|v| v.to_string()))
            .is_err());
        Ok(())
    }

    #[test]
    fn missing_file_is_read_error() {
        assert!(matches!(
            Settings::load("/nonexistent/ryokan.yaml"),
            Err(ConfigError::Read { .. })
        ));
    }
}
