use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, IngestError},
    record::Field,
};

/// Source header name for each canonical field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub address: String,
    pub channel: String,
    pub plan_name: String,
    pub application_date: String,
    pub checkin_date: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            address: "住所".into(),
            channel: "流入経路".into(),
            plan_name: "プラン名".into(),
            application_date: "申込受付日".into(),
            checkin_date: "チェックイン日".into(),
        }
    }
}

impl ColumnMap {
    pub fn header(&self, field: Field) -> &str {
        match field {
            Field::Address => &self.address,
            Field::Channel => &self.channel,
            Field::PlanName => &self.plan_name,
            Field::ApplicationDate => &self.application_date,
            Field::CheckinDate => &self.checkin_date,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, a) in Field::ALL.iter().enumerate() {
            let name = self.header(*a).trim();
            if name.is_empty() {
                return Err(ConfigError::Invalid(format!("empty header for `{a}`")));
            }
            if let Some(b) = Field::ALL[i + 1..]
                .iter()
                .find(|b| self.header(**b).trim() == name)
            {
                return Err(ConfigError::Invalid(format!(
                    "`{a}` and `{b}` both map to column `{name}`"
                )));
            }
        }
        Ok(())
    }

    /// Locate every field in a cleaned header row. The first matching column wins.
    pub fn resolve(&self, headers: &[String]) -> Result<ColumnLayout, IngestError> {
        let mut indices = [0usize; 5];
        for field in Field::ALL {
            let wanted = self.header(field).trim();
            indices[field as usize] = headers
                .iter()
                .position(|h| h == wanted)
                .ok_or_else(|| IngestError::MissingColumn {
                    field,
                    header: wanted.to_string(),
                })?;
        }
        Ok(ColumnLayout { indices })
    }
}

/// Column positions resolved against one file's header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    indices: [usize; 5],
}

impl ColumnLayout {
    pub fn index(&self, field: Field) -> usize {
        self.indices[field as usize]
    }
}
