//! Versioned column-alias table mapping source headers to canonical fields.
//!
//! Collection rounds renamed several columns (`Shop_Latitude` became
//! `Shop_Lat`, `Distance_From_Shop(m)` became `Distance_m`, and so on). The
//! built-in table merges every observed revision; aliases are tried in the
//! declared order and the first non-empty value wins.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Version of the built-in table. Bump when adding a dataset revision.
pub const BUILTIN_SCHEMA_VERSION: u32 = 2;

/// Canonical field a source column can feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Id,
    Name,
    Province,
    SalesRepresentative,
    Latitude,
    Longitude,
    Status,
    CheckinTimestamp,
    Distance,
    Remark,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::Id,
        Field::Name,
        Field::Province,
        Field::SalesRepresentative,
        Field::Latitude,
        Field::Longitude,
        Field::Status,
        Field::CheckinTimestamp,
        Field::Distance,
        Field::Remark,
    ];
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Field::Id => "id",
            Field::Name => "name",
            Field::Province => "province",
            Field::SalesRepresentative => "sales_representative",
            Field::Latitude => "latitude",
            Field::Longitude => "longitude",
            Field::Status => "status",
            Field::CheckinTimestamp => "checkin_timestamp",
            Field::Distance => "distance",
            Field::Remark => "remark",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaMapping {
    pub version: u32,
    /// Status value that marks a shop as visited. Compared exactly.
    pub checked_in_token: String,
    #[serde(default = "default_address_suffix")]
    pub address_suffix: String,
    /// Placeholder for absent descriptive attributes.
    #[serde(default = "default_missing_value")]
    pub missing_value: String,
    pub columns: BTreeMap<Field, Vec<String>>,
}

fn default_address_suffix() -> String {
    "ไทย".to_string()
}

fn default_missing_value() -> String {
    "-".to_string()
}

static BUILTIN: LazyLock<SchemaMapping> = LazyLock::new(|| {
    let columns: [(Field, &[&str]); 10] = [
        (Field::Id, &["Shop_ID"]),
        (Field::Name, &["Shop_Name"]),
        (Field::Province, &["Province"]),
        (Field::SalesRepresentative, &["Sales_Rep", "Region"]),
        (Field::Latitude, &["Shop_Latitude", "Shop_Lat"]),
        (Field::Longitude, &["Shop_Longitude", "Shop_Lon"]),
        (Field::Status, &["Visit_Status", "Status"]),
        (Field::CheckinTimestamp, &["Checkin_Timestamp", "Checkin_Time"]),
        (Field::Distance, &["Distance_From_Shop(m)", "Distance_m"]),
        (Field::Remark, &["Remark"]),
    ];
    let columns = columns
        .into_iter()
        .map(|(field, aliases)| (field, aliases.iter().map(|s| (*s).to_string()).collect()))
        .collect();

    SchemaMapping {
        version: BUILTIN_SCHEMA_VERSION,
        checked_in_token: "Checked-in".to_string(),
        address_suffix: default_address_suffix(),
        missing_value: default_missing_value(),
        columns,
    }
});

impl SchemaMapping {
    /// The process-wide built-in table.
    #[must_use]
    pub fn builtin() -> &'static SchemaMapping {
        &BUILTIN
    }

    /// Load and validate a schema table from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
    pub fn load(path: &Path) -> Result<SchemaMapping, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SchemaFileIo {
            path: path.display().to_string(),
            source: e,
        })?;

        let schema: SchemaMapping = serde_yaml::from_str(&content)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Resolve the schema a process should use: the file at `path` when one
    /// is configured, otherwise the built-in table.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a configured file is unusable.
    pub fn resolve_active(path: Option<&Path>) -> Result<SchemaMapping, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::builtin().clone()),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.checked_in_token.trim().is_empty() {
            return Err(ConfigError::Validation(
                "checked_in_token must be non-empty".to_string(),
            ));
        }

        for field in Field::ALL {
            let has_alias = self
                .columns
                .get(&field)
                .is_some_and(|aliases| aliases.iter().any(|a| !a.trim().is_empty()));
            if !has_alias {
                return Err(ConfigError::Validation(format!(
                    "field '{field}' has no column aliases"
                )));
            }
        }

        Ok(())
    }

    /// Column aliases for `field`, in priority order.
    #[must_use]
    pub fn aliases(&self, field: Field) -> &[String] {
        self.columns.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `header` names any column this table knows about.
    #[must_use]
    pub fn recognizes(&self, header: &str) -> bool {
        self.columns
            .values()
            .flatten()
            .any(|alias| alias == header)
    }

    /// First alias whose value is non-blank, trimmed.
    #[must_use]
    pub fn resolve<'a>(&self, row: &'a HashMap<String, String>, field: Field) -> Option<&'a str> {
        self.resolve_raw(row, field).map(str::trim)
    }

    /// Like [`SchemaMapping::resolve`] but returns the value untrimmed.
    #[must_use]
    pub fn resolve_raw<'a>(
        &self,
        row: &'a HashMap<String, String>,
        field: Field,
    ) -> Option<&'a str> {
        self.aliases(field)
            .iter()
            .filter_map(|alias| row.get(alias))
            .map(String::as_str)
            .find(|value| !value.trim().is_empty())
    }
}
