//! Table-driven record mapper
//!
//! Copies entry attributes into a JSON object according to a
//! `{attribute name -> field name}` table, so schema changes are a config
//! edit instead of a code change.

use super::types::{EntryMapper, EntryOutcome};
use crate::config::MappingConfig;
use crate::directory::{DirectoryEntry, RawEntry};
use crate::types::{JsonValue, Record};
use std::collections::HashMap;
use tracing::debug;

/// Maps directory entries into JSON records
#[derive(Debug, Clone, Default)]
pub struct RecordMapper {
    /// Lowercased attribute name to output field
    fields: HashMap<String, String>,
    /// Field holding the entry DN
    dn_field: Option<String>,
    /// Keep unmapped attributes under their own name
    include_unmapped: bool,
    /// Attributes every entry must carry (lowercased)
    required: Vec<String>,
}

impl RecordMapper {
    /// Create a mapper with an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mapper from configuration
    pub fn from_config(config: &MappingConfig) -> Self {
        let mut mapper = Self::new()
            .with_dn_field(config.dn_field.clone())
            .include_unmapped(config.include_unmapped);
        for (attribute, field) in &config.fields {
            mapper = mapper.with_field(attribute, field);
        }
        for attribute in &config.required {
            mapper = mapper.require(attribute);
        }
        mapper
    }

    /// Map an attribute to an output field
    #[must_use]
    pub fn with_field(mut self, attribute: impl AsRef<str>, field: impl Into<String>) -> Self {
        self.fields
            .insert(attribute.as_ref().to_ascii_lowercase(), field.into());
        self
    }

    /// Set the field that holds the DN (`None` to omit it)
    #[must_use]
    pub fn with_dn_field(mut self, field: Option<String>) -> Self {
        self.dn_field = field;
        self
    }

    /// Keep or drop attributes without a mapping
    #[must_use]
    pub fn include_unmapped(mut self, include: bool) -> Self {
        self.include_unmapped = include;
        self
    }

    /// Fail entries that lack this attribute
    #[must_use]
    pub fn require(mut self, attribute: impl AsRef<str>) -> Self {
        self.required.push(attribute.as_ref().to_ascii_lowercase());
        self
    }

    fn map_entry(&self, entry: &DirectoryEntry) -> EntryOutcome<Record> {
        let present: Vec<String> = entry
            .attributes
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(name, _)| name.to_ascii_lowercase())
            .collect();
        if let Some(missing) = self.required.iter().find(|r| !present.contains(r)) {
            return EntryOutcome::failed(format!("required attribute '{missing}' is missing"));
        }

        let mut record = Record::new();
        if let Some(dn_field) = &self.dn_field {
            record.insert(dn_field.clone(), JsonValue::String(entry.dn.clone()));
        }

        let mut unmapped = Vec::new();
        for (name, values) in &entry.attributes {
            match self.fields.get(&name.to_ascii_lowercase()) {
                Some(field) => {
                    if let Some(value) = to_json(values) {
                        record.insert(field.clone(), value);
                    }
                }
                None if self.include_unmapped => unmapped.push((name, values)),
                None => debug!(attribute = %name, dn = %entry.dn, "Unexpected attribute"),
            }
        }

        // mapped fields and the dn field take precedence over raw names
        for (name, values) in unmapped {
            if record.contains_key(name.as_str()) {
                debug!(
                    attribute = %name,
                    dn = %entry.dn,
                    "Unmapped attribute clashes with a mapped field"
                );
                continue;
            }
            if let Some(value) = to_json(values) {
                record.insert(name.clone(), value);
            }
        }

        EntryOutcome::Mapped(record)
    }
}

/// Single values become strings, multi-valued attributes become arrays
fn to_json(values: &[String]) -> Option<JsonValue> {
    match values {
        [] => None,
        [single] => Some(JsonValue::String(single.clone())),
        many => Some(JsonValue::Array(
            many.iter().cloned().map(JsonValue::String).collect(),
        )),
    }
}

impl EntryMapper for RecordMapper {
    type Output = Record;

    fn map(&self, entry: &RawEntry) -> EntryOutcome<Record> {
        match entry {
            RawEntry::Entry(entry) => self.map_entry(entry),
            RawEntry::Referral => EntryOutcome::skipped("referral"),
        }
    }
}
