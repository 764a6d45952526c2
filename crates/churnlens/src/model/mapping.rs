use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::fields::{CanonicalField, DataMode};
use crate::error::IngestError;

/// Association of canonical fields to source headers.
///
/// An empty header means the field is unmapped. Iteration follows the
/// canonical field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMapping {
    entries: BTreeMap<CanonicalField, String>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: CanonicalField, header: impl Into<String>) {
        let header = header.into();
        if header.is_empty() {
            self.entries.remove(&field);
        } else {
            self.entries.insert(field, header);
        }
    }

    pub fn clear(&mut self, field: CanonicalField) {
        self.entries.remove(&field);
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Mapped header for `field`, `None` when unmapped.
    pub fn get(&self, field: CanonicalField) -> Option<&str> {
        self.entries
            .get(&field)
            .map(String::as_str)
            .filter(|h| !h.is_empty())
    }

    pub fn is_mapped(&self, field: CanonicalField) -> bool {
        self.get(field).is_some()
    }

    /// Non-empty entries in canonical field order.
    pub fn mapped(&self) -> impl Iterator<Item = (CanonicalField, &str)> {
        self.entries
            .iter()
            .filter(|(_, h)| !h.is_empty())
            .map(|(f, h)| (*f, h.as_str()))
    }

    pub fn is_header_used(&self, header: &str) -> bool {
        self.entries.values().any(|h| h == header)
    }

    pub fn missing_required(&self, mode: DataMode) -> Vec<CanonicalField> {
        mode.required_fields()
            .iter()
            .copied()
            .filter(|f| !self.is_mapped(*f))
            .collect()
    }

    pub fn is_complete(&self, mode: DataMode) -> bool {
        self.missing_required(mode).is_empty()
    }

    pub fn ensure_complete(&self, mode: DataMode) -> Result<(), IngestError> {
        let missing = self.missing_required(mode);
        if missing.is_empty() {
            return Ok(());
        }
        Err(IngestError::MappingIncomplete {
            fields: missing.iter().map(|f| f.label().to_string()).collect(),
        })
    }

    /// JSON object `{field_key: header}` as sent in the `mappings` form part.
    pub fn to_payload(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .mapped()
            .map(|(f, h)| (f.key().to_string(), serde_json::Value::from(h)))
            .collect();
        serde_json::Value::Object(map)
    }

    pub fn len(&self) -> usize {
        self.mapped().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_header_unmaps() {
        let mut mapping = ColumnMapping::new();
        mapping.set(CanonicalField::Cost, "salary");
        assert_eq!(mapping.get(CanonicalField::Cost), Some("salary"));

        mapping.set(CanonicalField::Cost, "");
        assert!(!mapping.is_mapped(CanonicalField::Cost));
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_missing_required_depends_on_mode() {
        let mut mapping = ColumnMapping::new();
        for field in DataMode::Wage.required_fields() {
            mapping.set(*field, field.template_header());
        }
        assert!(mapping.is_complete(DataMode::Wage));

        let missing = mapping.missing_required(DataMode::Performance);
        assert_eq!(missing, vec![CanonicalField::PerformanceRatingLatest]);

        let err = mapping.ensure_complete(DataMode::Performance).unwrap_err();
        assert!(err.to_string().contains("Latest Performance Rating"));
    }

    #[test]
    fn test_payload_uses_field_keys() {
        let mut mapping = ColumnMapping::new();
        mapping.set(CanonicalField::ManagerId, "boss");
        mapping.set(CanonicalField::Identifier, "hr_code");

        let payload = mapping.to_payload();
        assert_eq!(payload["manager_id"], "boss");
        assert_eq!(payload["identifier"], "hr_code");
        assert_eq!(payload.as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_serde_roundtrip_is_keyed_by_field() {
        let mut mapping = ColumnMapping::new();
        mapping.set(CanonicalField::TerminationDate, "exit");
        let json = serde_json::to_string(&mapping).unwrap();
        assert_eq!(json, r#"{"termination_date":"exit"}"#);

        let back: ColumnMapping = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mapping);
    }
}
