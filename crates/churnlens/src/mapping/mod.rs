//! Heuristic column mapping from source headers onto canonical fields.

pub mod rules;

use std::collections::HashSet;

use crate::model::{ColumnMapping, DataMode};

pub use rules::{MappingRule, MAPPING_RULES};

/// Lowercases and folds spaces and hyphens to underscores.
pub fn normalize_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Proposes a mapping for `headers` using [`MAPPING_RULES`].
///
/// Each header is assigned to at most one field. Fields outside `mode`'s
/// field set are never mapped. Unmatched fields stay unmapped.
pub fn auto_map(headers: &[String], mode: DataMode) -> ColumnMapping {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
    let mut consumed: HashSet<usize> = HashSet::new();
    let mut mapping = ColumnMapping::new();

    for rule in MAPPING_RULES {
        if !mode.offers(rule.field) {
            continue;
        }

        let hit = rule.keywords.iter().find_map(|keyword| {
            normalized.iter().enumerate().position(|(i, header)| {
                !consumed.contains(&i) && !header.is_empty() && rule.matches(header, keyword)
            })
        });

        if let Some(i) = hit {
            tracing::debug!(field = rule.field.key(), header = %headers[i], "Auto-mapped column");
            consumed.insert(i);
            mapping.set(rule.field, headers[i].clone());
        }
    }

    mapping
}
