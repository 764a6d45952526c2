use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Category of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    Empty,
    Format,
    Invalid,
    Type,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub column: String,
    pub field_name: String,
    pub issue_type: IssueType,
    pub description: String,
    /// Total offending cells; `row_indices` and `example_values` are capped.
    pub count: usize,
    /// 1-based display rows (data index + 2 for the header row).
    pub row_indices: Vec<usize>,
    pub example_values: Vec<String>,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid: bool,
    pub column_issues: BTreeMap<String, Vec<ValidationIssue>>,
    pub total_rows: usize,
}

impl ValidationResult {
    pub fn from_issues(issues: Vec<ValidationIssue>, total_rows: usize) -> Self {
        let mut column_issues: BTreeMap<String, Vec<ValidationIssue>> = BTreeMap::new();
        for issue in issues {
            column_issues
                .entry(issue.column.clone())
                .or_default()
                .push(issue);
        }
        Self {
            valid: column_issues.is_empty(),
            column_issues,
            total_rows,
        }
    }

    pub fn issue_count(&self) -> usize {
        self.column_issues.values().map(Vec::len).sum()
    }

    pub fn issues_for(&self, column: &str) -> &[ValidationIssue] {
        self.column_issues
            .get(column)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.column_issues.values().flatten()
    }
}
