use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::normalize::normalize_numeric;
use crate::model::{
    CanonicalField, ColumnMapping, DataMode, IssueType, TabularPreview, ValidationIssue,
    ValidationResult,
};

/// Column key used for dataset-wide issues.
pub const GENERAL_COLUMN: &str = "general";

/// Caps applied to issue reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationLimits {
    /// Row numbers listed per issue.
    pub max_issue_rows: usize,
    /// Example values listed per issue.
    pub max_examples: usize,
    /// Distinct status values tolerated before flagging the column.
    pub status_cardinality_limit: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_issue_rows: 25,
            max_examples: 5,
            status_cardinality_limit: 10,
        }
    }
}

/// Checks a fully parsed table against the mapping for `mode`.
pub fn validate(
    table: &TabularPreview,
    mapping: &ColumnMapping,
    mode: DataMode,
    limits: &ValidationLimits,
) -> ValidationResult {
    if table.total_rows == 0 || table.rows.is_empty() {
        let issue = ValidationIssue {
            column: GENERAL_COLUMN.to_string(),
            field_name: "Dataset".to_string(),
            issue_type: IssueType::Empty,
            description: "The dataset contains no data rows".to_string(),
            count: 0,
            row_indices: Vec::new(),
            example_values: Vec::new(),
            suggestion: "Upload a file with at least one employee row below the header"
                .to_string(),
        };
        return ValidationResult::from_issues(vec![issue], 0);
    }

    let mut issues = Vec::new();
    for (field, header) in mapping.mapped() {
        let Some(col) = table.column_index(header) else {
            issues.push(missing_column_issue(field, header));
            continue;
        };

        if mode.is_required(field) {
            issues.extend(empty_cells_issue(table, field, header, col, limits));
        }

        match field {
            CanonicalField::Cost => {
                issues.extend(non_numeric_issue(table, field, header, col, limits))
            }
            CanonicalField::Status => {
                issues.extend(status_cardinality_issue(table, field, header, col, limits))
            }
            _ => {}
        }
    }

    let result = ValidationResult::from_issues(issues, table.total_rows);
    tracing::debug!(
        rows = result.total_rows,
        issues = result.issue_count(),
        valid = result.valid,
        "Validated dataset"
    );
    result
}

fn missing_column_issue(field: CanonicalField, header: &str) -> ValidationIssue {
    ValidationIssue {
        column: header.to_string(),
        field_name: field.label().to_string(),
        issue_type: IssueType::Invalid,
        description: format!("Column '{}' was not found in the file", header),
        count: 0,
        row_indices: Vec::new(),
        example_values: Vec::new(),
        suggestion: "Select a column that exists in the uploaded file".to_string(),
    }
}

fn empty_cells_issue(
    table: &TabularPreview,
    field: CanonicalField,
    header: &str,
    col: usize,
    limits: &ValidationLimits,
) -> Option<ValidationIssue> {
    let mut count = 0;
    let mut row_indices = Vec::new();
    for row in 0..table.rows.len() {
        if table.cell(row, col).trim().is_empty() {
            count += 1;
            if row_indices.len() < limits.max_issue_rows {
                row_indices.push(row + 2);
            }
        }
    }
    if count == 0 {
        return None;
    }

    let suggestion = match field {
        CanonicalField::ManagerId => {
            "Fill in the manager, or let auto-fix reuse the previous manager of the same department"
        }
        CanonicalField::Cost => "Provide a cost for every employee; auto-fix writes 0 when unknown",
        _ => "Fill in the missing values before uploading",
    };

    Some(ValidationIssue {
        column: header.to_string(),
        field_name: field.label().to_string(),
        issue_type: IssueType::Empty,
        description: format!("{} empty value(s) in required column '{}'", count, header),
        count,
        row_indices,
        example_values: Vec::new(),
        suggestion: suggestion.to_string(),
    })
}

fn non_numeric_issue(
    table: &TabularPreview,
    field: CanonicalField,
    header: &str,
    col: usize,
    limits: &ValidationLimits,
) -> Option<ValidationIssue> {
    let mut count = 0;
    let mut row_indices = Vec::new();
    let mut example_values = Vec::new();
    for row in 0..table.rows.len() {
        let value = table.cell(row, col);
        if value.trim().is_empty() || normalize_numeric(value).is_some() {
            continue;
        }
        count += 1;
        if row_indices.len() < limits.max_issue_rows {
            row_indices.push(row + 2);
        }
        if example_values.len() < limits.max_examples {
            example_values.push(value.to_string());
        }
    }
    if count == 0 {
        return None;
    }

    Some(ValidationIssue {
        column: header.to_string(),
        field_name: field.label().to_string(),
        issue_type: IssueType::Type,
        description: format!("{} value(s) in '{}' are not numbers", count, header),
        count,
        row_indices,
        example_values,
        suggestion: "Use plain numbers; auto-fix strips symbols and writes 0 when unreadable"
            .to_string(),
    })
}

fn status_cardinality_issue(
    table: &TabularPreview,
    field: CanonicalField,
    header: &str,
    col: usize,
    limits: &ValidationLimits,
) -> Option<ValidationIssue> {
    let distinct: BTreeSet<String> = (0..table.rows.len())
        .map(|row| table.cell(row, col).trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect();
    if distinct.len() <= limits.status_cardinality_limit {
        return None;
    }

    Some(ValidationIssue {
        column: header.to_string(),
        field_name: field.label().to_string(),
        issue_type: IssueType::Format,
        description: format!(
            "'{}' has {} distinct values; expected a small set of statuses",
            header,
            distinct.len()
        ),
        count: distinct.len(),
        row_indices: Vec::new(),
        example_values: distinct.into_iter().take(limits.max_examples).collect(),
        suggestion: "Check that the status column is mapped correctly (e.g. Active, Resigned)"
            .to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> TabularPreview {
        TabularPreview::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    fn mapping(pairs: &[(CanonicalField, &str)]) -> ColumnMapping {
        let mut mapping = ColumnMapping::new();
        for (field, header) in pairs {
            mapping.set(*field, *header);
        }
        mapping
    }

    #[test]
    fn test_zero_is_present() {
        let t = table(&["employee_cost"], &[&["0"], &["0.0"]]);
        let m = mapping(&[(CanonicalField::Cost, "employee_cost")]);
        let result = validate(&t, &m, DataMode::Wage, &ValidationLimits::default());
        assert!(result.valid);
        assert_eq!(result.total_rows, 2);
    }

    #[test]
    fn test_empty_required_cells_reported_with_display_rows() {
        let t = table(&["manager_id"], &[&["M1"], &[""], &["  "]]);
        let m = mapping(&[(CanonicalField::ManagerId, "manager_id")]);
        let result = validate(&t, &m, DataMode::Wage, &ValidationLimits::default());

        assert!(!result.valid);
        let issue = &result.issues_for("manager_id")[0];
        assert_eq!(issue.issue_type, IssueType::Empty);
        assert_eq!(issue.count, 2);
        assert_eq!(issue.row_indices, vec![3, 4]);
    }

    #[test]
    fn test_optional_field_not_scanned_for_empties() {
        let t = table(&["tenure", "termination_date"], &[&["", ""]]);
        let m = mapping(&[
            (CanonicalField::Tenure, "tenure"),
            (CanonicalField::TerminationDate, "termination_date"),
        ]);
        let result = validate(&t, &m, DataMode::Wage, &ValidationLimits::default());
        assert!(result.issues_for("termination_date").is_empty());
    }

    #[test]
    fn test_row_indices_capped() {
        let rows: Vec<Vec<String>> = (0..40).map(|_| vec![String::new()]).collect();
        let t = TabularPreview::new(vec!["status".to_string()], rows);
        let m = mapping(&[(CanonicalField::Status, "status")]);
        let result = validate(&t, &m, DataMode::Wage, &ValidationLimits::default());

        let issue = &result.issues_for("status")[0];
        assert_eq!(issue.count, 40);
        assert_eq!(issue.row_indices.len(), 25);
        assert_eq!(issue.row_indices[0], 2);
    }

    #[test]
    fn test_non_numeric_cost() {
        let t = table(&["cost"], &[&["$1,000"], &["N/A"], &["abc"], &["500"]]);
        let m = mapping(&[(CanonicalField::Cost, "cost")]);
        let result = validate(&t, &m, DataMode::Wage, &ValidationLimits::default());

        let issue = &result.issues_for("cost")[0];
        assert_eq!(issue.issue_type, IssueType::Type);
        assert_eq!(issue.count, 2);
        assert_eq!(issue.example_values, vec!["N/A", "abc"]);
        assert_eq!(issue.row_indices, vec![3, 4]);
    }

    #[test]
    fn test_status_cardinality_threshold() {
        let ten: Vec<Vec<String>> = (0..10).map(|i| vec![format!("s{}", i)]).collect();
        let mut eleven = ten.clone();
        eleven.push(vec!["S10".to_string()]);
        let m = mapping(&[(CanonicalField::Status, "status")]);
        let limits = ValidationLimits::default();

        let ok = TabularPreview::new(vec!["status".to_string()], ten);
        assert!(validate(&ok, &m, DataMode::Wage, &limits).valid);

        let flagged = TabularPreview::new(vec!["status".to_string()], eleven);
        let result = validate(&flagged, &m, DataMode::Wage, &limits);
        let issue = &result.issues_for("status")[0];
        assert_eq!(issue.issue_type, IssueType::Format);
        assert_eq!(issue.example_values.len(), 5);
    }

    #[test]
    fn test_status_case_folded() {
        let rows = (0..12)
            .map(|i| vec![if i % 2 == 0 { "Active" } else { " ACTIVE " }.to_string()])
            .collect();
        let t = TabularPreview::new(vec!["status".to_string()], rows);
        let m = mapping(&[(CanonicalField::Status, "status")]);
        assert!(validate(&t, &m, DataMode::Wage, &ValidationLimits::default()).valid);
    }

    #[test]
    fn test_missing_header_is_invalid() {
        let t = table(&["a"], &[&["1"]]);
        let m = mapping(&[(CanonicalField::Identifier, "hr_code")]);
        let result = validate(&t, &m, DataMode::Wage, &ValidationLimits::default());
        assert_eq!(result.issues_for("hr_code")[0].issue_type, IssueType::Invalid);
    }

    #[test]
    fn test_no_rows_is_general_issue() {
        let t = table(&["hr_code"], &[]);
        let m = mapping(&[(CanonicalField::Identifier, "hr_code")]);
        let result = validate(&t, &m, DataMode::Wage, &ValidationLimits::default());
        assert!(!result.valid);
        assert_eq!(result.issue_count(), 1);
        assert_eq!(result.issues_for(GENERAL_COLUMN)[0].issue_type, IssueType::Empty);
    }
}
