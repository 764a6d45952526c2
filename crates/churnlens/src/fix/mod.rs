//! Deterministic repairs applied when the user picks auto-fix.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{CanonicalField, ColumnMapping, TabularPreview};
use crate::validation::{format_number, normalize_numeric};

/// Manager written when no earlier manager is known for the department.
pub const UNKNOWN_MANAGER: &str = "UNKNOWN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixOutcome {
    pub table: TabularPreview,
    /// One entry per correction category that changed at least one cell.
    pub warnings: Vec<String>,
}

/// Repairs a copy of `table`; the input is left untouched.
///
/// Empty managers take the last non-empty manager seen earlier in the same
/// department (the whole table is one group when no department is mapped),
/// falling back to [`UNKNOWN_MANAGER`]. Cost cells are rewritten as plain
/// numbers, or `0` when they cannot be read.
pub fn auto_fix(table: &TabularPreview, mapping: &ColumnMapping) -> FixOutcome {
    let mut fixed = table.clone();
    let mut warnings = Vec::new();

    let column = |field: CanonicalField| mapping.get(field).and_then(|h| table.column_index(h));

    if let Some(manager_col) = column(CanonicalField::ManagerId) {
        let department_col = column(CanonicalField::Department);
        let (inherited, unknown) = fill_managers(&mut fixed.rows, manager_col, department_col);
        if inherited > 0 {
            warnings.push(format!(
                "Filled {} empty manager value(s) from the previous manager in the same department",
                inherited
            ));
        }
        if unknown > 0 {
            warnings.push(format!(
                "Set {} manager value(s) to {} where no earlier manager was known",
                unknown, UNKNOWN_MANAGER
            ));
        }
    }

    if let Some(cost_col) = column(CanonicalField::Cost) {
        let (normalized, zeroed) = normalize_costs(&mut fixed.rows, cost_col);
        if normalized > 0 {
            warnings.push(format!("Normalized {} cost value(s) to plain numbers", normalized));
        }
        if zeroed > 0 {
            warnings.push(format!(
                "Replaced {} unreadable or empty cost value(s) with 0",
                zeroed
            ));
        }
    }

    for warning in &warnings {
        tracing::info!("{}", warning);
    }

    FixOutcome {
        table: fixed,
        warnings,
    }
}

fn pad(row: &mut Vec<String>, col: usize) {
    if row.len() <= col {
        row.resize(col + 1, String::new());
    }
}

fn fill_managers(
    rows: &mut [Vec<String>],
    manager_col: usize,
    department_col: Option<usize>,
) -> (usize, usize) {
    let mut last_manager: HashMap<String, String> = HashMap::new();
    let mut inherited = 0;
    let mut unknown = 0;

    for row in rows.iter_mut() {
        pad(row, manager_col);
        let department = department_col
            .and_then(|c| row.get(c))
            .map(|d| d.trim().to_string())
            .unwrap_or_default();

        let manager = row[manager_col].trim();
        if !manager.is_empty() {
            last_manager.insert(department, manager.to_string());
            continue;
        }

        match last_manager.get(&department) {
            Some(previous) => {
                row[manager_col] = previous.clone();
                inherited += 1;
            }
            None => {
                row[manager_col] = UNKNOWN_MANAGER.to_string();
                unknown += 1;
            }
        }
    }

    (inherited, unknown)
}

fn normalize_costs(rows: &mut [Vec<String>], cost_col: usize) -> (usize, usize) {
    let mut normalized = 0;
    let mut zeroed = 0;

    for row in rows.iter_mut() {
        pad(row, cost_col);
        let cell = &mut row[cost_col];
        match normalize_numeric(cell) {
            Some(value) => {
                let text = format_number(value);
                if *cell != text {
                    *cell = text;
                    normalized += 1;
                }
            }
            None => {
                *cell = "0".to_string();
                zeroed += 1;
            }
        }
    }

    (normalized, zeroed)
}
