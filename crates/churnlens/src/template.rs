//! Header-only CSV templates handed to users before their first upload.

use serde::{Deserialize, Serialize};

use crate::error::IngestError;
use crate::model::{CanonicalField, DataMode, TabularPreview};
use crate::parser::write_csv;

/// Optional columns that improve predictions when present.
pub const RECOMMENDED_COLUMNS: &[&str] = &[
    "email",
    "gender",
    "birth_date",
    "age",
    "nationality",
    "marital_status",
    "number_of_dependents",
    "education_level",
    "education_field",
    "hire_date",
    "employment_type",
    "contract_type",
    "contract_end_date",
    "work_location",
    "country",
    "city",
    "remote_work_ratio",
    "commute_distance_km",
    "business_unit",
    "division",
    "team",
    "cost_center",
    "job_family",
    "job_level",
    "grade",
    "fte",
    "weekly_hours",
    "shift_type",
    "base_salary",
    "bonus",
    "stock_options",
    "last_raise_date",
    "last_raise_percent",
    "salary_band_position",
    "years_in_current_role",
    "years_since_last_promotion",
    "promotions_count",
    "internal_transfers_count",
    "years_with_current_manager",
    "manager_changes_count",
    "direct_reports_count",
    "performance_rating_previous",
    "potential_rating",
    "goal_attainment_percent",
    "engagement_score",
    "satisfaction_score",
    "work_life_balance_score",
    "enps_score",
    "training_hours_last_year",
    "certifications_count",
    "overtime_hours_monthly",
    "absence_days_last_year",
    "sick_days_last_year",
    "vacation_days_remaining",
    "last_review_date",
    "disciplinary_actions_count",
    "high_potential_flag",
    "flight_risk_flag",
    "termination_reason",
    "termination_type",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    /// Required columns, termination date and every recommended column.
    Full,
    /// Required columns only.
    Minimum,
}

impl TemplateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::Full => "full",
            TemplateKind::Minimum => "minimum",
        }
    }
}

/// Ordered header row of a template.
pub fn template_headers(kind: TemplateKind, mode: DataMode) -> Vec<String> {
    let mut headers: Vec<String> = mode
        .required_fields()
        .iter()
        .map(|f| f.template_header().to_string())
        .collect();

    if kind == TemplateKind::Full {
        headers.push(CanonicalField::TerminationDate.template_header().to_string());
        headers.extend(RECOMMENDED_COLUMNS.iter().map(|c| c.to_string()));
    }
    headers
}

/// CSV bytes containing only the header row.
pub fn generate(kind: TemplateKind, mode: DataMode) -> Result<Vec<u8>, IngestError> {
    let table = TabularPreview::new(template_headers(kind, mode), Vec::new());
    write_csv(&table)
}

pub fn template_file_name(kind: TemplateKind, mode: DataMode) -> String {
    format!("churn_template_{}_{}.csv", mode.as_str(), kind.as_str())
}
