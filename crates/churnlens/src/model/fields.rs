//! Canonical employee-record fields and the data modes that decide which of
//! them are required.

use serde::{Deserialize, Serialize};

/// Semantic attributes an uploaded dataset must ultimately map onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Identifier,
    Name,
    Department,
    Position,
    Cost,
    Status,
    ManagerId,
    Tenure,
    TerminationDate,
    PerformanceRatingLatest,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 10] = [
        CanonicalField::Identifier,
        CanonicalField::Name,
        CanonicalField::Department,
        CanonicalField::Position,
        CanonicalField::Cost,
        CanonicalField::Status,
        CanonicalField::ManagerId,
        CanonicalField::Tenure,
        CanonicalField::TerminationDate,
        CanonicalField::PerformanceRatingLatest,
    ];

    /// Key used in the `mappings` payload sent to the churn API.
    pub fn key(&self) -> &'static str {
        match self {
            CanonicalField::Identifier => "identifier",
            CanonicalField::Name => "name",
            CanonicalField::Department => "department",
            CanonicalField::Position => "position",
            CanonicalField::Cost => "cost",
            CanonicalField::Status => "status",
            CanonicalField::ManagerId => "manager_id",
            CanonicalField::Tenure => "tenure",
            CanonicalField::TerminationDate => "termination_date",
            CanonicalField::PerformanceRatingLatest => "performance_rating_latest",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.key() == key)
    }

    /// Human-readable label used in issue reports.
    pub fn label(&self) -> &'static str {
        match self {
            CanonicalField::Identifier => "Employee ID",
            CanonicalField::Name => "Full Name",
            CanonicalField::Department => "Department",
            CanonicalField::Position => "Position",
            CanonicalField::Cost => "Employee Cost",
            CanonicalField::Status => "Status",
            CanonicalField::ManagerId => "Manager ID",
            CanonicalField::Tenure => "Tenure",
            CanonicalField::TerminationDate => "Termination Date",
            CanonicalField::PerformanceRatingLatest => "Latest Performance Rating",
        }
    }

    /// Header written into generated templates.
    pub fn template_header(&self) -> &'static str {
        match self {
            CanonicalField::Identifier => "hr_code",
            CanonicalField::Name => "full_name",
            CanonicalField::Department => "structure_name",
            CanonicalField::Position => "position",
            CanonicalField::Cost => "employee_cost",
            CanonicalField::Status => "status",
            CanonicalField::ManagerId => "manager_id",
            CanonicalField::Tenure => "tenure",
            CanonicalField::TerminationDate => "termination_date",
            CanonicalField::PerformanceRatingLatest => "performance_rating_latest",
        }
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

const WAGE_FIELDS: &[CanonicalField] = &[
    CanonicalField::Identifier,
    CanonicalField::Name,
    CanonicalField::Department,
    CanonicalField::Position,
    CanonicalField::Cost,
    CanonicalField::Status,
    CanonicalField::ManagerId,
    CanonicalField::Tenure,
    CanonicalField::TerminationDate,
];

const WAGE_REQUIRED: &[CanonicalField] = &[
    CanonicalField::Identifier,
    CanonicalField::Name,
    CanonicalField::Department,
    CanonicalField::Position,
    CanonicalField::Cost,
    CanonicalField::Status,
    CanonicalField::ManagerId,
    CanonicalField::Tenure,
];

const PERFORMANCE_REQUIRED: &[CanonicalField] = &[
    CanonicalField::Identifier,
    CanonicalField::Name,
    CanonicalField::Department,
    CanonicalField::Position,
    CanonicalField::PerformanceRatingLatest,
    CanonicalField::Status,
    CanonicalField::ManagerId,
    CanonicalField::Tenure,
];

/// Persisted toggle deciding whether cost or performance rating is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataMode {
    #[default]
    Wage,
    Performance,
}

impl DataMode {
    /// Fields offered for mapping in this mode.
    pub fn fields(&self) -> &'static [CanonicalField] {
        match self {
            DataMode::Wage => WAGE_FIELDS,
            DataMode::Performance => &CanonicalField::ALL,
        }
    }

    pub fn required_fields(&self) -> &'static [CanonicalField] {
        match self {
            DataMode::Wage => WAGE_REQUIRED,
            DataMode::Performance => PERFORMANCE_REQUIRED,
        }
    }

    pub fn is_required(&self, field: CanonicalField) -> bool {
        self.required_fields().contains(&field)
    }

    pub fn offers(&self, field: CanonicalField) -> bool {
        self.fields().contains(&field)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataMode::Wage => "wage",
            DataMode::Performance => "performance",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "wage" => Some(DataMode::Wage),
            "performance" => Some(DataMode::Performance),
            _ => None,
        }
    }
}

impl std::fmt::Display for DataMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
