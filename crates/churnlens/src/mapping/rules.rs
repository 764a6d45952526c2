use crate::model::CanonicalField;

/// Keyword rule deciding which header feeds a canonical field.
#[derive(Debug, Clone, Copy)]
pub struct MappingRule {
    pub field: CanonicalField,
    /// Tried in order; earlier keywords win over later ones.
    pub keywords: &'static [&'static str],
    /// Headers containing any of these never match the rule.
    pub excludes: &'static [&'static str],
}

impl MappingRule {
    pub fn matches(&self, normalized_header: &str, keyword: &str) -> bool {
        normalized_header.contains(keyword)
            && !self
                .excludes
                .iter()
                .any(|exclude| normalized_header.contains(exclude))
    }
}

/// Evaluated top to bottom. Fields whose keywords are easily swallowed by
/// broader ones (manager ids, dates) come first; identifier and name last.
pub const MAPPING_RULES: &[MappingRule] = &[
    MappingRule {
        field: CanonicalField::ManagerId,
        keywords: &["manager_id", "manager", "supervisor", "reports_to", "boss"],
        excludes: &[],
    },
    MappingRule {
        field: CanonicalField::TerminationDate,
        keywords: &[
            "termination_date",
            "termination",
            "exit_date",
            "end_date",
            "leave_date",
            "resign",
        ],
        excludes: &[],
    },
    MappingRule {
        field: CanonicalField::Department,
        keywords: &[
            "structure_name",
            "department",
            "dept",
            "division",
            "unit",
            "structure",
            "team",
        ],
        excludes: &[],
    },
    MappingRule {
        field: CanonicalField::Position,
        keywords: &["position", "job_title", "title", "role", "job"],
        excludes: &[],
    },
    MappingRule {
        field: CanonicalField::Cost,
        keywords: &[
            "employee_cost",
            "salary",
            "wage",
            "cost",
            "pay",
            "compensation",
        ],
        excludes: &[],
    },
    MappingRule {
        field: CanonicalField::PerformanceRatingLatest,
        keywords: &[
            "performance_rating_latest",
            "performance_rating",
            "performance",
            "rating",
        ],
        excludes: &[],
    },
    MappingRule {
        field: CanonicalField::Status,
        keywords: &["status", "employment_status", "state", "active"],
        excludes: &[],
    },
    MappingRule {
        field: CanonicalField::Tenure,
        keywords: &["tenure", "years_of_service", "seniority", "service"],
        excludes: &[],
    },
    MappingRule {
        field: CanonicalField::Identifier,
        keywords: &[
            "hr_code",
            "employee_id",
            "emp_id",
            "staff_id",
            "employee_number",
            "employee_code",
            "id",
            "code",
        ],
        excludes: &["manager", "name"],
    },
    MappingRule {
        field: CanonicalField::Name,
        keywords: &["full_name", "employee_name", "name"],
        excludes: &["structure", "department", "manager", "file"],
    },
];
