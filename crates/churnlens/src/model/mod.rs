pub mod entities;
pub mod fields;
pub mod mapping;
pub mod table;
pub mod validation;

pub use entities::{Dataset, DbConnection, Project, TrainingState, TrainingStatus};
pub use fields::{CanonicalField, DataMode};
pub use mapping::ColumnMapping;
pub use table::TabularPreview;
pub use validation::{IssueType, ValidationIssue, ValidationResult};
