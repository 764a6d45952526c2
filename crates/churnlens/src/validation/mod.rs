pub mod normalize;
pub mod validator;

pub use normalize::{format_number, normalize_numeric};
pub use validator::{validate, ValidationLimits, GENERAL_COLUMN};
