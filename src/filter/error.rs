use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid id '{value}' in '{param}': expected a comma-separated list of integers")]
    InvalidId { param: &'static str, value: String },
}
