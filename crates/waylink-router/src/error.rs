/// Errors produced while building route tables and parsing paths
///
/// Parsing errors are local: a candidate that fails to decode is treated as
/// non-matching and the error is reported alongside the parse result.
/// Only [`RouteError::MalformedPath`] aborts a parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// The path cannot be split into segments (bad percent-encoding, invalid UTF-8)
    #[error("malformed path `{path}`: {reason}")]
    MalformedPath { path: String, reason: String },

    /// An enum parameter received a value outside its declared set
    #[error("value `{value}` for parameter `{param}` is not one of {allowed:?}")]
    UnknownEnumValue {
        param: String,
        value: String,
        allowed: Vec<String>,
    },

    /// A number parameter received something that is not a strict integer
    #[error("value `{value}` for parameter `{param}` is not a number")]
    InvalidNumber { param: String, value: String },

    /// A route template could not be parsed
    #[error("invalid route template `{template}`: {reason}")]
    InvalidTemplate { template: String, reason: String },

    /// A parameter type annotation is not recognized
    #[error("unknown parameter type `{0}`")]
    UnknownParamType(String),
}

impl RouteError {
    pub(crate) fn malformed(path: &str, reason: impl Into<String>) -> Self {
        RouteError::MalformedPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_template(template: &str, reason: impl Into<String>) -> Self {
        RouteError::InvalidTemplate {
            template: template.to_string(),
            reason: reason.into(),
        }
    }
}
