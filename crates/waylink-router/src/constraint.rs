/// Typed route parameters
///
/// Every parameter declared by a template has a [`ParamType`]. Decoding is
/// strict: numbers must be plain decimal integers and enum values must belong
/// to the declared set. Nothing is ever coerced to a default.
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::RouteError;

/// Decoded parameters of a matched route, ordered by name
pub type Params = BTreeMap<String, ParamValue>;

/// Declared type of a route parameter
///
/// # Examples
///
/// ```
/// use waylink_router::ParamType;
///
/// assert_eq!("number".parse::<ParamType>().unwrap(), ParamType::Number);
/// assert_eq!(
///     "enum(all|mine)".parse::<ParamType>().unwrap(),
///     ParamType::Enum(vec!["all".to_string(), "mine".to_string()])
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ParamType {
    /// Any non-empty text
    #[default]
    String,
    /// Signed decimal integer
    Number,
    /// One of a fixed set of values
    Enum(Vec<String>),
}

impl ParamType {
    /// Decodes a raw (already percent-decoded) value for parameter `param`
    pub fn decode(&self, param: &str, raw: &str) -> Result<ParamValue, RouteError> {
        match self {
            ParamType::String => Ok(ParamValue::Str(raw.to_string())),
            ParamType::Number => parse_strict_number(raw)
                .map(ParamValue::Number)
                .ok_or_else(|| RouteError::InvalidNumber {
                    param: param.to_string(),
                    value: raw.to_string(),
                }),
            ParamType::Enum(allowed) => {
                if allowed.iter().any(|v| v == raw) {
                    Ok(ParamValue::Str(raw.to_string()))
                } else {
                    Err(RouteError::UnknownEnumValue {
                        param: param.to_string(),
                        value: raw.to_string(),
                        allowed: allowed.clone(),
                    })
                }
            }
        }
    }

    /// Whether every value accepted by `other` is also accepted by `self`
    pub fn accepts_all_of(&self, other: &ParamType) -> bool {
        match (self, other) {
            (ParamType::String, _) => true,
            (ParamType::Number, ParamType::Number) => true,
            (ParamType::Enum(a), ParamType::Enum(b)) => b.iter().all(|v| a.contains(v)),
            _ => false,
        }
    }
}

/// Digits with an optional leading `-`; no sign `+`, no whitespace, no exponent
fn parse_strict_number(raw: &str) -> Option<i64> {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

impl FromStr for ParamType {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "string" | "str" => Ok(ParamType::String),
            "number" | "int" => Ok(ParamType::Number),
            other => {
                let values = other
                    .strip_prefix("enum(")
                    .and_then(|rest| rest.strip_suffix(')'))
                    .ok_or_else(|| RouteError::UnknownParamType(other.to_string()))?;

                let values: Vec<String> = values
                    .split('|')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .collect();

                if values.is_empty() {
                    return Err(RouteError::UnknownParamType(other.to_string()));
                }
                Ok(ParamType::Enum(values))
            }
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::String => write!(f, "string"),
            ParamType::Number => write!(f, "number"),
            ParamType::Enum(values) => write!(f, "enum({})", values.join("|")),
        }
    }
}

impl TryFrom<String> for ParamType {
    type Error = RouteError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ParamType> for String {
    fn from(value: ParamType) -> Self {
        value.to_string()
    }
}

/// A decoded parameter value
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(i64),
    Str(String),
}

impl ParamValue {
    pub fn as_number(&self) -> Option<i64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            ParamValue::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            ParamValue::Number(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(n) => write!(f, "{}", n),
            ParamValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}
