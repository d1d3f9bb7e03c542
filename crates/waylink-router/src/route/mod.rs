//! Route template module
//!
//! Pure components that turn template strings into typed segments:
//! - `pattern` classifies a single segment
//! - `parser` folds a whole template into a [`ParsedTemplate`]

pub mod parser;
pub mod pattern;

pub use parser::{parse_template, ParsedTemplate};
pub use pattern::{classify_segment, parse_param_with_constraint, PatternSegmentType};
