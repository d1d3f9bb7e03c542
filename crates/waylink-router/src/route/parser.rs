/// Template parsing
///
/// Folds a template such as `/search/:kind:enum(chat|people)?q&page:number`
/// into typed segments, parameter types and declared query parameters.
/// All functions are **pure**: same input → same output, no side effects.
use std::collections::BTreeMap;

use super::pattern::{classify_segment, parse_param_with_constraint, PatternSegmentType};
use crate::{ParamType, RouteError};

/// Result of parsing a route template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTemplate {
    /// Canonical template without type annotations, e.g. `/r/:id?tab`
    pub pattern: String,
    /// Path segments in order
    pub segments: Vec<PatternSegmentType>,
    /// Declared type of every path and query parameter
    pub param_types: BTreeMap<String, ParamType>,
    /// Declared query parameter names in declaration order
    pub query_params: Vec<String>,
}

/// Fold accumulator; every builder step consumes and returns the state
#[derive(Default)]
struct ParseState {
    segments: Vec<PatternSegmentType>,
    param_types: BTreeMap<String, ParamType>,
    query_params: Vec<String>,
}

impl ParseState {
    fn with_segment(mut self, template: &str, segment: PatternSegmentType) -> Result<Self, RouteError> {
        if let PatternSegmentType::Param(name, ty) = &segment {
            self = self.with_param_type(template, name, ty.clone())?;
        }
        self.segments.push(segment);
        Ok(self)
    }

    fn with_query_param(mut self, template: &str, declaration: &str) -> Result<Self, RouteError> {
        let (name, ty) = parse_param_with_constraint(declaration)?;
        if name.is_empty() {
            return Err(RouteError::invalid_template(template, "empty query parameter name"));
        }
        self = self.with_param_type(template, &name, ty)?;
        self.query_params.push(name);
        Ok(self)
    }

    fn with_param_type(
        mut self,
        template: &str,
        name: &str,
        ty: Option<ParamType>,
    ) -> Result<Self, RouteError> {
        if self.param_types.contains_key(name) {
            return Err(RouteError::invalid_template(
                template,
                format!("parameter `{}` declared twice", name),
            ));
        }
        self.param_types.insert(name.to_string(), ty.unwrap_or_default());
        Ok(self)
    }

    fn finalize(self) -> ParsedTemplate {
        let path = self
            .segments
            .iter()
            .map(PatternSegmentType::as_template)
            .collect::<Vec<_>>()
            .join("/");

        let mut pattern = format!("/{}", path);
        if !self.query_params.is_empty() {
            pattern.push('?');
            pattern.push_str(&self.query_params.join("&"));
        }

        ParsedTemplate {
            pattern,
            segments: self.segments,
            param_types: self.param_types,
            query_params: self.query_params,
        }
    }
}

/// Parses a route template (pure function)
///
/// Empty path segments are skipped, so `/r//:id/` equals `/r/:id`.
///
/// # Examples
///
/// ```
/// use waylink_router::route::parser::parse_template;
/// use waylink_router::ParamType;
///
/// let parsed = parse_template("/r/:id:number?tab").unwrap();
/// assert_eq!(parsed.pattern, "/r/:id?tab");
/// assert_eq!(parsed.segments.len(), 2);
/// assert_eq!(parsed.param_types["id"], ParamType::Number);
/// assert_eq!(parsed.param_types["tab"], ParamType::String);
/// assert_eq!(parsed.query_params, vec!["tab".to_string()]);
/// ```
pub fn parse_template(template: &str) -> Result<ParsedTemplate, RouteError> {
    let (path, query) = match template.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (template, None),
    };

    let state = path
        .split('/')
        .filter(|s| !s.is_empty())
        .try_fold(ParseState::default(), |state, segment| {
            state.with_segment(template, classify_segment(segment)?)
        })?;

    let state = query
        .into_iter()
        .flat_map(|q| q.split('&'))
        .filter(|s| !s.is_empty())
        .try_fold(state, |state, declaration| {
            state.with_query_param(template, declaration)
        })?;

    Ok(state.finalize())
}
