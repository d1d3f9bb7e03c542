//! # Waylink Router
//!
//! Declarative route tables and deep-link path parsing:
//! - Static segments (`/settings`)
//! - Typed parameters (`/r/:id:number`, `/:tab:enum(chat|details)`)
//! - Declared query parameters (`/search?q&page:number`)
//! - Overlay presentation (side panes, full-screen modals)
//!
//! ## Matching Rules
//!
//! A path is consumed left to right. At each position the table is asked for
//! every pattern that matches a prefix of the remaining segments; the longest
//! prefix wins and ties go to the pattern declared first. A candidate whose
//! parameters fail to decode (a number that isn't one, an enum value outside
//! its set) is skipped and the failure is reported. Segments nothing matches
//! are kept as leftover for diagnostics.
//!
//! ## Example
//!
//! ```
//! use waylink_router::{PathParser, RoutePattern, RouteTable, ParamValue};
//!
//! let table = RouteTable::new()
//!     .with_pattern(RoutePattern::parse("report", "/r/:id:number").unwrap());
//!
//! let parsed = PathParser::new(&table).parse("/r/42").unwrap();
//! assert_eq!(parsed.matches[0].route_name, "report");
//! assert_eq!(parsed.matches[0].params["id"], ParamValue::Number(42));
//! assert_eq!(table.path_for("report", &parsed.matches[0].params).unwrap(), "/r/42");
//! ```

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

// ============================================================================
// Module Declarations
// ============================================================================

mod constraint;
mod error;
mod parse;
pub mod path;
mod presentation;
pub mod route;

pub use constraint::{ParamType, ParamValue, Params};
pub use error::RouteError;
pub use parse::{MatchedRoute, ParsedPath, PathParser};
pub use path::{encode_component, is_valid_path, normalize_path, split_segments};
pub use presentation::Presentation;
pub use route::pattern::{classify_segment, parse_param_with_constraint, PatternSegmentType};

// ============================================================================
// Core Types
// ============================================================================

/// A named route template with typed parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    /// Route name, unique within a table
    pub name: String,
    /// Canonical template like "/r/:id?tab"
    pub template: String,
    /// Path segments in order
    pub segments: Vec<PatternSegmentType>,
    /// Declared type of every path and query parameter
    pub param_types: BTreeMap<String, ParamType>,
    /// Declared query parameter names
    pub query_params: Vec<String>,
    /// Which stack the route is placed on
    pub presentation: Presentation,
}

/// One entry of a [`RouteTable::lookup`] result
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<'a> {
    /// The pattern whose segments matched
    pub pattern: &'a RoutePattern,
    /// Number of path segments the pattern consumed
    pub consumed: usize,
    /// Decoded parameters, or the reason decoding rejected the input
    pub params: Result<Params, RouteError>,
}

/// A pattern that can never win because an earlier one accepts all its input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shadowed {
    /// The pattern that never matches
    pub shadowed: String,
    /// The earlier pattern that takes its input
    pub by: String,
}

// ============================================================================
// RoutePattern Implementation
// ============================================================================

impl RoutePattern {
    /// Parses a pattern from a template
    ///
    /// # Examples
    ///
    /// ```
    /// use waylink_router::{RoutePattern, ParamType};
    ///
    /// let pattern = RoutePattern::parse("report", "/r/:id:number").unwrap();
    /// assert_eq!(pattern.template, "/r/:id");
    /// assert_eq!(pattern.param_type("id"), &ParamType::Number);
    /// ```
    pub fn parse(name: impl Into<String>, template: &str) -> Result<Self, RouteError> {
        let parsed = route::parse_template(template)?;
        Ok(RoutePattern {
            name: name.into(),
            template: parsed.pattern,
            segments: parsed.segments,
            param_types: parsed.param_types,
            query_params: parsed.query_params,
            presentation: Presentation::default(),
        })
    }

    /// Overrides the type of a declared parameter
    ///
    /// Names the template does not declare are ignored.
    pub fn with_param_type(mut self, name: &str, ty: ParamType) -> Self {
        if let Some(slot) = self.param_types.get_mut(name) {
            *slot = ty;
        }
        self
    }

    /// Sets how the route is presented
    pub fn with_presentation(mut self, presentation: Presentation) -> Self {
        self.presentation = presentation;
        self
    }

    /// Declared type of a parameter (untyped or unknown parameters are strings)
    pub fn param_type(&self, name: &str) -> &ParamType {
        const STRING: &ParamType = &ParamType::String;
        self.param_types.get(name).unwrap_or(STRING)
    }

    pub fn is_overlay(&self) -> bool {
        self.presentation.is_overlay()
    }

    pub fn declares_query(&self, key: &str) -> bool {
        self.query_params.iter().any(|q| q == key)
    }

    /// Matches this pattern against a prefix of `segments`
    ///
    /// Returns `None` when the literal structure does not fit. A pattern with
    /// no segments only matches an empty path.
    pub fn match_prefix(
        &self,
        segments: &[String],
        case_insensitive: bool,
    ) -> Option<Result<Params, RouteError>> {
        if self.segments.is_empty() {
            return segments.is_empty().then(|| Ok(Params::new()));
        }
        if segments.len() < self.segments.len() {
            return None;
        }

        let structural = self.segments.iter().zip(segments).all(|(pattern, input)| match pattern {
            PatternSegmentType::Static(text) if case_insensitive => text.eq_ignore_ascii_case(input),
            PatternSegmentType::Static(text) => text == input,
            PatternSegmentType::Param(..) => true,
        });
        if !structural {
            return None;
        }

        let params: Result<Params, RouteError> = self
            .segments
            .iter()
            .zip(segments)
            .filter_map(|(pattern, input)| match pattern {
                PatternSegmentType::Param(name, _) => Some((name, input)),
                PatternSegmentType::Static(_) => None,
            })
            .map(|(name, input)| {
                self.param_type(name)
                    .decode(name, input)
                    .map(|value| (name.clone(), value))
            })
            .collect();

        Some(params)
    }

    /// Renders the path part of this route with `params` substituted
    ///
    /// Returns `None` if a path parameter is missing. A pattern without
    /// segments renders as the empty string.
    ///
    /// # Examples
    ///
    /// ```
    /// use waylink_router::{RoutePattern, Params, ParamValue};
    ///
    /// let pattern = RoutePattern::parse("search", "/search/:term").unwrap();
    /// let mut params = Params::new();
    /// params.insert("term".into(), ParamValue::from("a b"));
    /// assert_eq!(pattern.render_path(&params).unwrap(), "/search/a%20b");
    /// ```
    pub fn render_path(&self, params: &Params) -> Option<String> {
        self.segments
            .iter()
            .map(|segment| match segment {
                PatternSegmentType::Static(text) => Some(encode_component(text)),
                PatternSegmentType::Param(name, _) => {
                    params.get(name).map(|value| encode_component(&value.to_string()))
                }
            })
            .try_fold(String::new(), |mut path, segment| {
                path.push('/');
                path.push_str(&segment?);
                Some(path)
            })
    }

    /// Encoded `key=value` pairs for the declared query params present in `params`
    pub fn render_query(&self, params: &Params) -> Vec<String> {
        self.query_params
            .iter()
            .filter_map(|key| {
                params
                    .get(key)
                    .map(|value| format!("{}={}", encode_component(key), encode_component(&value.to_string())))
            })
            .collect()
    }

    /// Whether this pattern accepts every input `later` accepts
    fn shadows(&self, later: &RoutePattern, case_insensitive: bool) -> bool {
        self.segments.len() == later.segments.len()
            && self.segments.iter().zip(&later.segments).all(|pair| match pair {
                (PatternSegmentType::Static(a), PatternSegmentType::Static(b)) => {
                    if case_insensitive {
                        a.eq_ignore_ascii_case(b)
                    } else {
                        a == b
                    }
                }
                (PatternSegmentType::Param(a, _), PatternSegmentType::Param(b, _)) => {
                    self.param_type(a).accepts_all_of(later.param_type(b))
                }
                (PatternSegmentType::Param(a, _), PatternSegmentType::Static(_)) => {
                    *self.param_type(a) == ParamType::String
                }
                (PatternSegmentType::Static(_), PatternSegmentType::Param(..)) => false,
            })
    }
}

// ============================================================================
// RouteTable
// ============================================================================

/// Ordered table of route patterns
///
/// Declaration order matters: it breaks ties between candidates that consume
/// the same number of segments.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    patterns: Vec<RoutePattern>,
    by_name: HashMap<String, usize>,
    case_insensitive: bool,
}

impl RouteTable {
    /// Creates an empty, case-sensitive table
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets case-insensitive comparison of literal segments
    pub fn with_case_sensitivity(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }

    /// Adds a pattern at the end of the table
    ///
    /// A pattern whose name is already present replaces the earlier definition
    /// in place, keeping its declaration position.
    pub fn with_pattern(mut self, pattern: RoutePattern) -> Self {
        match self.by_name.get(&pattern.name) {
            Some(&index) => self.patterns[index] = pattern,
            None => {
                self.by_name.insert(pattern.name.clone(), self.patterns.len());
                self.patterns.push(pattern);
            }
        }
        self
    }

    /// Adds several patterns in order
    pub fn with_patterns<I>(self, patterns: I) -> Self
    where
        I: IntoIterator<Item = RoutePattern>,
    {
        patterns.into_iter().fold(self, Self::with_pattern)
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    pub fn patterns(&self) -> &[RoutePattern] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Gets a pattern by route name (O(1) HashMap lookup)
    pub fn pattern(&self, name: &str) -> Option<&RoutePattern> {
        self.by_name.get(name).map(|&index| &self.patterns[index])
    }

    /// All patterns matching a prefix of `segments`, best candidate first
    ///
    /// Ordered by consumed segment count (longest first), then declaration
    /// order. Candidates whose parameters failed to decode are included with
    /// an `Err` so the caller can report them.
    pub fn lookup(&self, segments: &[String]) -> Vec<Candidate<'_>> {
        let mut candidates: Vec<Candidate<'_>> = self
            .patterns
            .iter()
            .filter_map(|pattern| {
                pattern
                    .match_prefix(segments, self.case_insensitive)
                    .map(|params| Candidate {
                        pattern,
                        consumed: pattern.segments.len(),
                        params,
                    })
            })
            .collect();

        // Stable sort keeps declaration order among equal lengths
        candidates.sort_by_key(|candidate| Reverse(candidate.consumed));
        candidates
    }

    /// Generates the path for a named route, query included
    ///
    /// Returns `None` if the route is unknown or a path parameter is missing.
    ///
    /// # Examples
    ///
    /// ```
    /// use waylink_router::{RoutePattern, RouteTable, Params, ParamValue};
    ///
    /// let table = RouteTable::new()
    ///     .with_pattern(RoutePattern::parse("search", "/search?q").unwrap());
    ///
    /// let mut params = Params::new();
    /// params.insert("q".into(), ParamValue::from("rust"));
    /// assert_eq!(table.path_for("search", &params).unwrap(), "/search?q=rust");
    /// ```
    pub fn path_for(&self, name: &str, params: &Params) -> Option<String> {
        let pattern = self.pattern(name)?;
        let mut path = pattern.render_path(params)?;
        if path.is_empty() {
            path.push('/');
        }

        let query = pattern.render_query(params);
        if !query.is_empty() {
            path.push('?');
            path.push_str(&query.join("&"));
        }
        Some(path)
    }

    /// Patterns that can never be selected because an earlier one wins every tie
    pub fn shadowed(&self) -> Vec<Shadowed> {
        self.patterns
            .iter()
            .enumerate()
            .filter_map(|(index, later)| {
                self.patterns[..index]
                    .iter()
                    .find(|earlier| earlier.shadows(later, self.case_insensitive))
                    .map(|earlier| Shadowed {
                        shadowed: later.name.clone(),
                        by: earlier.name.clone(),
                    })
            })
            .collect()
    }
}
