/// Path parsing against a [`RouteTable`]
///
/// Turns `/r/42/details?tab=chat#/settings` into an ordered list of
/// [`MatchedRoute`]s. The part after `#` addresses the overlay stack and is
/// parsed with the same rules as the primary part.
use serde::Serialize;

use crate::path::{decode_component, encode_component, split_segments};
use crate::{Params, Presentation, RouteError, RouteTable};

/// A route recognized in a path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedRoute {
    pub route_name: String,
    pub params: Params,
    /// Number of path segments this route consumed
    pub consumed_segments: usize,
    pub presentation: Presentation,
}

impl MatchedRoute {
    /// Creates a screen-presented match that consumed no segments
    pub fn new(route_name: impl Into<String>, params: Params) -> Self {
        MatchedRoute {
            route_name: route_name.into(),
            params,
            consumed_segments: 0,
            presentation: Presentation::Screen,
        }
    }

    pub fn with_presentation(mut self, presentation: Presentation) -> Self {
        self.presentation = presentation;
        self
    }

    pub fn is_overlay(&self) -> bool {
        self.presentation.is_overlay()
    }
}

/// Result of [`PathParser::parse`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPath {
    /// Recognized routes: primary part first, then the overlay part
    pub matches: Vec<MatchedRoute>,
    /// Unmatched trailing segments and unclaimed query pairs, diagnostic only
    pub leftover: Option<String>,
    /// Candidates skipped because their parameters did not decode
    pub rejected: Vec<RouteError>,
}

impl ParsedPath {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    fn push_leftover(&mut self, leftover: String) {
        match &mut self.leftover {
            Some(existing) => existing.push_str(&leftover),
            None => self.leftover = Some(leftover),
        }
    }
}

/// Parses paths and full URLs against a route table
///
/// # Examples
///
/// ```
/// use waylink_router::{PathParser, RoutePattern, RouteTable};
///
/// let table = RouteTable::new()
///     .with_pattern(RoutePattern::parse("report", "/r/:id").unwrap());
/// let parser = PathParser::new(&table).with_prefixes(["https://app.example.com"]);
///
/// let parsed = parser.parse("https://app.example.com/r/42/unknown").unwrap();
/// assert_eq!(parsed.matches.len(), 1);
/// assert_eq!(parsed.leftover.as_deref(), Some("/unknown"));
/// ```
#[derive(Debug, Clone)]
pub struct PathParser<'t> {
    table: &'t RouteTable,
    prefixes: Vec<String>,
}

impl<'t> PathParser<'t> {
    pub fn new(table: &'t RouteTable) -> Self {
        PathParser {
            table,
            prefixes: Vec::new(),
        }
    }

    /// URL prefixes removed before parsing (longest match wins)
    pub fn with_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefixes.extend(prefixes.into_iter().map(Into::into));
        self
    }

    /// Parses a path or URL
    ///
    /// # Errors
    ///
    /// Only [`RouteError::MalformedPath`]; unmatched input is reported as
    /// leftover instead.
    pub fn parse(&self, input: &str) -> Result<ParsedPath, RouteError> {
        let path = self.strip_prefix(input.trim());
        let (primary, overlay) = match path.split_once('#') {
            Some((primary, overlay)) => (primary, Some(overlay)),
            None => (path, None),
        };

        // "#/x" addresses only the overlay stack; "/#/x" also names the root path
        let overlay_only = primary.is_empty() && overlay.is_some();

        let mut parsed = ParsedPath::default();
        if !overlay_only {
            self.parse_part(primary, "", &mut parsed)?;
        }
        if let Some(overlay) = overlay.filter(|o| !o.is_empty()) {
            self.parse_part(overlay, "#", &mut parsed)?;
        }
        Ok(parsed)
    }

    fn strip_prefix<'a>(&self, input: &'a str) -> &'a str {
        let configured = self
            .prefixes
            .iter()
            .filter(|prefix| !prefix.is_empty() && input.starts_with(prefix.as_str()))
            .max_by_key(|prefix| prefix.len());

        if let Some(prefix) = configured {
            return &input[prefix.len()..];
        }

        // Unconfigured absolute URL: drop scheme and authority
        match input.split_once("://") {
            Some((scheme, rest))
                if !scheme.is_empty()
                    && scheme
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) =>
            {
                rest.find(|c| matches!(c, '/' | '?' | '#')).map_or("", |i| &rest[i..])
            }
            _ => input,
        }
    }

    fn parse_part(&self, part: &str, marker: &str, out: &mut ParsedPath) -> Result<(), RouteError> {
        let (path, query) = match part.split_once('?') {
            Some((path, query)) => (path, query),
            None => (part, ""),
        };

        let segments = split_segments(path)?;
        let first = out.matches.len();
        let mut position = 0;

        while let Some(matched) = self.match_at(&segments[position..], &mut out.rejected) {
            position += matched.consumed_segments;
            let done = matched.consumed_segments == 0 || position == segments.len();
            out.matches.push(matched);
            if done {
                break;
            }
        }

        let mut leftover = String::new();
        for segment in &segments[position..] {
            leftover.push('/');
            leftover.push_str(&encode_component(segment));
        }

        let unclaimed = self.assign_query(part, query, first, out)?;
        if !unclaimed.is_empty() {
            leftover.push('?');
            leftover.push_str(&unclaimed.join("&"));
        }

        if !leftover.is_empty() {
            out.push_leftover(format!("{}{}", marker, leftover));
        }
        Ok(())
    }

    /// Best decodable candidate for the start of `rest`
    fn match_at(&self, rest: &[String], rejected: &mut Vec<RouteError>) -> Option<MatchedRoute> {
        for candidate in self.table.lookup(rest) {
            match candidate.params {
                Ok(params) => {
                    return Some(MatchedRoute {
                        route_name: candidate.pattern.name.clone(),
                        params,
                        consumed_segments: candidate.consumed,
                        presentation: candidate.pattern.presentation,
                    })
                }
                Err(err) => rejected.push(err),
            }
        }
        None
    }

    /// Binds query pairs to the deepest route of this part declaring them
    ///
    /// Returns the pairs nobody claimed, as they appeared in the input.
    fn assign_query(
        &self,
        part: &str,
        query: &str,
        first: usize,
        out: &mut ParsedPath,
    ) -> Result<Vec<String>, RouteError> {
        let mut unclaimed = Vec::new();

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode_component(raw_key).map_err(|reason| RouteError::malformed(part, reason))?;
            let value =
                decode_component(raw_value).map_err(|reason| RouteError::malformed(part, reason))?;

            let owner = out.matches[first..]
                .iter()
                .rposition(|m| {
                    self.table
                        .pattern(&m.route_name)
                        .is_some_and(|p| p.declares_query(&key))
                })
                .map(|i| first + i);

            let Some(index) = owner else {
                unclaimed.push(pair.to_string());
                continue;
            };
            let Some(pattern) = self.table.pattern(&out.matches[index].route_name) else {
                unclaimed.push(pair.to_string());
                continue;
            };

            match pattern.param_type(&key).decode(&key, &value) {
                Ok(decoded) => {
                    out.matches[index].params.insert(key, decoded);
                }
                Err(err) => {
                    out.rejected.push(err);
                    unclaimed.push(pair.to_string());
                }
            }
        }

        Ok(unclaimed)
    }
}
