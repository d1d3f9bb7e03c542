// File: waylink/src/serializer.rs
// Purpose: Canonical path for a navigation state

use tracing::debug;
use waylink_router::{encode_component, PatternSegmentType, RoutePattern, RouteTable};

use crate::error::{NavError, NavResult};
use crate::state::{NavigationNode, NavigationState};

/// Renders the canonical path of a navigation state
///
/// Only the focused chains are serialized: the primary chain becomes the path,
/// the overlay chain goes after `#`. A query value is emitted from the deepest
/// node of its chain that declares the key and holds a value for it.
///
/// # Examples
///
/// ```
/// use waylink::{NavigationNode, NavigationState, ParamValue, Params, PathSerializer, RoutePattern, RouteTable};
///
/// let table = RouteTable::new()
///     .with_pattern(RoutePattern::parse("report", "/r/:id:number").unwrap())
///     .with_pattern(RoutePattern::parse("details", "/details").unwrap());
///
/// let mut params = Params::new();
/// params.insert("id".into(), ParamValue::Number(42));
/// let state = NavigationState::with_root(
///     NavigationNode::new("report", params).with_child(NavigationNode::new("details", Params::new())),
/// );
///
/// assert_eq!(PathSerializer::new(&table).serialize(&state).unwrap(), "/r/42/details");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PathSerializer<'t> {
    table: &'t RouteTable,
}

impl<'t> PathSerializer<'t> {
    pub fn new(table: &'t RouteTable) -> Self {
        PathSerializer { table }
    }

    /// Serializes `state`; an empty state renders as `/`
    ///
    /// # Errors
    ///
    /// [`NavError::UnknownRoute`] if a node names a route missing from the
    /// table, [`NavError::MissingParam`] if a node lacks a path parameter.
    pub fn serialize(&self, state: &NavigationState) -> NavResult<String> {
        let mut path = self.render_chain(&state.primary_chain())?;
        if path.is_empty() || path.starts_with('?') {
            path.insert(0, '/');
        }

        let overlay = state.overlay_chain();
        if !overlay.is_empty() {
            let rendered = self.render_chain(&overlay)?;
            path.push('#');
            if rendered.is_empty() || rendered.starts_with('?') {
                path.push('/');
            }
            path.push_str(&rendered);
        }

        Ok(path)
    }

    /// Path segments and query string of one focused chain
    fn render_chain(&self, chain: &[&NavigationNode]) -> NavResult<String> {
        let patterns = chain
            .iter()
            .map(|node| {
                self.table
                    .pattern(&node.route_name)
                    .ok_or_else(|| NavError::UnknownRoute(node.route_name.clone()))
            })
            .collect::<NavResult<Vec<_>>>()?;

        let mut path = String::new();
        for (node, pattern) in chain.iter().zip(&patterns) {
            let rendered = pattern.render_path(&node.params).ok_or_else(|| NavError::MissingParam {
                route: node.route_name.clone(),
                param: first_missing(pattern, node),
            })?;
            path.push_str(&rendered);
        }

        let mut query = Vec::new();
        for (depth, (node, pattern)) in chain.iter().zip(&patterns).enumerate() {
            for key in &pattern.query_params {
                let Some(value) = node.params.get(key) else {
                    continue;
                };
                let held_deeper = chain[depth + 1..]
                    .iter()
                    .zip(&patterns[depth + 1..])
                    .any(|(deeper, p)| p.declares_query(key) && deeper.params.contains_key(key));
                if held_deeper {
                    debug!(route = %node.route_name, key = %key, "query value shadowed by deeper route");
                    continue;
                }
                query.push(format!("{}={}", encode_component(key), encode_component(&value.to_string())));
            }
        }

        if !query.is_empty() {
            path.push('?');
            path.push_str(&query.join("&"));
        }
        Ok(path)
    }
}

fn first_missing(pattern: &RoutePattern, node: &NavigationNode) -> String {
    pattern
        .segments
        .iter()
        .find_map(|segment| match segment {
            PatternSegmentType::Param(name, _) if !node.params.contains_key(name) => {
                Some(name.clone())
            }
            _ => None,
        })
        .unwrap_or_default()
}
