// File: waylink/src/store.rs
// Purpose: Single owner of the committed navigation state

use std::sync::Arc;

use tracing::{debug, info, warn};
use waylink_router::{
    MatchedRoute, ParsedPath, PathParser, Params, PatternSegmentType, RouteError, RoutePattern, RouteTable,
};

use crate::adapter::StateAdapter;
use crate::error::{NavError, NavResult};
use crate::link::PendingLinkEvent;
use crate::serializer::PathSerializer;
use crate::state::{NavigationNode, NavigationState};

/// A state computed against a known revision, not yet committed
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedNavigation {
    pub based_on: u64,
    pub state: NavigationState,
    /// Parser diagnostics for the link this was prepared from
    pub rejected: Vec<RouteError>,
}

/// What happened to a delivered link
#[derive(Debug, Clone, PartialEq)]
pub enum LinkOutcome {
    /// The link produced a new committed revision
    Committed { revision: u64 },
    /// A newer link arrived first; nothing was applied
    Superseded { by: u64 },
    /// The link could not be applied; the state is unchanged
    Failed(NavError),
}

/// Owns the committed [`NavigationState`]
///
/// Every change goes through [`commit`](Self::commit), which only accepts a
/// state prepared against the current revision. Share it behind a
/// `tokio::sync::Mutex` when links and user actions come from several tasks.
#[derive(Debug, Clone)]
pub struct NavigationStore {
    table: Arc<RouteTable>,
    prefixes: Vec<String>,
    adapter: StateAdapter,
    state: NavigationState,
}

impl NavigationStore {
    pub fn new(table: RouteTable) -> Self {
        Self::with_shared_table(Arc::new(table))
    }

    pub fn with_shared_table(table: Arc<RouteTable>) -> Self {
        NavigationStore {
            table,
            prefixes: Vec::new(),
            adapter: StateAdapter::new(),
            state: NavigationState::empty(),
        }
    }

    pub fn with_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefixes.extend(prefixes.into_iter().map(Into::into));
        self
    }

    pub fn with_adapter(mut self, adapter: StateAdapter) -> Self {
        self.adapter = adapter;
        self
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn revision(&self) -> u64 {
        self.state.revision
    }

    /// Parses `url` with the store's table and prefixes
    pub fn parse(&self, url: &str) -> NavResult<ParsedPath> {
        let parser = PathParser::new(&self.table).with_prefixes(self.prefixes.iter().cloned());
        Ok(parser.parse(url)?)
    }

    /// Computes the state `url` leads to from the current snapshot
    ///
    /// A malformed path degrades to "no match": the tree is kept and the raw
    /// input becomes the leftover.
    pub fn prepare(&self, url: &str) -> NavResult<PreparedNavigation> {
        let parsed = match self.parse(url) {
            Ok(parsed) => parsed,
            Err(NavError::Route(err @ RouteError::MalformedPath { .. })) => {
                warn!(url, "malformed link: {}", err);
                ParsedPath {
                    matches: Vec::new(),
                    leftover: Some(url.to_string()),
                    rejected: vec![err],
                }
            }
            Err(err) => return Err(err),
        };

        for rejected in &parsed.rejected {
            debug!(url, "candidate rejected: {}", rejected);
        }

        let state = self.without_placeholders(self.adapter.apply_parsed(&self.state, &parsed)?);
        Ok(PreparedNavigation {
            based_on: self.state.revision,
            state,
            rejected: parsed.rejected,
        })
    }

    /// Computes the state `matches` lead to from the current snapshot
    pub fn prepare_matches(&self, matches: &[MatchedRoute]) -> NavResult<PreparedNavigation> {
        Ok(PreparedNavigation {
            based_on: self.state.revision,
            state: self.without_placeholders(self.adapter.apply(&self.state, matches)?),
            rejected: Vec::new(),
        })
    }

    /// Installs a prepared state
    ///
    /// # Errors
    ///
    /// [`NavError::StaleApply`] if another change was committed since the
    /// state was prepared.
    pub fn commit(&mut self, prepared: PreparedNavigation) -> NavResult<&NavigationState> {
        if prepared.based_on != self.state.revision {
            warn!(
                based_on = prepared.based_on,
                current = self.state.revision,
                "rejecting stale navigation"
            );
            return Err(NavError::StaleApply {
                based_on: prepared.based_on,
                current: self.state.revision,
            });
        }

        self.state = prepared.state;
        debug!(revision = self.state.revision, "navigation committed");
        Ok(&self.state)
    }

    /// Parses, applies and commits `url`
    pub fn navigate(&mut self, url: &str) -> NavResult<&NavigationState> {
        let prepared = self.prepare(url)?;
        self.commit(prepared)
    }

    /// Handles a delivered link, skipping it when a newer one has arrived
    pub fn handle_link(&mut self, event: &PendingLinkEvent, latest_seq: u64) -> LinkOutcome {
        if event.is_superseded(latest_seq) {
            debug!(seq = event.seq, latest_seq, "link superseded");
            return LinkOutcome::Superseded { by: latest_seq };
        }

        match self.navigate(&event.path) {
            Ok(state) => {
                info!(seq = event.seq, revision = state.revision, path = %event.path, "link applied");
                LinkOutcome::Committed {
                    revision: state.revision,
                }
            }
            Err(err) => {
                warn!(seq = event.seq, path = %event.path, "link not applied: {}", err);
                LinkOutcome::Failed(err)
            }
        }
    }

    /// Pushes a route on the stack its presentation belongs to
    ///
    /// `params` are decoded with the route's declared types, so a value like
    /// `"42"` for a number parameter is stored as a number.
    ///
    /// # Errors
    ///
    /// [`NavError::MissingParam`] for an absent or empty path parameter,
    /// [`NavError::UndeclaredParam`] for a key the template does not declare,
    /// and [`NavError::Route`] for a value its type rejects. The state is
    /// unchanged on error.
    pub fn push(&mut self, route_name: &str, params: Params) -> NavResult<&NavigationState> {
        let pattern = self
            .table
            .pattern(route_name)
            .ok_or_else(|| NavError::UnknownRoute(route_name.to_string()))?;

        let node = NavigationNode::new(route_name, checked_params(pattern, params)?);
        let next = if pattern.is_overlay() {
            self.state.push_overlay(node)?
        } else {
            self.state.push_primary(node)
        };
        let next = self.without_placeholders(next);
        self.install(next)
    }

    pub fn close_primary_leaf(&mut self) -> NavResult<&NavigationState> {
        let next = self.state.close_primary_leaf()?;
        self.install(next)
    }

    pub fn close_overlay_leaf(&mut self) -> NavResult<&NavigationState> {
        let next = self.state.close_overlay_leaf()?;
        self.install(next)
    }

    pub fn close_overlay(&mut self) -> NavResult<&NavigationState> {
        let next = self.state.close_overlay()?;
        self.install(next)
    }

    /// Canonical path of the committed state
    pub fn canonical_path(&self) -> NavResult<String> {
        PathSerializer::new(&self.table).serialize(&self.state)
    }

    /// Drops routes whose path renders empty from inside longer chains
    fn without_placeholders(&self, state: NavigationState) -> NavigationState {
        let table = &self.table;
        state.without_placeholders(|name| table.pattern(name).is_some_and(|p| p.segments.is_empty()))
    }

    fn install(&mut self, next: NavigationState) -> NavResult<&NavigationState> {
        self.commit(PreparedNavigation {
            based_on: self.state.revision,
            state: next,
            rejected: Vec::new(),
        })
    }
}

/// Validates and decodes `params` against `pattern`
fn checked_params(pattern: &RoutePattern, params: Params) -> NavResult<Params> {
    for segment in &pattern.segments {
        if let PatternSegmentType::Param(name, _) = segment {
            let present = params.get(name).is_some_and(|value| !value.to_string().is_empty());
            if !present {
                return Err(NavError::MissingParam {
                    route: pattern.name.clone(),
                    param: name.clone(),
                });
            }
        }
    }

    params
        .into_iter()
        .map(|(key, value)| {
            if !pattern.param_types.contains_key(&key) && !pattern.declares_query(&key) {
                return Err(NavError::UndeclaredParam {
                    route: pattern.name.clone(),
                    param: key,
                });
            }
            let decoded = pattern.param_type(&key).decode(&key, &value.to_string())?;
            Ok((key, decoded))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use waylink_router::{ParamValue, Presentation, RoutePattern};

    fn store() -> NavigationStore {
        NavigationStore::new(RouteTable::new().with_patterns([
            RoutePattern::parse("report", "/r/:id:number").unwrap(),
            RoutePattern::parse("details", "/details").unwrap(),
            RoutePattern::parse("settings", "/settings")
                .unwrap()
                .with_presentation(Presentation::SidePane),
        ]))
    }

    fn event(seq: u64, path: &str) -> PendingLinkEvent {
        PendingLinkEvent {
            seq,
            path: path.to_string(),
            received_at: Utc::now(),
        }
    }

    #[test]
    fn test_navigate_commits_revision() {
        let mut store = store();
        assert_eq!(store.navigate("/r/42/details").unwrap().revision, 1);
        assert_eq!(store.canonical_path().unwrap(), "/r/42/details");
    }

    #[test]
    fn test_stale_prepared_state_is_rejected() {
        let mut store = store();
        store.navigate("/r/1").unwrap();

        let first = store.prepare("/r/2").unwrap();
        let second = store.prepare("/r/3").unwrap();
        store.commit(first).unwrap();

        assert_eq!(
            store.commit(second),
            Err(NavError::StaleApply { based_on: 1, current: 2 })
        );
        assert_eq!(store.canonical_path().unwrap(), "/r/2");
    }

    #[test]
    fn test_unresolvable_keeps_state() {
        let mut store = store();
        assert_eq!(
            store.navigate("/nowhere"),
            Err(NavError::UnresolvableState { matches: 0 })
        );
        assert!(store.state().is_empty());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_malformed_link_degrades_to_no_match() {
        let mut store = store();
        store.navigate("/r/1").unwrap();
        let state = store.navigate("/r/%E2%28").unwrap();
        assert_eq!(state.revision, 2);
        assert_eq!(state.leftover.as_deref(), Some("/r/%E2%28"));
        assert_eq!(store.canonical_path().unwrap(), "/r/1");
    }

    #[test]
    fn test_superseded_link_is_skipped() {
        let mut store = store();
        assert_eq!(
            store.handle_link(&event(1, "/r/1"), 2),
            LinkOutcome::Superseded { by: 2 }
        );
        assert_eq!(
            store.handle_link(&event(2, "/r/2"), 2),
            LinkOutcome::Committed { revision: 1 }
        );
    }

    #[test]
    fn test_push_and_close() {
        let mut store = store();
        store.navigate("/r/1").unwrap();
        store.push("details", Params::new()).unwrap();
        store.push("settings", Params::new()).unwrap();
        assert_eq!(store.canonical_path().unwrap(), "/r/1/details#/settings");

        store.close_primary_leaf().unwrap();
        assert_eq!(store.canonical_path().unwrap(), "/r/1#/settings");

        store.close_overlay().unwrap();
        assert_eq!(store.canonical_path().unwrap(), "/r/1");
        assert_eq!(store.close_overlay_leaf(), Err(NavError::NothingToClose("overlay")));
        assert_eq!(store.revision(), 5);
    }

    #[test]
    fn test_push_decodes_params_with_declared_types() {
        let mut store = store();
        store.navigate("/details").unwrap();

        let mut params = Params::new();
        params.insert("id".into(), ParamValue::from("42"));
        store.push("report", params).unwrap();

        assert_eq!(store.state().primary_leaf().unwrap().params["id"], ParamValue::Number(42));
        assert_eq!(store.canonical_path().unwrap(), "/details/r/42");
    }

    #[test]
    fn test_push_rejects_invalid_params_and_keeps_state() {
        let mut store = store();
        store.navigate("/r/1/details").unwrap();
        let before = store.state().clone();

        assert_eq!(
            store.push("report", Params::new()),
            Err(NavError::MissingParam {
                route: "report".into(),
                param: "id".into()
            })
        );

        let mut params = Params::new();
        params.insert("id".into(), ParamValue::from("abc"));
        assert_eq!(
            store.push("report", params),
            Err(NavError::Route(RouteError::InvalidNumber {
                param: "id".into(),
                value: "abc".into()
            }))
        );

        let mut params = Params::new();
        params.insert("id".into(), ParamValue::Number(2));
        params.insert("utm".into(), ParamValue::from("x"));
        assert_eq!(
            store.push("report", params),
            Err(NavError::UndeclaredParam {
                route: "report".into(),
                param: "utm".into()
            })
        );

        assert_eq!(store.state(), &before);
        assert_eq!(store.canonical_path().unwrap(), "/r/1/details");
    }

    #[test]
    fn test_push_unknown_route() {
        let mut store = store();
        let mut params = Params::new();
        params.insert("id".into(), ParamValue::Number(1));
        assert_eq!(
            store.push("ghost", params),
            Err(NavError::UnknownRoute("ghost".into()))
        );
    }
}
