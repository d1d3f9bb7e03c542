// File: waylink/src/adapter.rs
// Purpose: Fold parsed matches into a navigation tree

use tracing::{debug, trace};
use waylink_router::{MatchedRoute, ParsedPath, Presentation};

use crate::error::{NavError, NavResult};
use crate::state::{NavigationNode, NavigationState};

/// Reconciles a list of matched routes with the current navigation tree
///
/// Matches are split by presentation. Screen routes are folded into the
/// primary stack starting at the root; overlay routes are folded into the
/// root's overlay stack. At each depth:
///
/// - the focused node is the same route with identical params: keep it and
///   descend
/// - otherwise the incoming route takes over that depth: it replaces the
///   focused node (same route, new params) or is appended as the new focused
///   leaf with its former siblings pruned, and everything beneath is rebuilt
///   from the remaining matches
///
/// A full-screen overlay route resets the overlay stack unless the stack is
/// already rooted at that exact route.
///
/// The input state is never modified; a new snapshot with the next revision is
/// returned.
#[derive(Debug, Clone, Default)]
pub struct StateAdapter {
    initial_route: Option<NavigationNode>,
}

impl StateAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Root used when a link only resolves overlay routes against an empty tree
    pub fn with_initial_route(mut self, node: NavigationNode) -> Self {
        self.initial_route = Some(node);
        self
    }

    pub fn initial_route(&self) -> Option<&NavigationNode> {
        self.initial_route.as_ref()
    }

    /// Applies `matches` to `current`
    ///
    /// # Errors
    ///
    /// [`NavError::UnresolvableState`] when the result would have no root.
    pub fn apply(&self, current: &NavigationState, matches: &[MatchedRoute]) -> NavResult<NavigationState> {
        self.fold(current, matches, None)
    }

    /// Applies a parser result, keeping its leftover as an annotation
    pub fn apply_parsed(&self, current: &NavigationState, parsed: &ParsedPath) -> NavResult<NavigationState> {
        self.fold(current, &parsed.matches, parsed.leftover.clone())
    }

    fn fold(
        &self,
        current: &NavigationState,
        matches: &[MatchedRoute],
        leftover: Option<String>,
    ) -> NavResult<NavigationState> {
        let (overlay, primary): (Vec<&MatchedRoute>, Vec<&MatchedRoute>) =
            matches.iter().partition(|m| m.is_overlay());

        let root = match &current.root {
            None if primary.is_empty() && !overlay.is_empty() => self.initial_route.clone(),
            root => fold_stack(root.as_ref(), &primary),
        };

        let Some(mut root) = root else {
            debug!(matches = matches.len(), "no root after apply");
            return Err(NavError::UnresolvableState { matches: matches.len() });
        };

        let existing_overlay = current.overlay();
        root.overlay = fold_overlay(existing_overlay, &overlay).map(Box::new);

        trace!(
            revision = current.revision + 1,
            primary = primary.len(),
            overlay = overlay.len(),
            "state folded"
        );
        Ok(current.successor(root, leftover))
    }
}

/// Folds `matches` into a stack whose current top-level node is `current`
///
/// With no matches the stack is kept as is.
fn fold_stack(current: Option<&NavigationNode>, matches: &[&MatchedRoute]) -> Option<NavigationNode> {
    match (current, matches.split_first()) {
        (Some(node), Some((first, rest))) if node.is_same_as(first) => {
            let mut node = node.clone();
            fold_children(&mut node, rest);
            Some(node)
        }
        (_, Some((first, rest))) => Some(NavigationNode::chain(first, rest)),
        (current, None) => current.cloned(),
    }
}

fn fold_children(parent: &mut NavigationNode, matches: &[&MatchedRoute]) {
    let Some((first, rest)) = matches.split_first() else {
        return;
    };

    let focused_is_same = parent.focused_child().is_some_and(|child| child.is_same_as(first));
    if focused_is_same {
        if let Some(focused) = parent.children.last_mut() {
            fold_children(focused, rest);
        }
    } else {
        parent.children = vec![NavigationNode::chain(first, rest)];
    }
}

fn fold_overlay(current: Option<&NavigationNode>, matches: &[&MatchedRoute]) -> Option<NavigationNode> {
    let reset_at = matches
        .iter()
        .rposition(|m| m.presentation == Presentation::FullScreen);

    match reset_at {
        Some(index) => {
            let base = current.filter(|node| node.is_same_as(matches[index]));
            fold_stack(base, &matches[index..])
        }
        None => fold_stack(current, matches),
    }
}
