// File: waylink/src/state.rs
// Purpose: Navigation tree and revisioned state snapshots

use serde::Serialize;
use waylink_router::{MatchedRoute, Params};

use crate::error::{NavError, NavResult};

/// One level of a navigation stack
///
/// `children` is the stack beneath this node; the focused child is the last
/// one. `overlay` is the independent overlay stack (side panes, modals) and is
/// only attached to the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationNode {
    pub route_name: String,
    pub params: Params,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavigationNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay: Option<Box<NavigationNode>>,
}

impl NavigationNode {
    pub fn new(route_name: impl Into<String>, params: Params) -> Self {
        NavigationNode {
            route_name: route_name.into(),
            params,
            children: Vec::new(),
            overlay: None,
        }
    }

    pub fn from_match(matched: &MatchedRoute) -> Self {
        Self::new(matched.route_name.clone(), matched.params.clone())
    }

    /// Builds `first → rest[0] → rest[1] …` as a single focused chain
    pub(crate) fn chain(first: &MatchedRoute, rest: &[&MatchedRoute]) -> Self {
        let mut node = Self::from_match(first);
        if let Some((next, tail)) = rest.split_first() {
            node.children.push(Self::chain(next, tail));
        }
        node
    }

    pub fn with_child(mut self, child: NavigationNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_overlay(mut self, overlay: NavigationNode) -> Self {
        self.overlay = Some(Box::new(overlay));
        self
    }

    /// Same route with identical params
    pub fn is_same_as(&self, matched: &MatchedRoute) -> bool {
        self.route_name == matched.route_name && self.params == matched.params
    }

    pub fn focused_child(&self) -> Option<&NavigationNode> {
        self.children.last()
    }

    /// This node followed by its focused descendants, outermost first
    pub fn focused_chain(&self) -> Vec<&NavigationNode> {
        std::iter::successors(Some(self), |node| node.focused_child()).collect()
    }

    pub fn depth(&self) -> usize {
        self.focused_chain().len()
    }

    /// Copy of this chain with the deepest focused node removed
    ///
    /// Returns `None` when this node is itself the leaf.
    fn without_leaf(&self) -> Option<NavigationNode> {
        let focused = self.focused_child()?;
        let mut node = self.clone();
        match focused.without_leaf() {
            Some(trimmed) => {
                if let Some(last) = node.children.last_mut() {
                    *last = trimmed;
                }
            }
            None => {
                node.children.pop();
            }
        }
        Some(node)
    }

    /// Removes placeholder routes from the focused chain below this node
    ///
    /// A placeholder with a focused child is replaced by that child, which
    /// also takes over its overlay. A placeholder leaf under another route is
    /// dropped.
    fn collapse_placeholders(mut self, is_placeholder: &dyn Fn(&str) -> bool) -> NavigationNode {
        let Some(child) = self.children.pop() else {
            return self;
        };

        let child = child.collapse_placeholders(is_placeholder);
        if is_placeholder(&self.route_name) {
            let mut child = child;
            if self.overlay.is_some() {
                child.overlay = self.overlay.take();
            }
            return child;
        }

        if !(is_placeholder(&child.route_name) && child.children.is_empty()) {
            self.children.push(child);
        }
        self
    }

    /// Copy of this chain with `leaf` pushed beneath the deepest focused node
    fn with_leaf(&self, leaf: NavigationNode) -> NavigationNode {
        let mut node = self.clone();
        match node.children.last_mut() {
            Some(focused) => *focused = focused.with_leaf(leaf),
            None => node.children.push(leaf),
        }
        node
    }
}

/// A committed snapshot of the navigation tree
///
/// `revision` grows by one on every accepted transition, so a computation
/// prepared against an older snapshot can be detected and rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NavigationState {
    pub root: Option<NavigationNode>,
    pub revision: u64,
    /// Unmatched input from the link that produced this state (diagnostic only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leftover: Option<String>,
}

impl NavigationState {
    /// The state before any navigation: no root, revision 0
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_root(root: NavigationNode) -> Self {
        NavigationState {
            root: Some(root),
            revision: 0,
            leftover: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Equality of the trees, ignoring revision and leftover
    pub fn structurally_eq(&self, other: &NavigationState) -> bool {
        self.root == other.root
    }

    /// Focused primary chain, root first
    pub fn primary_chain(&self) -> Vec<&NavigationNode> {
        self.root.as_ref().map(NavigationNode::focused_chain).unwrap_or_default()
    }

    /// Focused overlay chain, outermost overlay first
    pub fn overlay_chain(&self) -> Vec<&NavigationNode> {
        self.overlay()
            .map(NavigationNode::focused_chain)
            .unwrap_or_default()
    }

    pub fn overlay(&self) -> Option<&NavigationNode> {
        self.root.as_ref().and_then(|root| root.overlay.as_deref())
    }

    pub fn primary_leaf(&self) -> Option<&NavigationNode> {
        self.primary_chain().pop()
    }

    pub fn overlay_leaf(&self) -> Option<&NavigationNode> {
        self.overlay_chain().pop()
    }

    /// Next revision carrying `root`
    pub(crate) fn successor(&self, root: NavigationNode, leftover: Option<String>) -> NavigationState {
        NavigationState {
            root: Some(root),
            revision: self.revision + 1,
            leftover,
        }
    }

    /// Copy without placeholder routes inside the focused chains
    ///
    /// `is_placeholder` names routes whose path renders empty, like a `/`
    /// home route. Such a route has no place inside a longer path, so it only
    /// survives as the sole node of its stack. Revision and leftover are kept.
    pub fn without_placeholders(&self, is_placeholder: impl Fn(&str) -> bool) -> NavigationState {
        let root = self.root.clone().map(|mut root| {
            root.overlay = root
                .overlay
                .take()
                .map(|overlay| Box::new(overlay.collapse_placeholders(&is_placeholder)));
            root.collapse_placeholders(&is_placeholder)
        });

        NavigationState {
            root,
            revision: self.revision,
            leftover: self.leftover.clone(),
        }
    }

    fn root_or_err(&self, stack: &'static str) -> NavResult<&NavigationNode> {
        self.root.as_ref().ok_or(NavError::NothingToClose(stack))
    }

    /// Closes the focused primary leaf; the overlay stack is untouched
    ///
    /// The root itself cannot be closed.
    pub fn close_primary_leaf(&self) -> NavResult<NavigationState> {
        let root = self.root_or_err("primary")?;
        let trimmed = root.without_leaf().ok_or(NavError::NothingToClose("primary"))?;
        Ok(self.successor(trimmed, None))
    }

    /// Closes the focused overlay leaf; the primary stack is untouched
    pub fn close_overlay_leaf(&self) -> NavResult<NavigationState> {
        let root = self.root_or_err("overlay")?;
        let overlay = root.overlay.as_deref().ok_or(NavError::NothingToClose("overlay"))?;

        let mut next = root.clone();
        next.overlay = overlay.without_leaf().map(Box::new);
        Ok(self.successor(next, None))
    }

    /// Closes the whole overlay stack
    pub fn close_overlay(&self) -> NavResult<NavigationState> {
        let root = self.root_or_err("overlay")?;
        if root.overlay.is_none() {
            return Err(NavError::NothingToClose("overlay"));
        }

        let mut next = root.clone();
        next.overlay = None;
        Ok(self.successor(next, None))
    }

    /// Pushes `node` on top of the primary stack
    pub fn push_primary(&self, node: NavigationNode) -> NavigationState {
        let next = match &self.root {
            Some(root) => root.with_leaf(node),
            None => node,
        };
        self.successor(next, None)
    }

    /// Pushes `node` on top of the overlay stack
    ///
    /// Fails with [`NavError::UnresolvableState`] when there is no root to
    /// attach the overlay to.
    pub fn push_overlay(&self, node: NavigationNode) -> NavResult<NavigationState> {
        let root = self
            .root
            .as_ref()
            .ok_or(NavError::UnresolvableState { matches: 1 })?;

        let mut next = root.clone();
        next.overlay = Some(Box::new(match root.overlay.as_deref() {
            Some(overlay) => overlay.with_leaf(node),
            None => node,
        }));
        Ok(self.successor(next, None))
    }
}
