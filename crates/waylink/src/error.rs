// File: waylink/src/error.rs
// Purpose: Errors surfaced by state mutation

use waylink_router::RouteError;

/// Errors produced while resolving or committing navigation state
///
/// None of these leave the store in a partially updated state: on error the
/// previously committed [`NavigationState`](crate::NavigationState) is kept.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavError {
    /// No root could be produced (nothing matched and there is no current tree)
    #[error("navigation state has no root after applying {matches} match(es)")]
    UnresolvableState { matches: usize },

    /// The computation was based on a revision that is no longer current
    #[error("stale apply: prepared against revision {based_on}, current is {current}")]
    StaleApply { based_on: u64, current: u64 },

    /// A node names a route the table does not know
    #[error("unknown route `{0}`")]
    UnknownRoute(String),

    /// A node lacks a parameter its template needs
    #[error("route `{route}` is missing parameter `{param}`")]
    MissingParam { route: String, param: String },

    /// A parameter the route's template does not declare
    #[error("route `{route}` does not declare parameter `{param}`")]
    UndeclaredParam { route: String, param: String },

    /// There is nothing to close on the requested stack
    #[error("nothing to close on the {0} stack")]
    NothingToClose(&'static str),

    /// Path parsing failed
    #[error(transparent)]
    Route(#[from] RouteError),
}

pub type NavResult<T> = Result<T, NavError>;
