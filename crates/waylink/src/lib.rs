//! # Waylink
//!
//! Reconciles deep links with a navigation tree.
//!
//! A link such as `https://app.example.com/r/42/details#/settings` is parsed
//! against a [`RouteTable`] into matched routes, folded into the current
//! [`NavigationState`] by the [`StateAdapter`], and committed by the
//! [`NavigationStore`] under a revision check. The [`PathSerializer`] turns any
//! reachable state back into its canonical link.
//!
//! ## Pieces
//!
//! - [`LinkSubscription`]: fan-out of incoming links to async subscribers,
//!   in arrival order, with duplicate suppression
//! - [`ModalVisibilityCoordinator`] and [`ModalLifecycle`]: shared modal
//!   visibility, close-all, and focus hand-off around modal show/hide
//! - [`LinkingConfig`]: routes, prefixes and subscription settings from TOML
//!
//! ## Example
//!
//! ```
//! use waylink::LinkingConfig;
//!
//! let config = LinkingConfig::from_toml_str(r#"
//!     [[routes]]
//!     name = "report"
//!     template = "/r/:id"
//!     params = { id = "number" }
//!
//!     [[routes]]
//!     name = "settings"
//!     template = "/settings"
//!     presentation = "side_pane"
//! "#).unwrap();
//!
//! let mut store = config.build_store().unwrap();
//! store.navigate("/r/42#/settings").unwrap();
//! assert_eq!(store.canonical_path().unwrap(), "/r/42#/settings");
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

mod adapter;
mod config;
mod error;
mod link;
mod modal;
mod serializer;
mod state;
mod store;

pub use adapter::StateAdapter;
pub use config::{LinkingConfig, RouteConfig, SubscriptionConfig};
pub use error::{NavError, NavResult};
pub use link::{LinkSource, LinkSubscription, PendingLinkEvent, Subscription};
pub use modal::{
    FocusManager, HandlerId, ModalCallbacks, ModalLifecycle, ModalOptions, ModalPhase,
    ModalVisibilityCoordinator, NoopFocus,
};
pub use serializer::PathSerializer;
pub use state::{NavigationNode, NavigationState};
pub use store::{LinkOutcome, NavigationStore, PreparedNavigation};

pub use waylink_router::{
    MatchedRoute, ParamType, ParamValue, Params, ParsedPath, PathParser, Presentation, RouteError,
    RoutePattern, RouteTable,
};
