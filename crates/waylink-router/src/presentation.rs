use serde::{Deserialize, Serialize};

/// How a route is presented once navigated to
///
/// Overlay-class routes live on the overlay stack, parallel to and independent
/// of the primary stack, enabling side panes and modal screens.
///
/// # Examples
///
/// ```
/// use waylink_router::Presentation;
///
/// assert!(!Presentation::Screen.is_overlay());
/// assert!(Presentation::SidePane.is_overlay());
/// assert!(Presentation::FullScreen.is_overlay());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presentation {
    /// Regular screen on the primary stack
    #[default]
    Screen,
    /// Side pane; stacks on top of other side panes
    SidePane,
    /// Full-screen overlay; replaces every open side pane
    FullScreen,
}

impl Presentation {
    pub fn is_overlay(self) -> bool {
        !matches!(self, Presentation::Screen)
    }
}
