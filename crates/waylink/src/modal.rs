// File: waylink/src/modal.rs
// Purpose: Modal visibility coordination and show/hide lifecycle

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::Notify;
use tracing::{debug, trace};

/// Receives focus hand-off signals around a modal's lifetime
pub trait FocusManager: Send + Sync {
    /// Focus must not move while the modal is being shown
    fn reset_ready_to_focus(&self);

    /// The modal is gone and focus may be restored
    fn set_ready_to_focus(&self);
}

/// Focus manager that ignores every signal
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopFocus;

impl FocusManager for NoopFocus {
    fn reset_ready_to_focus(&self) {}
    fn set_ready_to_focus(&self) {}
}

type VisibilityHook = Arc<dyn Fn(bool) + Send + Sync>;
type CloseHandler = Arc<dyn Fn() + Send + Sync>;

/// Handle returned by the coordinator's registration methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// Process-wide knowledge of whether a modal is on screen
///
/// Shared (behind an `Arc`) between every [`ModalLifecycle`] and whoever
/// needs to react to modals: deferring navigation until a modal closed,
/// closing all open modals before handling a deep link.
#[derive(Default)]
pub struct ModalVisibilityCoordinator {
    visible: AtomicBool,
    will_become_visible: AtomicBool,
    closes: AtomicU64,
    next_id: AtomicU64,
    hooks: Mutex<Vec<(HandlerId, VisibilityHook)>>,
    close_handlers: Mutex<Vec<(HandlerId, CloseHandler)>>,
    closed: Notify,
}

impl ModalVisibilityCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    pub fn set_visible(&self, visible: bool) {
        let previous = self.visible.swap(visible, Ordering::SeqCst);
        if previous != visible {
            debug!(visible, "modal visibility changed");
        }
    }

    /// Announces an upcoming visibility change to every hook
    pub fn will_change_visibility(&self, visible: bool) {
        self.will_become_visible.store(visible, Ordering::SeqCst);

        let hooks: Vec<VisibilityHook> = lock(&self.hooks).iter().map(|(_, hook)| Arc::clone(hook)).collect();
        trace!(visible, hooks = hooks.len(), "modal visibility will change");
        for hook in hooks {
            hook(visible);
        }
    }

    /// Whether the last announced change was towards visible
    pub fn will_become_visible(&self) -> bool {
        self.will_become_visible.load(Ordering::SeqCst)
    }

    pub fn on_visibility_will_change<F>(&self, hook: F) -> HandlerId
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        let id = self.next_id();
        lock(&self.hooks).push((id, Arc::new(hook)));
        id
    }

    pub fn remove_visibility_hook(&self, id: HandlerId) {
        lock(&self.hooks).retain(|(hook_id, _)| *hook_id != id);
    }

    /// Registers how to close one open modal
    pub fn register_close_handler<F>(&self, handler: F) -> HandlerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.next_id();
        lock(&self.close_handlers).push((id, Arc::new(handler)));
        id
    }

    pub fn unregister_close_handler(&self, id: HandlerId) {
        lock(&self.close_handlers).retain(|(handler_id, _)| *handler_id != id);
    }

    /// Asks every registered modal to close; returns how many were asked
    pub fn close_visible_modals(&self) -> usize {
        let handlers: Vec<CloseHandler> = lock(&self.close_handlers)
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        debug!(count = handlers.len(), "closing visible modals");
        for handler in &handlers {
            handler();
        }
        handlers.len()
    }

    /// Records that a modal finished hiding and wakes every waiter
    pub fn did_close(&self) {
        let closes = self.closes.fetch_add(1, Ordering::SeqCst) + 1;
        trace!(closes, "modal closed");
        self.closed.notify_waiters();
    }

    /// Number of completed hide paths so far
    pub fn close_count(&self) -> u64 {
        self.closes.load(Ordering::SeqCst)
    }

    /// Resolves at the next [`did_close`](Self::did_close)
    pub async fn wait_for_close(&self) {
        self.closed.notified().await;
    }

    fn next_id(&self) -> HandlerId {
        HandlerId(self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Phase of a [`ModalLifecycle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalPhase {
    Hidden,
    Showing,
    Visible,
    Hiding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalOptions {
    /// Report visibility to the coordinator
    pub set_modal_visibility: bool,
    /// Full-screen modals restore focus on dismiss instead of on hide
    pub fullscreen: bool,
}

impl Default for ModalOptions {
    fn default() -> Self {
        ModalOptions {
            set_modal_visibility: true,
            fullscreen: true,
        }
    }
}

/// Callbacks a modal owner can hook into
#[derive(Default)]
pub struct ModalCallbacks {
    on_show: Option<Box<dyn FnMut() + Send>>,
    on_hide: Option<Box<dyn FnMut() + Send>>,
    on_close: Option<CloseHandler>,
}

impl ModalCallbacks {
    pub fn on_show(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_show = Some(Box::new(f));
        self
    }

    pub fn on_hide(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_hide = Some(Box::new(f));
        self
    }

    /// Invoked when the modal is asked to close (back, backdrop, close-all)
    pub fn on_close(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_close = Some(Arc::new(f));
        self
    }
}

/// Show/hide state machine of a single modal
///
/// ```text
/// Hidden --show--> Showing --shown--> Visible --hide--> Hiding --hidden--> Hidden
/// ```
///
/// The hide path (visibility reset, `on_hide`, `did_close`) runs exactly once
/// per cycle, whether the modal finishes hiding normally or is torn down while
/// visible. Dropping the lifecycle tears it down.
pub struct ModalLifecycle {
    phase: ModalPhase,
    options: ModalOptions,
    coordinator: Arc<ModalVisibilityCoordinator>,
    focus: Arc<dyn FocusManager>,
    callbacks: ModalCallbacks,
    close_registration: Option<HandlerId>,
    /// Focus restoration owed for the current cycle
    focus_owed: bool,
}

impl ModalLifecycle {
    pub fn new(coordinator: Arc<ModalVisibilityCoordinator>, focus: Arc<dyn FocusManager>) -> Self {
        ModalLifecycle {
            phase: ModalPhase::Hidden,
            options: ModalOptions::default(),
            coordinator,
            focus,
            callbacks: ModalCallbacks::default(),
            close_registration: None,
            focus_owed: false,
        }
    }

    pub fn with_options(mut self, options: ModalOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_callbacks(mut self, callbacks: ModalCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn phase(&self) -> ModalPhase {
        self.phase
    }

    /// The owner set the modal visible
    ///
    /// Returns `false` (and does nothing) unless the modal is hidden.
    pub fn show(&mut self) -> bool {
        if self.phase != ModalPhase::Hidden {
            trace!(phase = ?self.phase, "show ignored");
            return false;
        }

        self.coordinator.will_change_visibility(true);
        self.focus.reset_ready_to_focus();
        self.focus_owed = true;

        if let Some(on_close) = &self.callbacks.on_close {
            let on_close = Arc::clone(on_close);
            self.close_registration = Some(self.coordinator.register_close_handler(move || on_close()));
        }

        self.phase = ModalPhase::Showing;
        true
    }

    /// The presentation finished appearing
    pub fn shown(&mut self) -> bool {
        if self.phase != ModalPhase::Showing {
            return false;
        }

        if self.options.set_modal_visibility {
            self.coordinator.set_visible(true);
        }
        if let Some(on_show) = self.callbacks.on_show.as_mut() {
            on_show();
        }

        self.phase = ModalPhase::Visible;
        true
    }

    /// The owner set the modal hidden
    pub fn hide(&mut self) -> bool {
        if !matches!(self.phase, ModalPhase::Showing | ModalPhase::Visible) {
            return false;
        }

        self.release_close_handler();
        self.phase = ModalPhase::Hiding;
        true
    }

    /// The presentation finished disappearing; runs the hide path
    pub fn hidden(&mut self) -> bool {
        if self.phase == ModalPhase::Hidden {
            return false;
        }

        self.run_hide_path(false);
        true
    }

    /// The platform dismissed the presentation
    ///
    /// Full-screen modals restore focus here.
    pub fn dismissed(&mut self) {
        if self.options.fullscreen && self.phase == ModalPhase::Hidden {
            self.restore_focus();
        }
    }

    /// Back button, swipe or close-all: ask the owner to close
    pub fn request_close(&self) {
        if let Some(on_close) = &self.callbacks.on_close {
            on_close();
        }
    }

    /// A press on the backdrop; the Enter key never closes
    pub fn backdrop_pressed(&self, enter_key: bool) {
        if enter_key {
            trace!("backdrop press from enter key ignored");
            return;
        }
        self.request_close();
    }

    /// Tears the modal down regardless of phase
    ///
    /// A modal that is not hidden runs its hide path and restores focus. A
    /// modal that is already hidden emits nothing; a full-screen one still
    /// waiting for `dismissed` gives up its pending focus restoration.
    pub fn teardown(&mut self) {
        if self.phase != ModalPhase::Hidden {
            self.run_hide_path(true);
        } else if std::mem::take(&mut self.focus_owed) {
            trace!("hidden modal torn down before dismiss, focus not restored");
        }
        self.release_close_handler();
    }

    fn run_hide_path(&mut self, tearing_down: bool) {
        self.release_close_handler();
        self.coordinator.will_change_visibility(false);
        if self.options.set_modal_visibility {
            self.coordinator.set_visible(false);
        }
        if let Some(on_hide) = self.callbacks.on_hide.as_mut() {
            on_hide();
        }
        self.coordinator.did_close();

        if !self.options.fullscreen || tearing_down {
            self.restore_focus();
        }
        self.phase = ModalPhase::Hidden;
    }

    fn restore_focus(&mut self) {
        if std::mem::take(&mut self.focus_owed) {
            self.focus.set_ready_to_focus();
        }
    }

    fn release_close_handler(&mut self) {
        if let Some(id) = self.close_registration.take() {
            self.coordinator.unregister_close_handler(id);
        }
    }
}

impl Drop for ModalLifecycle {
    fn drop(&mut self) {
        self.teardown();
    }
}
