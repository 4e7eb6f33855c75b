//! Host-facing contract implemented by every platform handler, plus the
//! listener trampolines the handlers wrap engine callbacks in.

use std::cell::RefCell;
use std::rc::Rc;

use crate::commands::ViewCommand;
use crate::scheduler::{AttachmentGuard, UiScheduler};
use crate::view::{SharedAnimationView, ViewProperty, WeakAnimationView};

/// The inbound surface a host framework drives for each attached view.
///
/// Lifecycle: the host constructs the handler bound to one view, asks it for
/// an engine view, connects once, then feeds it targeted property and
/// command dispatches until it disconnects, once, right before releasing the
/// engine view.
pub trait PlatformHandler {
    type Engine;

    /// Build the engine view. Synchronous; must not perform I/O.
    fn create_platform_view(&mut self) -> Rc<RefCell<Self::Engine>>;

    /// Run the attach protocol: register listeners, push the source, install
    /// command slots, apply declared state, honor auto-play, mirror
    /// read-only values.
    fn connect(&mut self, engine: Rc<RefCell<Self::Engine>>);

    /// Reverse everything `connect` registered and reset per-attachment
    /// state. The engine view itself is released by the host.
    fn disconnect(&mut self);

    /// Targeted reconciliation after a property-changed notification.
    /// Unknown properties fall through to the base-view default.
    fn apply_property(&mut self, property: ViewProperty);

    /// Imperative command dispatch from the host.
    fn dispatch_command(&mut self, command: &ViewCommand);

    fn is_connected(&self) -> bool;
}

/// Wrap a view-touching closure into an engine callback: the callback posts
/// to the UI scheduler and the payload is dropped once the attachment guard
/// is revoked or the view is gone.
pub fn trampoline(
    scheduler: &UiScheduler,
    view: &WeakAnimationView,
    guard: &AttachmentGuard,
    f: impl Fn(&SharedAnimationView) + Clone + 'static,
) -> Box<dyn FnMut()> {
    let scheduler = scheduler.clone();
    let view = view.clone();
    let guard = guard.clone();
    Box::new(move || {
        let view = view.clone();
        let f = f.clone();
        scheduler.post_guarded(&guard, move || {
            if let Some(view) = view.upgrade() {
                f(&view);
            }
        });
    })
}

/// [`trampoline`] for callbacks carrying a payload.
pub fn trampoline_with<T: 'static>(
    scheduler: &UiScheduler,
    view: &WeakAnimationView,
    guard: &AttachmentGuard,
    f: impl Fn(&SharedAnimationView, T) + Clone + 'static,
) -> Box<dyn FnMut(T)> {
    let scheduler = scheduler.clone();
    let view = view.clone();
    let guard = guard.clone();
    Box::new(move |payload: T| {
        let view = view.clone();
        let f = f.clone();
        scheduler.post_guarded(&guard, move || {
            if let Some(view) = view.upgrade() {
                f(&view, payload);
            }
        });
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn trampoline_defers_until_the_drain() {
        let scheduler = UiScheduler::new();
        let view = SharedAnimationView::new();
        let guard = AttachmentGuard::new_live();
        let hits = Rc::new(Cell::new(0));

        let mut callback = {
            let hits = hits.clone();
            trampoline(&scheduler, &view.downgrade(), &guard, move |_| {
                hits.set(hits.get() + 1)
            })
        };
        callback();
        callback();
        assert_eq!(hits.get(), 0);
        scheduler.drain();
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn trampoline_drops_payload_after_revoke() {
        let scheduler = UiScheduler::new();
        let view = SharedAnimationView::new();
        let guard = AttachmentGuard::new_live();
        let hits = Rc::new(Cell::new(0));

        let mut callback = {
            let hits = hits.clone();
            trampoline_with(&scheduler, &view.downgrade(), &guard, move |_, n: u32| {
                hits.set(hits.get() + n)
            })
        };
        callback(5);
        guard.revoke();
        scheduler.drain();
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn trampoline_survives_a_dropped_view() {
        let scheduler = UiScheduler::new();
        let guard = AttachmentGuard::new_live();
        let weak = {
            let view = SharedAnimationView::new();
            view.downgrade()
        };
        let mut callback = trampoline(&scheduler, &weak, &guard, |_| {
            panic!("view is gone, payload must not run")
        });
        callback();
        scheduler.drain();
    }
}
