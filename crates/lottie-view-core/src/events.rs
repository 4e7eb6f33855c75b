//! Playback events fanned out to the application.
//!
//! A handler translates engine callbacks into `ViewEvent`s and invokes them
//! on the view; the view relays each event synchronously to every registered
//! subscriber, on the UI scheduler. Zero subscribers is fine.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::engine::Composition;
use crate::error::AdapterError;

/// The ten lifecycle signals a view can emit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ViewEvent {
    /// Playback started.
    Started,
    /// Playback paused.
    Paused,
    /// Playback resumed after a pause.
    Resumed,
    /// Playback stopped or cancelled by the user.
    Stopped,
    /// A traversal reached its natural end.
    Finished,
    /// A new traversal begins under the current repeat policy.
    Repeated,
    /// Frame-by-frame progress report.
    Progress { value: f32 },
    /// The engine finished parsing a composition.
    Loaded { composition: Composition },
    /// The engine reported a failure.
    Failed { error: AdapterError },
    /// The view was clicked or tapped.
    Clicked,
}

impl ViewEvent {
    /// Stable name, matching what hosts key diagnostics by.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Paused => "paused",
            Self::Resumed => "resumed",
            Self::Stopped => "stopped",
            Self::Finished => "finished",
            Self::Repeated => "repeated",
            Self::Progress { .. } => "progress",
            Self::Loaded { .. } => "loaded",
            Self::Failed { .. } => "failed",
            Self::Clicked => "clicked",
        }
    }

    /// True for the play/pause/resume/stop/finish/repeat family.
    #[inline]
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            Self::Started
                | Self::Paused
                | Self::Resumed
                | Self::Stopped
                | Self::Finished
                | Self::Repeated
        )
    }
}

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SubscriptionId(pub u32);

type EventSubscriber = Box<dyn FnMut(&ViewEvent)>;

#[derive(Default)]
struct Slots {
    next: u32,
    subscribers: Vec<(SubscriptionId, EventSubscriber)>,
}

/// Subscriber relation behind the view's event sinks.
///
/// Cloning shares the subscriber list, which lets the view hand the relation
/// out to emitters without keeping its own cell borrowed during fan-out.
/// Subscribers must not subscribe or unsubscribe from inside a callback.
#[derive(Clone, Default)]
pub struct EventSinks {
    inner: Rc<RefCell<Slots>>,
}

impl EventSinks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, f: impl FnMut(&ViewEvent) + 'static) -> SubscriptionId {
        let mut slots = self.inner.borrow_mut();
        let id = SubscriptionId(slots.next);
        slots.next = slots.next.wrapping_add(1);
        slots.subscribers.push((id, Box::new(f)));
        id
    }

    /// Returns false when the id was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut slots = self.inner.borrow_mut();
        let before = slots.subscribers.len();
        slots.subscribers.retain(|(sid, _)| *sid != id);
        slots.subscribers.len() != before
    }

    pub fn emit(&self, event: &ViewEvent) {
        for (_, f) in self.inner.borrow_mut().subscribers.iter_mut() {
            f(event);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn fan_out_reaches_every_subscriber() {
        let sinks = EventSinks::new();
        let hits = Rc::new(Cell::new(0));
        for _ in 0..3 {
            let hits = hits.clone();
            sinks.subscribe(move |_| hits.set(hits.get() + 1));
        }
        sinks.emit(&ViewEvent::Started);
        assert_eq!(hits.get(), 3);
    }

    #[test]
    fn unsubscribe_removes_exactly_one() {
        let sinks = EventSinks::new();
        let hits = Rc::new(Cell::new(0));
        let id = {
            let hits = hits.clone();
            sinks.subscribe(move |_| hits.set(hits.get() + 1))
        };
        {
            let hits = hits.clone();
            sinks.subscribe(move |_| hits.set(hits.get() + 1));
        }
        assert!(sinks.unsubscribe(id));
        assert!(!sinks.unsubscribe(id));
        sinks.emit(&ViewEvent::Clicked);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn names_are_stable() {
        assert_eq!(ViewEvent::Progress { value: 0.5 }.name(), "progress");
        assert!(ViewEvent::Finished.is_lifecycle());
        assert!(!ViewEvent::Clicked.is_lifecycle());
    }
}
