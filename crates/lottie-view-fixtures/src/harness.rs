//! A stand-in for the host framework.

use std::cell::RefCell;
use std::rc::Rc;

use lottie_view_core::{
    PlatformHandler, SharedAnimationView, SubscriptionId, UiScheduler, ViewCommand, ViewEvent,
};

/// Owns the pieces a host framework would own: the view, the handler, the
/// engine view, and the scheduler. Property-changed notifications are posted
/// to the scheduler and dispatched to the handler on [`pump`](Self::pump),
/// the way a host serializes reconciliation onto its UI loop.
pub struct HostHarness<H: PlatformHandler> {
    pub view: SharedAnimationView,
    pub scheduler: UiScheduler,
    pub handler: Rc<RefCell<H>>,
    pub engine: Rc<RefCell<H::Engine>>,
    subscription: SubscriptionId,
}

impl<H: PlatformHandler + 'static> HostHarness<H> {
    /// Wire the notification channel, create the platform view, connect.
    pub fn attach(view: SharedAnimationView, scheduler: UiScheduler, handler: H) -> Self {
        let handler = Rc::new(RefCell::new(handler));
        let subscription = {
            let handler = handler.clone();
            let scheduler = scheduler.clone();
            view.on_property_changed(move |property| {
                let handler = handler.clone();
                scheduler.post(move || handler.borrow_mut().apply_property(property));
            })
        };
        let engine = handler.borrow_mut().create_platform_view();
        handler.borrow_mut().connect(engine.clone());
        Self {
            view,
            scheduler,
            handler,
            engine,
            subscription,
        }
    }

    /// Run queued jobs: pending notifications and marshalled callbacks.
    /// Returns how many jobs ran.
    pub fn pump(&self) -> usize {
        self.scheduler.drain()
    }

    /// Host-side imperative dispatch, bypassing the view's command slots.
    pub fn dispatch_command(&self, command: &ViewCommand) {
        self.handler.borrow_mut().dispatch_command(command);
    }

    /// Unwire notifications and run the detach protocol.
    pub fn detach(&self) {
        self.view.remove_property_subscriber(self.subscription);
        self.handler.borrow_mut().disconnect();
    }
}

/// Records every event a view emits.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<ViewEvent>>>,
}

impl EventLog {
    pub fn attach(view: &SharedAnimationView) -> Self {
        let log = Self::default();
        let events = log.events.clone();
        view.on_event(move |event| events.borrow_mut().push(event.clone()));
        log
    }

    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.borrow().clone()
    }

    /// Event names in emission order.
    pub fn names(&self) -> Vec<&'static str> {
        self.events.borrow().iter().map(|e| e.name()).collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.events.borrow().iter().filter(|e| e.name() == name).count()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}
