//! Lottie View Core (engine-agnostic)
//!
//! The declarative half of a Lottie view adapter. This crate defines the
//! animation state model (`view`), the event and command surfaces the
//! application sees (`events`, `commands`), the capability contracts a
//! platform engine must satisfy (`engine`), the property/command dispatch
//! tables platform handlers consume (`mapper`, `handler`), the finite-repeat
//! bookkeeping for engines that only expose a loop flag (`repeat`), and a
//! single-threaded job queue standing in for the host UI scheduler
//! (`scheduler`).
//!
//! Nothing here parses or renders Lottie JSON. Rendering is the engine's
//! job; this crate reconciles a declared state onto whatever engine the
//! platform handler owns and relays engine callbacks back as view events.

pub mod commands;
pub mod engine;
pub mod error;
pub mod events;
pub mod handler;
pub mod mapper;
pub mod repeat;
pub mod scheduler;
pub mod source;
pub mod view;

// Re-exports for consumers (handlers, hosts, tests)
pub use commands::{CommandKind, CommandSink, ViewCommand};
pub use engine::{
    AnimatorEngine, AnimatorListener, Composition, ListenerId, ListenerIdAllocator, LoadedListener,
    LottieEngine, PlayerEngine, UpdateListener,
};
pub use error::AdapterError;
pub use events::{EventSinks, SubscriptionId, ViewEvent};
pub use handler::{trampoline, trampoline_with, PlatformHandler};
pub use mapper::{frame_bounds, progress_bounds, CommandMapper, PropertyMapper, CONNECT_APPLY_ORDER};
pub use repeat::{CompletionOutcome, RepeatCoordinator, RepeatPhase};
pub use scheduler::{AttachmentGuard, UiScheduler};
pub use source::AnimationSource;
pub use view::{AnimationView, RepeatMode, SharedAnimationView, ViewProperty, WeakAnimationView};
