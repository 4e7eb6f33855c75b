//! Capability contracts the adapter requires from a platform Lottie engine.
//!
//! Two engine flavors exist in the wild. Animator-style engines expose a rich
//! listener surface and configure finite repeats natively. Player-style
//! engines expose a boolean loop flag and report each traversal through a
//! one-shot completion handler; the finite-repeat bookkeeping then lives in
//! the platform handler. Both extend the shared imperative surface of
//! [`LottieEngine`].

use serde::{Deserialize, Serialize};

use crate::error::AdapterError;
use crate::source::AnimationSource;
use crate::view::RepeatMode;

/// What the engine knows about a parsed animation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composition {
    pub name: String,
    pub frame_count: u32,
    pub duration_ms: u32,
}

impl Composition {
    pub fn new(name: impl Into<String>, frame_count: u32, duration_ms: u32) -> Self {
        Self {
            name: name.into(),
            frame_count,
            duration_ms,
        }
    }

    /// Normalized position of an absolute frame index.
    #[inline]
    pub fn progress_for_frame(&self, frame: u32) -> f32 {
        if self.frame_count == 0 {
            return 0.0;
        }
        (frame as f32 / self.frame_count as f32).clamp(0.0, 1.0)
    }

    /// Absolute frame index for a normalized position.
    #[inline]
    pub fn frame_for_progress(&self, progress: f32) -> u32 {
        if self.frame_count == 0 {
            return 0;
        }
        let last = self.frame_count - 1;
        ((progress.clamp(0.0, 1.0) * self.frame_count as f32) as u32).min(last)
    }
}

/// Identifier handed out by listener registration.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ListenerId(pub u32);

/// Monotonic allocator for [`ListenerId`]s. IDs are opaque externally.
#[derive(Default, Debug)]
pub struct ListenerIdAllocator {
    next: u32,
}

impl ListenerIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc(&mut self) -> ListenerId {
        let id = ListenerId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

pub type Callback = Box<dyn FnMut()>;
pub type FailureListener = Box<dyn FnMut(&AdapterError)>;
pub type ClickListener = Box<dyn FnMut()>;
/// One-shot continuation for a player-style play call. `true` means the
/// traversal reached its natural end, `false` means it was cancelled.
pub type CompletionHandler = Box<dyn FnOnce(bool)>;

/// Animator lifecycle listener, one callback per animator signal.
pub struct AnimatorListener {
    pub on_start: Callback,
    pub on_end: Box<dyn FnMut(bool)>,
    pub on_cancel: Callback,
    pub on_pause: Callback,
    pub on_resume: Callback,
    pub on_repeat: Callback,
}

/// Per-frame progress listener.
pub struct UpdateListener {
    pub on_update: Box<dyn FnMut(f32)>,
}

/// Composition-parsed listener.
pub struct LoadedListener {
    pub on_loaded: Box<dyn FnMut(&Composition)>,
}

/// Imperative surface shared by every conforming engine.
pub trait LottieEngine {
    fn set_source(&mut self, source: &AnimationSource);
    /// Composition of the current source, once parsed.
    fn composition(&self) -> Option<Composition>;

    fn play(&mut self);
    fn pause(&mut self);
    fn resume(&mut self);
    /// Stop playback and rewind to the start.
    fn stop(&mut self);
    /// Stop playback, keeping the current position.
    fn cancel(&mut self);

    fn set_progress(&mut self, progress: f32);
    fn progress(&self) -> f32;
    fn set_frame(&mut self, frame: u32);
    fn set_speed(&mut self, speed: f32);
    fn reverse_speed(&mut self);

    fn set_min_frame(&mut self, frame: u32);
    fn set_max_frame(&mut self, frame: u32);
    fn set_min_progress(&mut self, progress: f32);
    fn set_max_progress(&mut self, progress: f32);

    fn set_cache_enabled(&mut self, enabled: bool);
    fn set_image_assets_folder(&mut self, folder: &str);

    fn duration_ms(&self) -> u32;
    fn is_animating(&self) -> bool;
}

/// Listener-driven engine with native finite-repeat support.
pub trait AnimatorEngine: LottieEngine {
    fn configure_repeat(&mut self, mode: RepeatMode, count: u32);
    /// Renderer merge-paths hint; a no-op on engines without it.
    fn enable_merge_paths(&mut self, enabled: bool);
    fn perform_click(&mut self);

    fn add_animator_listener(&mut self, listener: AnimatorListener) -> ListenerId;
    fn remove_animator_listener(&mut self, id: ListenerId);
    fn add_update_listener(&mut self, listener: UpdateListener) -> ListenerId;
    fn remove_all_update_listeners(&mut self);
    fn add_loaded_listener(&mut self, listener: LoadedListener) -> ListenerId;
    fn remove_loaded_listener(&mut self, id: ListenerId);
    fn set_failure_listener(&mut self, listener: Option<FailureListener>);
    fn set_click_listener(&mut self, listener: Option<ClickListener>);
}

/// Completion-driven engine; repeats are the caller's bookkeeping.
pub trait PlayerEngine: LottieEngine {
    fn set_loop(&mut self, looping: bool);
    fn play_with_completion(&mut self, completion: CompletionHandler);
    fn play_range_frames(&mut self, min_frame: u32, max_frame: u32, completion: CompletionHandler);
    fn play_range_progress(
        &mut self,
        min_progress: f32,
        max_progress: f32,
        completion: CompletionHandler,
    );
    fn add_tap_recognizer(&mut self, on_tap: ClickListener) -> ListenerId;
    fn remove_tap_recognizer(&mut self, id: ListenerId);
    fn set_failure_handler(&mut self, handler: Option<FailureListener>);
}
