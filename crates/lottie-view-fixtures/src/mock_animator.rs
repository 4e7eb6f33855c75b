//! Scriptable animator-style engine.

use lottie_view_core::engine::{
    AnimatorEngine, AnimatorListener, ClickListener, FailureListener, ListenerId,
    ListenerIdAllocator, LoadedListener, LottieEngine, UpdateListener,
};
use lottie_view_core::{AdapterError, AnimationSource, Composition, RepeatMode};

use crate::ops::EngineOp;

/// Mock engine with the full listener surface and native repeat support.
///
/// Listener callbacks fire synchronously from inside the engine call, the
/// way a real engine fires them from its own internals; the handler's
/// trampolines take care of marshalling. Tests drive asynchronous signals
/// through the `emit_*` and `complete_natural` helpers.
pub struct MockAnimatorEngine {
    ops: Vec<EngineOp>,
    ids: ListenerIdAllocator,

    animator_listeners: Vec<(ListenerId, AnimatorListener)>,
    update_listeners: Vec<(ListenerId, UpdateListener)>,
    loaded_listeners: Vec<(ListenerId, LoadedListener)>,
    failure_listener: Option<FailureListener>,
    click_listener: Option<ClickListener>,
    listeners_added: usize,
    listeners_removed: usize,

    next_composition: Option<Composition>,
    reject_next_load: Option<String>,
    composition: Option<Composition>,

    progress: f32,
    pub frame: u32,
    speed: f32,
    animating: bool,
    pub repeat: Option<(RepeatMode, u32)>,
    pub cache_enabled: bool,
    pub image_assets_folder: Option<String>,
    pub merge_paths: bool,
    pub min_frame: Option<u32>,
    pub max_frame: Option<u32>,
    pub min_progress: Option<f32>,
    pub max_progress: Option<f32>,
}

impl Default for MockAnimatorEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAnimatorEngine {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            ids: ListenerIdAllocator::new(),
            animator_listeners: Vec::new(),
            update_listeners: Vec::new(),
            loaded_listeners: Vec::new(),
            failure_listener: None,
            click_listener: None,
            listeners_added: 0,
            listeners_removed: 0,
            next_composition: None,
            reject_next_load: None,
            composition: None,
            progress: 0.0,
            frame: 0,
            speed: 1.0,
            animating: false,
            repeat: None,
            cache_enabled: false,
            image_assets_folder: None,
            merge_paths: false,
            min_frame: None,
            max_frame: None,
            min_progress: None,
            max_progress: None,
        }
    }

    /// Engine whose next load parses to `composition`.
    pub fn with_composition(composition: Composition) -> Self {
        let mut engine = Self::new();
        engine.next_composition = Some(composition);
        engine
    }

    /// What the next `set_source` parses to.
    pub fn set_next_composition(&mut self, composition: Option<Composition>) {
        self.next_composition = composition;
    }

    /// Make the next `set_source` fail with `reason`.
    pub fn reject_next_load(&mut self, reason: impl Into<String>) {
        self.reject_next_load = Some(reason.into());
    }

    // ── observation ─────────────────────────────────────────────────────

    pub fn ops(&self) -> &[EngineOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<EngineOp> {
        std::mem::take(&mut self.ops)
    }

    pub fn count_op(&self, op: &EngineOp) -> usize {
        self.ops.iter().filter(|o| *o == op).count()
    }

    pub fn listener_adds(&self) -> usize {
        self.listeners_added
    }

    pub fn listener_removes(&self) -> usize {
        self.listeners_removed
    }

    // ── scripted engine signals ─────────────────────────────────────────

    /// A traversal reached its natural end.
    pub fn complete_natural(&mut self) {
        self.animating = false;
        for (_, listener) in self.animator_listeners.iter_mut() {
            (listener.on_end)(true);
        }
    }

    /// The engine's native repeat wrapped around.
    pub fn emit_repeat(&mut self) {
        for (_, listener) in self.animator_listeners.iter_mut() {
            (listener.on_repeat)();
        }
    }

    pub fn emit_update(&mut self, progress: f32) {
        self.progress = progress;
        for (_, listener) in self.update_listeners.iter_mut() {
            (listener.on_update)(progress);
        }
    }

    pub fn emit_failure(&mut self, reason: &str) {
        let error = AdapterError::engine(reason);
        if let Some(listener) = &mut self.failure_listener {
            listener(&error);
        }
    }

    fn fire_loaded(&mut self) {
        if let Some(composition) = self.composition.clone() {
            for (_, listener) in self.loaded_listeners.iter_mut() {
                (listener.on_loaded)(&composition);
            }
        }
    }
}

impl LottieEngine for MockAnimatorEngine {
    fn set_source(&mut self, source: &AnimationSource) {
        self.ops.push(EngineOp::SetSource(source.clone()));
        if let Some(reason) = self.reject_next_load.take() {
            // previous composition is retained
            let error = AdapterError::SourceRejected { reason };
            if let Some(listener) = &mut self.failure_listener {
                listener(&error);
            }
        } else if let Some(composition) = self.next_composition.clone() {
            self.composition = Some(composition);
            self.fire_loaded();
        }
    }

    fn composition(&self) -> Option<Composition> {
        self.composition.clone()
    }

    fn play(&mut self) {
        self.ops.push(EngineOp::Play);
        self.animating = true;
        for (_, listener) in self.animator_listeners.iter_mut() {
            (listener.on_start)();
        }
    }

    fn pause(&mut self) {
        self.ops.push(EngineOp::Pause);
        self.animating = false;
        for (_, listener) in self.animator_listeners.iter_mut() {
            (listener.on_pause)();
        }
    }

    fn resume(&mut self) {
        self.ops.push(EngineOp::Resume);
        self.animating = true;
        for (_, listener) in self.animator_listeners.iter_mut() {
            (listener.on_resume)();
        }
    }

    fn stop(&mut self) {
        self.ops.push(EngineOp::Stop);
        self.animating = false;
        self.progress = 0.0;
    }

    fn cancel(&mut self) {
        self.ops.push(EngineOp::Cancel);
        self.animating = false;
        for (_, listener) in self.animator_listeners.iter_mut() {
            (listener.on_cancel)();
        }
        // animator engines follow a cancel with a non-natural end
        for (_, listener) in self.animator_listeners.iter_mut() {
            (listener.on_end)(false);
        }
    }

    fn set_progress(&mut self, progress: f32) {
        self.ops.push(EngineOp::SetProgress(progress));
        self.progress = progress;
    }

    fn progress(&self) -> f32 {
        self.progress
    }

    fn set_frame(&mut self, frame: u32) {
        self.ops.push(EngineOp::SetFrame(frame));
        self.frame = frame;
        if let Some(composition) = &self.composition {
            self.progress = composition.progress_for_frame(frame);
        }
    }

    fn set_speed(&mut self, speed: f32) {
        self.ops.push(EngineOp::SetSpeed(speed));
        self.speed = speed;
    }

    fn reverse_speed(&mut self) {
        self.ops.push(EngineOp::ReverseSpeed);
        self.speed = -self.speed;
    }

    fn set_min_frame(&mut self, frame: u32) {
        self.ops.push(EngineOp::SetMinFrame(frame));
        self.min_frame = Some(frame);
    }

    fn set_max_frame(&mut self, frame: u32) {
        self.ops.push(EngineOp::SetMaxFrame(frame));
        self.max_frame = Some(frame);
    }

    fn set_min_progress(&mut self, progress: f32) {
        self.ops.push(EngineOp::SetMinProgress(progress));
        self.min_progress = Some(progress);
    }

    fn set_max_progress(&mut self, progress: f32) {
        self.ops.push(EngineOp::SetMaxProgress(progress));
        self.max_progress = Some(progress);
    }

    fn set_cache_enabled(&mut self, enabled: bool) {
        self.ops.push(EngineOp::SetCacheEnabled(enabled));
        self.cache_enabled = enabled;
    }

    fn set_image_assets_folder(&mut self, folder: &str) {
        self.ops
            .push(EngineOp::SetImageAssetsFolder(folder.to_string()));
        self.image_assets_folder = Some(folder.to_string());
    }

    fn duration_ms(&self) -> u32 {
        self.composition
            .as_ref()
            .map(|c| c.duration_ms)
            .unwrap_or(0)
    }

    fn is_animating(&self) -> bool {
        self.animating
    }
}

impl AnimatorEngine for MockAnimatorEngine {
    fn configure_repeat(&mut self, mode: RepeatMode, count: u32) {
        self.ops.push(EngineOp::ConfigureRepeat(mode, count));
        self.repeat = Some((mode, count));
    }

    fn enable_merge_paths(&mut self, enabled: bool) {
        self.ops.push(EngineOp::EnableMergePaths(enabled));
        self.merge_paths = enabled;
    }

    fn perform_click(&mut self) {
        self.ops.push(EngineOp::PerformClick);
        if let Some(listener) = &mut self.click_listener {
            listener();
        }
    }

    fn add_animator_listener(&mut self, listener: AnimatorListener) -> ListenerId {
        let id = self.ids.alloc();
        self.animator_listeners.push((id, listener));
        self.listeners_added += 1;
        id
    }

    fn remove_animator_listener(&mut self, id: ListenerId) {
        let before = self.animator_listeners.len();
        self.animator_listeners.retain(|(lid, _)| *lid != id);
        self.listeners_removed += before - self.animator_listeners.len();
    }

    fn add_update_listener(&mut self, listener: UpdateListener) -> ListenerId {
        let id = self.ids.alloc();
        self.update_listeners.push((id, listener));
        self.listeners_added += 1;
        id
    }

    fn remove_all_update_listeners(&mut self) {
        self.listeners_removed += self.update_listeners.len();
        self.update_listeners.clear();
    }

    fn add_loaded_listener(&mut self, listener: LoadedListener) -> ListenerId {
        let id = self.ids.alloc();
        self.loaded_listeners.push((id, listener));
        self.listeners_added += 1;
        id
    }

    fn remove_loaded_listener(&mut self, id: ListenerId) {
        let before = self.loaded_listeners.len();
        self.loaded_listeners.retain(|(lid, _)| *lid != id);
        self.listeners_removed += before - self.loaded_listeners.len();
    }

    fn set_failure_listener(&mut self, listener: Option<FailureListener>) {
        match (&self.failure_listener, &listener) {
            (None, Some(_)) => self.listeners_added += 1,
            (Some(_), None) => self.listeners_removed += 1,
            _ => {}
        }
        self.failure_listener = listener;
    }

    fn set_click_listener(&mut self, listener: Option<ClickListener>) {
        match (&self.click_listener, &listener) {
            (None, Some(_)) => self.listeners_added += 1,
            (Some(_), None) => self.listeners_removed += 1,
            _ => {}
        }
        self.click_listener = listener;
    }
}
