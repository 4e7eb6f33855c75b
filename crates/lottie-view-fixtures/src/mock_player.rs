//! Scriptable player-style engine.

use lottie_view_core::engine::{
    ClickListener, CompletionHandler, FailureListener, ListenerId, ListenerIdAllocator,
    LottieEngine, PlayerEngine,
};
use lottie_view_core::{AdapterError, AnimationSource, Composition};

use crate::ops::EngineOp;

/// Mock engine with a loop flag and one-shot completion handlers.
///
/// A play call stores its completion; the test decides when the traversal
/// ends by calling [`complete`](Self::complete). `stop` and `cancel` invoke
/// the pending completion with `finished = false`, the way a player engine
/// reports a user cancel. The loop flag is advisory only: completions still
/// fire per traversal, the handler's bookkeeping drives the replays.
pub struct MockPlayerEngine {
    ops: Vec<EngineOp>,
    ids: ListenerIdAllocator,

    taps: Vec<(ListenerId, ClickListener)>,
    failure_handler: Option<FailureListener>,
    completion: Option<CompletionHandler>,
    listeners_added: usize,
    listeners_removed: usize,

    next_composition: Option<Composition>,
    reject_next_load: bool,
    composition: Option<Composition>,

    progress: f32,
    pub frame: u32,
    speed: f32,
    animating: bool,
    looping: bool,
    pub cache_enabled: bool,
    pub image_assets_folder: Option<String>,
    pub min_frame: Option<u32>,
    pub max_frame: Option<u32>,
    pub min_progress: Option<f32>,
    pub max_progress: Option<f32>,
}

impl Default for MockPlayerEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPlayerEngine {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            ids: ListenerIdAllocator::new(),
            taps: Vec::new(),
            failure_handler: None,
            completion: None,
            listeners_added: 0,
            listeners_removed: 0,
            next_composition: None,
            reject_next_load: false,
            composition: None,
            progress: 0.0,
            frame: 0,
            speed: 1.0,
            animating: false,
            looping: false,
            cache_enabled: false,
            image_assets_folder: None,
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

    pub fn set_next_composition(&mut self, composition: Option<Composition>) {
        self.next_composition = composition;
    }

    /// Make the next `set_source` parse to nothing.
    pub fn reject_next_load(&mut self) {
        self.reject_next_load = true;
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

    pub fn has_pending_completion(&self) -> bool {
        self.completion.is_some()
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    // ── scripted engine signals ─────────────────────────────────────────

    /// End the in-flight traversal; `finished = false` means cancelled.
    pub fn complete(&mut self, finished: bool) {
        self.animating = false;
        if let Some(completion) = self.completion.take() {
            completion(finished);
        }
    }

    /// The user tapped the view.
    pub fn tap(&mut self) {
        for (_, on_tap) in self.taps.iter_mut() {
            on_tap();
        }
    }

    pub fn emit_failure(&mut self, reason: &str) {
        let error = AdapterError::engine(reason);
        if let Some(handler) = &mut self.failure_handler {
            handler(&error);
        }
    }
}

impl LottieEngine for MockPlayerEngine {
    fn set_source(&mut self, source: &AnimationSource) {
        self.ops.push(EngineOp::SetSource(source.clone()));
        if self.reject_next_load {
            self.reject_next_load = false;
            self.composition = None;
        } else if let Some(composition) = self.next_composition.clone() {
            self.composition = Some(composition);
        }
    }

    fn composition(&self) -> Option<Composition> {
        self.composition.clone()
    }

    fn play(&mut self) {
        self.ops.push(EngineOp::Play);
        self.animating = true;
    }

    fn pause(&mut self) {
        // the pending completion survives a pause
        self.ops.push(EngineOp::Pause);
        self.animating = false;
    }

    fn resume(&mut self) {
        self.ops.push(EngineOp::Resume);
        self.animating = true;
    }

    fn stop(&mut self) {
        self.ops.push(EngineOp::Stop);
        self.animating = false;
        self.progress = 0.0;
        if let Some(completion) = self.completion.take() {
            completion(false);
        }
    }

    fn cancel(&mut self) {
        self.ops.push(EngineOp::Cancel);
        self.animating = false;
        if let Some(completion) = self.completion.take() {
            completion(false);
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

impl PlayerEngine for MockPlayerEngine {
    fn set_loop(&mut self, looping: bool) {
        self.ops.push(EngineOp::SetLoop(looping));
        self.looping = looping;
    }

    fn play_with_completion(&mut self, completion: CompletionHandler) {
        self.ops.push(EngineOp::Play);
        self.animating = true;
        self.completion = Some(completion);
    }

    fn play_range_frames(&mut self, min_frame: u32, max_frame: u32, completion: CompletionHandler) {
        self.ops.push(EngineOp::PlayRangeFrames(min_frame, max_frame));
        self.animating = true;
        self.completion = Some(completion);
    }

    fn play_range_progress(
        &mut self,
        min_progress: f32,
        max_progress: f32,
        completion: CompletionHandler,
    ) {
        self.ops
            .push(EngineOp::PlayRangeProgress(min_progress, max_progress));
        self.animating = true;
        self.completion = Some(completion);
    }

    fn add_tap_recognizer(&mut self, on_tap: ClickListener) -> ListenerId {
        let id = self.ids.alloc();
        self.taps.push((id, on_tap));
        self.listeners_added += 1;
        id
    }

    fn remove_tap_recognizer(&mut self, id: ListenerId) {
        let before = self.taps.len();
        self.taps.retain(|(lid, _)| *lid != id);
        self.listeners_removed += before - self.taps.len();
    }

    fn set_failure_handler(&mut self, handler: Option<FailureListener>) {
        match (&self.failure_handler, &handler) {
            (None, Some(_)) => self.listeners_added += 1,
            (Some(_), None) => self.listeners_removed += 1,
            _ => {}
        }
        self.failure_handler = handler;
    }
}
