//! Platform handler for player-style Lottie engines.
//!
//! This flavor of engine knows only a boolean loop flag and reports each
//! traversal through a one-shot completion handler, so the finite-repeat
//! bookkeeping lives here, in a [`RepeatCoordinator`] owned per attachment.
//! The engine raises no start/pause/resume callbacks either; the matching
//! view events are fired by the command path itself.
//!
//! A completion handler posts to the UI scheduler before anything touches
//! the view, and a replay issues a fresh `play_with_completion` from inside
//! the drained job. The repeat loop is therefore tail-recursive in effect:
//! continuations queue up, they never nest on the call stack. Completions
//! that land after disconnect are dropped by the attachment guard.

use std::cell::RefCell;
use std::rc::Rc;

use lottie_view_core::commands::{CommandKind, ViewCommand};
use lottie_view_core::engine::{ClickListener, CompletionHandler, FailureListener, ListenerId, PlayerEngine};
use lottie_view_core::error::AdapterError;
use lottie_view_core::handler::{trampoline, trampoline_with, PlatformHandler};
use lottie_view_core::mapper::{
    frame_bounds, progress_bounds, CommandMapper, PropertyMapper, CONNECT_APPLY_ORDER,
};
use lottie_view_core::repeat::{CompletionOutcome, RepeatCoordinator};
use lottie_view_core::scheduler::{AttachmentGuard, UiScheduler};
use lottie_view_core::view::{RepeatMode, SharedAnimationView, ViewProperty, WeakAnimationView};

/// Reconciles one [`SharedAnimationView`] onto one player-style engine.
pub struct PlayerViewHandler<E: PlayerEngine + 'static> {
    view: WeakAnimationView,
    scheduler: UiScheduler,
    factory: Box<dyn FnMut() -> E>,
    properties: PropertyMapper<Self>,
    commands: CommandMapper<Self>,
    attachment: Option<Attachment<E>>,
}

struct Attachment<E> {
    ctx: PlayContext<E>,
    tap: ListenerId,
}

/// Everything the completion loop and the command sink need, cheap to clone
/// into closures. The view stays a weak back-reference.
struct PlayContext<E> {
    engine: Rc<RefCell<E>>,
    view: WeakAnimationView,
    scheduler: UiScheduler,
    guard: AttachmentGuard,
    repeat: Rc<RefCell<RepeatCoordinator>>,
}

impl<E> Clone for PlayContext<E> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            view: self.view.clone(),
            scheduler: self.scheduler.clone(),
            guard: self.guard.clone(),
            repeat: self.repeat.clone(),
        }
    }
}

/// A fresh one-shot continuation for the next traversal.
fn completion<E: PlayerEngine + 'static>(ctx: &PlayContext<E>) -> CompletionHandler {
    let ctx = ctx.clone();
    Box::new(move |finished: bool| {
        let job_ctx = ctx.clone();
        ctx.scheduler
            .post_guarded(&ctx.guard, move || handle_completion(&job_ctx, finished));
    })
}

/// Runs on the UI scheduler once per engine completion. Finished fires on
/// every natural end, before the repeat decision is acted on.
fn handle_completion<E: PlayerEngine + 'static>(ctx: &PlayContext<E>, finished: bool) {
    let Some(view) = ctx.view.upgrade() else {
        return;
    };
    if !finished {
        // cancelled mid-flight; the stop path already reported its event
        return;
    }
    view.invoke_finished();
    let outcome =
        ctx.repeat
            .borrow_mut()
            .on_completion(true, view.repeat_mode(), view.repeat_count());
    match outcome {
        CompletionOutcome::Replay => {
            view.invoke_repeated();
            ctx.engine.borrow_mut().play_with_completion(completion(ctx));
        }
        CompletionOutcome::Settle => view.note_is_animating(false),
        CompletionOutcome::Ignore => {}
    }
}

/// Single imperative path shared by the command sink and the command table.
fn run_command<E: PlayerEngine + 'static>(ctx: &PlayContext<E>, command: &ViewCommand) {
    let Some(view) = ctx.view.upgrade() else {
        return;
    };
    match command {
        ViewCommand::Play => {
            ctx.repeat.borrow_mut().begin_play();
            ctx.engine.borrow_mut().play_with_completion(completion(ctx));
            view.note_is_animating(true);
            view.invoke_started();
        }
        ViewCommand::Pause => {
            ctx.engine.borrow_mut().pause();
            view.note_is_animating(false);
            view.invoke_paused();
        }
        ViewCommand::Resume => {
            ctx.repeat.borrow_mut().begin_play();
            ctx.engine.borrow_mut().play_with_completion(completion(ctx));
            view.note_is_animating(true);
            view.invoke_resumed();
        }
        ViewCommand::Stop => {
            ctx.repeat.borrow_mut().reset();
            ctx.engine.borrow_mut().stop();
            view.note_is_animating(false);
            view.invoke_stopped();
        }
        ViewCommand::Click => {
            // no click synthesis on this flavor; Clicked comes from the tap
            // recognizer
        }
        ViewCommand::PlayFrameRange {
            min_frame,
            max_frame,
        } => {
            ctx.repeat.borrow_mut().begin_play();
            ctx.engine
                .borrow_mut()
                .play_range_frames(*min_frame, *max_frame, completion(ctx));
            view.note_is_animating(true);
        }
        ViewCommand::PlayProgressRange {
            min_progress,
            max_progress,
        } => {
            ctx.repeat.borrow_mut().begin_play();
            ctx.engine
                .borrow_mut()
                .play_range_progress(*min_progress, *max_progress, completion(ctx));
            view.note_is_animating(true);
        }
        ViewCommand::ReverseSpeed => ctx.engine.borrow_mut().reverse_speed(),
    }
}

impl<E: PlayerEngine + 'static> PlayerViewHandler<E> {
    pub fn new(
        view: &SharedAnimationView,
        scheduler: UiScheduler,
        factory: impl FnMut() -> E + 'static,
    ) -> Self {
        let mut properties = PropertyMapper::new();
        properties.insert(ViewProperty::Animation, Self::map_animation);
        properties.insert(ViewProperty::CacheComposition, Self::map_cache_composition);
        properties.insert(ViewProperty::Speed, Self::map_speed);
        properties.insert(ViewProperty::RepeatMode, Self::map_repeat);
        properties.insert(ViewProperty::RepeatCount, Self::map_repeat);
        properties.insert(ViewProperty::Progress, Self::map_progress);
        properties.insert(ViewProperty::Frame, Self::map_frame);
        properties.insert(ViewProperty::MinFrame, Self::map_min_frame);
        properties.insert(ViewProperty::MaxFrame, Self::map_max_frame);
        properties.insert(ViewProperty::MinProgress, Self::map_min_progress);
        properties.insert(ViewProperty::MaxProgress, Self::map_max_progress);
        properties.insert(
            ViewProperty::ImageAssetsFolder,
            Self::map_image_assets_folder,
        );
        // no merge-paths hint on this flavor

        let mut commands = CommandMapper::new();
        for &kind in CommandKind::ALL {
            commands.insert(kind, Self::map_command);
        }

        Self {
            view: view.downgrade(),
            scheduler,
            factory: Box::new(factory),
            properties,
            commands,
            attachment: None,
        }
    }

    pub fn engine(&self) -> Option<Rc<RefCell<E>>> {
        self.attachment.as_ref().map(|att| att.ctx.engine.clone())
    }

    /// Play count of the in-flight cycle, for diagnostics and tests.
    pub fn play_count(&self) -> u32 {
        self.attachment
            .as_ref()
            .map(|att| att.ctx.repeat.borrow().play_count())
            .unwrap_or(1)
    }

    fn with_engine(&self, f: impl FnOnce(&mut E)) {
        if let Some(att) = &self.attachment {
            f(&mut att.ctx.engine.borrow_mut());
        }
    }

    fn begin_playback(&self) {
        if let Some(att) = &self.attachment {
            att.ctx.repeat.borrow_mut().begin_play();
            let continuation = completion(&att.ctx);
            att.ctx.engine.borrow_mut().play_with_completion(continuation);
        }
    }

    /// Push the declared source, then report load success or rejection. The
    /// engine keeps rendering its previous composition on rejection.
    fn try_set_animation(&self, view: &SharedAnimationView) {
        let Some(att) = &self.attachment else {
            return;
        };
        let Some(source) = view.animation() else {
            return;
        };
        att.ctx.engine.borrow_mut().set_source(&source);
        let composition = att.ctx.engine.borrow().composition();
        match composition {
            Some(composition) => {
                view.note_composition(composition.clone());
                view.note_duration_ms(composition.duration_ms);
                view.invoke_loaded(&composition);
            }
            None => view.invoke_failed(AdapterError::SourceRejected {
                reason: source.describe(),
            }),
        }
    }

    // ── property appliers ───────────────────────────────────────────────

    fn map_animation(handler: &mut Self, view: &SharedAnimationView) {
        handler.try_set_animation(view);
        if view.auto_play() || view.is_animating() {
            handler.begin_playback();
            view.note_is_animating(true);
        }
    }

    fn map_cache_composition(handler: &mut Self, view: &SharedAnimationView) {
        let cache = view.cache_composition();
        handler.with_engine(|engine| engine.set_cache_enabled(cache));
    }

    fn map_speed(handler: &mut Self, view: &SharedAnimationView) {
        let speed = view.speed();
        handler.with_engine(|engine| engine.set_speed(speed));
    }

    fn map_repeat(handler: &mut Self, view: &SharedAnimationView) {
        let looping = view.repeat_mode() == RepeatMode::Infinite;
        handler.with_engine(|engine| engine.set_loop(looping));
    }

    fn map_progress(handler: &mut Self, view: &SharedAnimationView) {
        let progress = view.progress();
        handler.with_engine(|engine| engine.set_progress(progress));
    }

    fn map_frame(handler: &mut Self, view: &SharedAnimationView) {
        let frame = view.frame();
        handler.with_engine(|engine| engine.set_frame(frame));
    }

    fn map_min_frame(handler: &mut Self, view: &SharedAnimationView) {
        if let Some((min, _)) = frame_bounds(view) {
            handler.with_engine(|engine| engine.set_min_frame(min));
        }
    }

    fn map_max_frame(handler: &mut Self, view: &SharedAnimationView) {
        if let Some((_, max)) = frame_bounds(view) {
            handler.with_engine(|engine| engine.set_max_frame(max));
        }
    }

    fn map_min_progress(handler: &mut Self, view: &SharedAnimationView) {
        if let Some((min, _)) = progress_bounds(view) {
            handler.with_engine(|engine| engine.set_min_progress(min));
        }
    }

    fn map_max_progress(handler: &mut Self, view: &SharedAnimationView) {
        if let Some((_, max)) = progress_bounds(view) {
            handler.with_engine(|engine| engine.set_max_progress(max));
        }
    }

    fn map_image_assets_folder(handler: &mut Self, view: &SharedAnimationView) {
        let folder = view.image_assets_folder();
        if !folder.is_empty() {
            handler.with_engine(|engine| engine.set_image_assets_folder(&folder));
        }
    }

    fn map_command(handler: &mut Self, _view: &SharedAnimationView, command: &ViewCommand) {
        if let Some(att) = &handler.attachment {
            run_command(&att.ctx, command);
        }
    }

    // ── listener construction ───────────────────────────────────────────

    fn tap_listener(&self, guard: &AttachmentGuard) -> ClickListener {
        trampoline(&self.scheduler, &self.view, guard, |view| {
            view.invoke_clicked();
        })
    }

    fn failure_handler(&self, guard: &AttachmentGuard) -> FailureListener {
        let mut inner = trampoline_with(&self.scheduler, &self.view, guard, |view, error| {
            view.invoke_failed(error);
        });
        Box::new(move |error| inner(error.clone()))
    }
}

impl<E: PlayerEngine + 'static> PlatformHandler for PlayerViewHandler<E> {
    type Engine = E;

    fn create_platform_view(&mut self) -> Rc<RefCell<E>> {
        Rc::new(RefCell::new((self.factory)()))
    }

    fn connect(&mut self, engine: Rc<RefCell<E>>) {
        if self.attachment.is_some() {
            self.disconnect();
        }
        let Some(view) = self.view.upgrade() else {
            return;
        };
        let guard = AttachmentGuard::new_live();

        let tap = {
            let mut e = engine.borrow_mut();
            let tap = e.add_tap_recognizer(self.tap_listener(&guard));
            e.set_failure_handler(Some(self.failure_handler(&guard)));
            tap
        };

        let ctx = PlayContext {
            engine: engine.clone(),
            view: self.view.clone(),
            scheduler: self.scheduler.clone(),
            guard,
            repeat: Rc::new(RefCell::new(RepeatCoordinator::new())),
        };
        let sink_ctx = ctx.clone();
        self.attachment = Some(Attachment { ctx, tap });

        self.try_set_animation(&view);

        view.install_command_sink(Rc::new(move |command| {
            if sink_ctx.guard.is_live() {
                run_command(&sink_ctx, command);
            }
        }));

        for &property in CONNECT_APPLY_ORDER {
            if let Some(applier) = self.properties.get(property) {
                applier(self, &view);
            }
        }

        if view.auto_play() || view.is_animating() {
            self.begin_playback();
        }

        let (duration_ms, animating) = {
            let e = engine.borrow();
            (e.duration_ms(), e.is_animating())
        };
        view.note_duration_ms(duration_ms);
        view.note_is_animating(animating);

        log::debug!("player handler connected");
    }

    fn disconnect(&mut self) {
        let Some(att) = self.attachment.take() else {
            return;
        };
        att.ctx.guard.revoke();
        att.ctx.repeat.borrow_mut().reset();
        {
            let mut e = att.ctx.engine.borrow_mut();
            e.remove_tap_recognizer(att.tap);
            e.set_failure_handler(None);
        }
        if let Some(view) = self.view.upgrade() {
            view.clear_command_sink();
        }
        log::debug!("player handler disconnected");
    }

    fn apply_property(&mut self, property: ViewProperty) {
        if self.attachment.is_none() {
            return;
        }
        let Some(view) = self.view.upgrade() else {
            return;
        };
        // properties outside the table fall through to the base-view default
        if let Some(applier) = self.properties.get(property) {
            applier(self, &view);
        }
    }

    fn dispatch_command(&mut self, command: &ViewCommand) {
        if self.attachment.is_none() {
            return;
        }
        let Some(view) = self.view.upgrade() else {
            return;
        };
        if let Some(applier) = self.commands.get(command.kind()) {
            applier(self, &view, command);
        }
    }

    fn is_connected(&self) -> bool {
        self.attachment.is_some()
    }
}
