//! Platform handler for animator-style Lottie engines.
//!
//! This flavor of engine exposes the full listener surface (animator
//! lifecycle, per-frame updates, composition loaded, failure, click) and
//! configures finite repeats natively, so Repeated/Finished events arrive
//! straight from the engine. The handler's job reduces to translation:
//! register trampolined listeners at connect, walk the property table, and
//! remove exactly what it registered at disconnect.
//!
//! Engine callbacks may originate off the UI scheduler; every listener posts
//! through the scheduler and is gated on the attachment guard, so a callback
//! that lands after disconnect never reaches the view.

use std::cell::RefCell;
use std::rc::Rc;

use lottie_view_core::commands::{CommandKind, ViewCommand};
use lottie_view_core::engine::{
    AnimatorEngine, AnimatorListener, ClickListener, Composition, FailureListener, ListenerId,
    LoadedListener, UpdateListener,
};
use lottie_view_core::handler::{trampoline, trampoline_with, PlatformHandler};
use lottie_view_core::mapper::{
    frame_bounds, progress_bounds, CommandMapper, PropertyMapper, CONNECT_APPLY_ORDER,
};
use lottie_view_core::scheduler::{AttachmentGuard, UiScheduler};
use lottie_view_core::view::{SharedAnimationView, ViewProperty, WeakAnimationView};

/// Reconciles one [`SharedAnimationView`] onto one animator-style engine.
pub struct AnimatorViewHandler<E: AnimatorEngine + 'static> {
    view: WeakAnimationView,
    scheduler: UiScheduler,
    factory: Box<dyn FnMut() -> E>,
    properties: PropertyMapper<Self>,
    commands: CommandMapper<Self>,
    attachment: Option<Attachment<E>>,
}

struct Attachment<E> {
    engine: Rc<RefCell<E>>,
    guard: AttachmentGuard,
    animator: ListenerId,
    loaded: ListenerId,
}

/// Single imperative path shared by the command sink and the command table.
fn run_command<E: AnimatorEngine>(engine: &Rc<RefCell<E>>, command: &ViewCommand) {
    let mut engine = engine.borrow_mut();
    match command {
        ViewCommand::Play => engine.play(),
        ViewCommand::Pause => engine.pause(),
        ViewCommand::Resume => engine.resume(),
        ViewCommand::Stop => {
            // cancel does not rewind on this flavor
            engine.cancel();
            engine.set_progress(0.0);
        }
        ViewCommand::Click => engine.perform_click(),
        ViewCommand::PlayFrameRange {
            min_frame,
            max_frame,
        } => {
            engine.set_min_frame(*min_frame);
            engine.set_max_frame(*max_frame);
            engine.play();
        }
        ViewCommand::PlayProgressRange {
            min_progress,
            max_progress,
        } => {
            engine.set_min_progress(*min_progress);
            engine.set_max_progress(*max_progress);
            engine.play();
        }
        ViewCommand::ReverseSpeed => engine.reverse_speed(),
    }
}

impl<E: AnimatorEngine + 'static> AnimatorViewHandler<E> {
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
        properties.insert(ViewProperty::MergePaths, Self::map_merge_paths);

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
        self.attachment.as_ref().map(|att| att.engine.clone())
    }

    fn with_engine(&self, f: impl FnOnce(&mut E)) {
        if let Some(att) = &self.attachment {
            f(&mut att.engine.borrow_mut());
        }
    }

    fn try_set_animation(&self, view: &SharedAnimationView) {
        let Some(source) = view.animation() else {
            return;
        };
        self.with_engine(|engine| engine.set_source(&source));
    }

    // ── property appliers ───────────────────────────────────────────────

    fn map_animation(handler: &mut Self, view: &SharedAnimationView) {
        handler.try_set_animation(view);
        if view.auto_play() || view.is_animating() {
            handler.with_engine(|engine| engine.play());
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
        let (mode, count) = (view.repeat_mode(), view.repeat_count());
        handler.with_engine(|engine| engine.configure_repeat(mode, count));
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

    fn map_merge_paths(handler: &mut Self, view: &SharedAnimationView) {
        let enabled = view.merge_paths();
        handler.with_engine(|engine| engine.enable_merge_paths(enabled));
    }

    fn map_command(handler: &mut Self, _view: &SharedAnimationView, command: &ViewCommand) {
        if let Some(att) = &handler.attachment {
            run_command(&att.engine, command);
        }
    }

    // ── listener construction ───────────────────────────────────────────

    fn animator_listener(&self, guard: &AttachmentGuard) -> AnimatorListener {
        AnimatorListener {
            on_start: trampoline(&self.scheduler, &self.view, guard, |view| {
                view.note_is_animating(true);
                view.invoke_started();
            }),
            on_end: trampoline_with(&self.scheduler, &self.view, guard, |view, finished: bool| {
                view.note_is_animating(false);
                if finished {
                    view.invoke_finished();
                }
            }),
            on_cancel: trampoline(&self.scheduler, &self.view, guard, |view| {
                view.note_is_animating(false);
                view.invoke_stopped();
            }),
            on_pause: trampoline(&self.scheduler, &self.view, guard, |view| {
                view.note_is_animating(false);
                view.invoke_paused();
            }),
            on_resume: trampoline(&self.scheduler, &self.view, guard, |view| {
                view.note_is_animating(true);
                view.invoke_resumed();
            }),
            on_repeat: trampoline(&self.scheduler, &self.view, guard, |view| {
                view.invoke_repeated();
            }),
        }
    }

    fn update_listener(&self, guard: &AttachmentGuard) -> UpdateListener {
        UpdateListener {
            on_update: trampoline_with(&self.scheduler, &self.view, guard, |view, progress| {
                view.invoke_progress(progress);
            }),
        }
    }

    fn loaded_listener(&self, guard: &AttachmentGuard) -> LoadedListener {
        let mut inner = trampoline_with(
            &self.scheduler,
            &self.view,
            guard,
            |view, composition: Composition| {
                view.note_composition(composition.clone());
                view.note_duration_ms(composition.duration_ms);
                view.invoke_loaded(&composition);
            },
        );
        LoadedListener {
            on_loaded: Box::new(move |composition| inner(composition.clone())),
        }
    }

    fn failure_listener(&self, guard: &AttachmentGuard) -> FailureListener {
        let mut inner = trampoline_with(&self.scheduler, &self.view, guard, |view, error| {
            view.invoke_failed(error);
        });
        Box::new(move |error| inner(error.clone()))
    }

    fn click_listener(&self, guard: &AttachmentGuard) -> ClickListener {
        trampoline(&self.scheduler, &self.view, guard, |view| {
            view.invoke_clicked();
        })
    }
}

impl<E: AnimatorEngine + 'static> PlatformHandler for AnimatorViewHandler<E> {
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

        let (animator, loaded) = {
            let mut e = engine.borrow_mut();
            let animator = e.add_animator_listener(self.animator_listener(&guard));
            let _updates = e.add_update_listener(self.update_listener(&guard));
            let loaded = e.add_loaded_listener(self.loaded_listener(&guard));
            e.set_failure_listener(Some(self.failure_listener(&guard)));
            e.set_click_listener(Some(self.click_listener(&guard)));
            (animator, loaded)
        };

        self.attachment = Some(Attachment {
            engine: engine.clone(),
            guard: guard.clone(),
            animator,
            loaded,
        });

        self.try_set_animation(&view);

        {
            let engine = engine.clone();
            let guard = guard.clone();
            view.install_command_sink(Rc::new(move |command| {
                if guard.is_live() {
                    run_command(&engine, command);
                }
            }));
        }

        for &property in CONNECT_APPLY_ORDER {
            if let Some(applier) = self.properties.get(property) {
                applier(self, &view);
            }
        }

        if view.auto_play() || view.is_animating() {
            engine.borrow_mut().play();
        }

        let (duration_ms, animating) = {
            let e = engine.borrow();
            (e.duration_ms(), e.is_animating())
        };
        view.note_duration_ms(duration_ms);
        view.note_is_animating(animating);

        log::debug!("animator handler connected");
    }

    fn disconnect(&mut self) {
        let Some(att) = self.attachment.take() else {
            return;
        };
        att.guard.revoke();
        {
            let mut e = att.engine.borrow_mut();
            e.remove_animator_listener(att.animator);
            e.remove_all_update_listeners();
            e.remove_loaded_listener(att.loaded);
            e.set_failure_listener(None);
            e.set_click_listener(None);
        }
        if let Some(view) = self.view.upgrade() {
            view.clear_command_sink();
        }
        log::debug!("animator handler disconnected");
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
