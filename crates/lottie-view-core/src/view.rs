//! The animation state model: a declarative description of the desired
//! animation, shared between the application and one platform handler.
//!
//! The application owns a [`SharedAnimationView`] and mutates it; a platform
//! handler holds a [`WeakAnimationView`] back-reference and reconciles every
//! change onto its engine. All mutation, notification and event fan-out
//! happen on the UI scheduler. Setters release the inner cell before running
//! subscriber callbacks, so callbacks may read the view freely.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use crate::commands::{CommandSink, ViewCommand};
use crate::engine::Composition;
use crate::error::AdapterError;
use crate::events::{EventSinks, SubscriptionId, ViewEvent};
use crate::source::AnimationSource;

/// Looping policy.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RepeatMode {
    /// Loop forever; `repeat_count` is ignored.
    Infinite,
    /// Play `repeat_count` times total, then settle.
    #[default]
    Restart,
}

/// Every observable attribute of the view, keyed by name so hosts can drive
/// dispatch from their own property-changed notifications.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ViewProperty {
    Animation,
    AutoPlay,
    IsAnimating,
    CacheComposition,
    Progress,
    Frame,
    Speed,
    MinFrame,
    MaxFrame,
    MinProgress,
    MaxProgress,
    RepeatMode,
    RepeatCount,
    ImageAssetsFolder,
    MergePaths,
    Duration,
    FallbackResource,
}

impl ViewProperty {
    pub const ALL: &'static [ViewProperty] = &[
        ViewProperty::Animation,
        ViewProperty::AutoPlay,
        ViewProperty::IsAnimating,
        ViewProperty::CacheComposition,
        ViewProperty::Progress,
        ViewProperty::Frame,
        ViewProperty::Speed,
        ViewProperty::MinFrame,
        ViewProperty::MaxFrame,
        ViewProperty::MinProgress,
        ViewProperty::MaxProgress,
        ViewProperty::RepeatMode,
        ViewProperty::RepeatCount,
        ViewProperty::ImageAssetsFolder,
        ViewProperty::MergePaths,
        ViewProperty::Duration,
        ViewProperty::FallbackResource,
    ];

    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Animation => "animation",
            Self::AutoPlay => "auto_play",
            Self::IsAnimating => "is_animating",
            Self::CacheComposition => "cache_composition",
            Self::Progress => "progress",
            Self::Frame => "frame",
            Self::Speed => "speed",
            Self::MinFrame => "min_frame",
            Self::MaxFrame => "max_frame",
            Self::MinProgress => "min_progress",
            Self::MaxProgress => "max_progress",
            Self::RepeatMode => "repeat_mode",
            Self::RepeatCount => "repeat_count",
            Self::ImageAssetsFolder => "image_assets_folder",
            Self::MergePaths => "merge_paths",
            Self::Duration => "duration",
            Self::FallbackResource => "fallback_resource",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.name() == name)
    }
}

type PropertySubscriber = Box<dyn FnMut(ViewProperty)>;

#[derive(Default)]
struct NotifierSlots {
    next: u32,
    subscribers: Vec<(SubscriptionId, PropertySubscriber)>,
}

/// Change-notification relation, keyed by attribute.
#[derive(Clone, Default)]
struct PropertyNotifier {
    inner: Rc<RefCell<NotifierSlots>>,
}

impl PropertyNotifier {
    fn subscribe(&self, f: impl FnMut(ViewProperty) + 'static) -> SubscriptionId {
        let mut slots = self.inner.borrow_mut();
        let id = SubscriptionId(slots.next);
        slots.next = slots.next.wrapping_add(1);
        slots.subscribers.push((id, Box::new(f)));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut slots = self.inner.borrow_mut();
        let before = slots.subscribers.len();
        slots.subscribers.retain(|(sid, _)| *sid != id);
        slots.subscribers.len() != before
    }

    fn notify(&self, property: ViewProperty) {
        for (_, f) in self.inner.borrow_mut().subscribers.iter_mut() {
            f(property);
        }
    }
}

/// The state bag itself. Construct through [`SharedAnimationView::new`].
pub struct AnimationView {
    animation: Option<AnimationSource>,
    auto_play: bool,
    is_animating: bool,
    cache_composition: bool,
    progress: f32,
    frame: u32,
    speed: f32,
    min_frame: Option<u32>,
    max_frame: Option<u32>,
    min_progress: Option<f32>,
    max_progress: Option<f32>,
    repeat_mode: RepeatMode,
    repeat_count: u32,
    image_assets_folder: String,
    merge_paths: bool,
    duration_ms: u32,
    fallback_resource: Option<String>,
    composition: Option<Composition>,
    events: EventSinks,
    notifier: PropertyNotifier,
    commands: Option<CommandSink>,
}

impl Default for AnimationView {
    fn default() -> Self {
        Self {
            animation: None,
            auto_play: false,
            is_animating: false,
            cache_composition: true,
            progress: 0.0,
            frame: 0,
            speed: 1.0,
            min_frame: None,
            max_frame: None,
            min_progress: None,
            max_progress: None,
            repeat_mode: RepeatMode::default(),
            repeat_count: 1,
            image_assets_folder: String::new(),
            merge_paths: false,
            duration_ms: 0,
            fallback_resource: None,
            composition: None,
            events: EventSinks::default(),
            notifier: PropertyNotifier::default(),
            commands: None,
        }
    }
}

impl AnimationView {
    fn clamp_frame(&self, frame: u32) -> u32 {
        match &self.composition {
            Some(comp) if comp.frame_count > 0 => frame.min(comp.frame_count - 1),
            _ => frame,
        }
    }
}

/// Strong, cloneable handle to an [`AnimationView`].
#[derive(Clone, Default)]
pub struct SharedAnimationView {
    inner: Rc<RefCell<AnimationView>>,
}

/// Back-reference a platform handler keeps to its bound view.
#[derive(Clone)]
pub struct WeakAnimationView {
    inner: Weak<RefCell<AnimationView>>,
}

impl WeakAnimationView {
    pub fn upgrade(&self) -> Option<SharedAnimationView> {
        self.inner.upgrade().map(|inner| SharedAnimationView { inner })
    }
}

macro_rules! getter {
    ($name:ident, $ty:ty) => {
        #[inline]
        pub fn $name(&self) -> $ty {
            self.inner.borrow().$name
        }
    };
}

impl SharedAnimationView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn downgrade(&self) -> WeakAnimationView {
        WeakAnimationView {
            inner: Rc::downgrade(&self.inner),
        }
    }

    fn notify(&self, property: ViewProperty) {
        let notifier = self.inner.borrow().notifier.clone();
        notifier.notify(property);
    }

    /// Store `value` in `field` and notify when it actually changed.
    fn update<T: PartialEq>(
        &self,
        property: ViewProperty,
        value: T,
        field: impl FnOnce(&mut AnimationView) -> &mut T,
    ) {
        let changed = {
            let mut view = self.inner.borrow_mut();
            let slot = field(&mut view);
            if *slot != value {
                *slot = value;
                true
            } else {
                false
            }
        };
        if changed {
            self.notify(property);
        }
    }

    // ── declared state ──────────────────────────────────────────────────

    pub fn animation(&self) -> Option<AnimationSource> {
        self.inner.borrow().animation.clone()
    }

    pub fn set_animation(&self, source: Option<AnimationSource>) {
        self.update(ViewProperty::Animation, source, |v| &mut v.animation);
    }

    getter!(auto_play, bool);

    pub fn set_auto_play(&self, auto_play: bool) {
        self.update(ViewProperty::AutoPlay, auto_play, |v| &mut v.auto_play);
    }

    getter!(is_animating, bool);
    getter!(cache_composition, bool);

    pub fn set_cache_composition(&self, cache: bool) {
        self.update(ViewProperty::CacheComposition, cache, |v| {
            &mut v.cache_composition
        });
    }

    getter!(progress, f32);

    /// Out-of-range writes clamp; observers always see the clamped value.
    pub fn set_progress(&self, progress: f32) {
        let clamped = progress.clamp(0.0, 1.0);
        self.inner.borrow_mut().progress = clamped;
        self.notify(ViewProperty::Progress);
    }

    getter!(frame, u32);

    /// Clamped to the composition's frame range once one is loaded.
    pub fn set_frame(&self, frame: u32) {
        let clamped = self.inner.borrow().clamp_frame(frame);
        self.update(ViewProperty::Frame, clamped, |v| &mut v.frame);
    }

    getter!(speed, f32);

    pub fn set_speed(&self, speed: f32) {
        self.update(ViewProperty::Speed, speed, |v| &mut v.speed);
    }

    getter!(min_frame, Option<u32>);
    getter!(max_frame, Option<u32>);
    getter!(min_progress, Option<f32>);
    getter!(max_progress, Option<f32>);

    pub fn set_min_frame(&self, frame: Option<u32>) {
        self.update(ViewProperty::MinFrame, frame, |v| &mut v.min_frame);
    }

    pub fn set_max_frame(&self, frame: Option<u32>) {
        self.update(ViewProperty::MaxFrame, frame, |v| &mut v.max_frame);
    }

    pub fn set_min_progress(&self, progress: Option<f32>) {
        self.update(ViewProperty::MinProgress, progress, |v| &mut v.min_progress);
    }

    pub fn set_max_progress(&self, progress: Option<f32>) {
        self.update(ViewProperty::MaxProgress, progress, |v| &mut v.max_progress);
    }

    getter!(repeat_mode, RepeatMode);

    pub fn set_repeat_mode(&self, mode: RepeatMode) {
        self.update(ViewProperty::RepeatMode, mode, |v| &mut v.repeat_mode);
    }

    getter!(repeat_count, u32);

    /// Total plays under `RepeatMode::Restart`; floored at 1.
    pub fn set_repeat_count(&self, count: u32) {
        self.update(ViewProperty::RepeatCount, count.max(1), |v| {
            &mut v.repeat_count
        });
    }

    pub fn image_assets_folder(&self) -> String {
        self.inner.borrow().image_assets_folder.clone()
    }

    pub fn set_image_assets_folder(&self, folder: impl Into<String>) {
        self.update(ViewProperty::ImageAssetsFolder, folder.into(), |v| {
            &mut v.image_assets_folder
        });
    }

    getter!(merge_paths, bool);

    pub fn set_merge_paths(&self, enabled: bool) {
        self.update(ViewProperty::MergePaths, enabled, |v| &mut v.merge_paths);
    }

    getter!(duration_ms, u32);

    pub fn fallback_resource(&self) -> Option<String> {
        self.inner.borrow().fallback_resource.clone()
    }

    /// Carried for the application's failure handling; the adapter never
    /// reads it.
    pub fn set_fallback_resource(&self, resource: Option<String>) {
        self.update(ViewProperty::FallbackResource, resource, |v| {
            &mut v.fallback_resource
        });
    }

    pub fn composition(&self) -> Option<Composition> {
        self.inner.borrow().composition.clone()
    }

    // ── mirrors written by the handler ──────────────────────────────────

    pub fn note_is_animating(&self, animating: bool) {
        self.update(ViewProperty::IsAnimating, animating, |v| &mut v.is_animating);
    }

    pub fn note_duration_ms(&self, duration_ms: u32) {
        self.update(ViewProperty::Duration, duration_ms, |v| &mut v.duration_ms);
    }

    /// Record the loaded composition and re-clamp the frame against it.
    pub fn note_composition(&self, composition: Composition) {
        let reclamped = {
            let mut view = self.inner.borrow_mut();
            view.composition = Some(composition);
            let clamped = view.clamp_frame(view.frame);
            if clamped != view.frame {
                view.frame = clamped;
                true
            } else {
                false
            }
        };
        if reclamped {
            self.notify(ViewProperty::Frame);
        }
    }

    // ── notification channel ────────────────────────────────────────────

    pub fn on_property_changed(&self, f: impl FnMut(ViewProperty) + 'static) -> SubscriptionId {
        self.inner.borrow().notifier.subscribe(f)
    }

    pub fn remove_property_subscriber(&self, id: SubscriptionId) -> bool {
        let notifier = self.inner.borrow().notifier.clone();
        notifier.unsubscribe(id)
    }

    // ── event sinks ─────────────────────────────────────────────────────

    pub fn on_event(&self, f: impl FnMut(&ViewEvent) + 'static) -> SubscriptionId {
        self.inner.borrow().events.subscribe(f)
    }

    pub fn remove_event_subscriber(&self, id: SubscriptionId) -> bool {
        let events = self.inner.borrow().events.clone();
        events.unsubscribe(id)
    }

    fn emit(&self, event: &ViewEvent) {
        let events = self.inner.borrow().events.clone();
        events.emit(event);
    }

    pub fn invoke_started(&self) {
        self.emit(&ViewEvent::Started);
    }

    pub fn invoke_paused(&self) {
        self.emit(&ViewEvent::Paused);
    }

    pub fn invoke_resumed(&self) {
        self.emit(&ViewEvent::Resumed);
    }

    pub fn invoke_stopped(&self) {
        self.emit(&ViewEvent::Stopped);
    }

    pub fn invoke_finished(&self) {
        self.emit(&ViewEvent::Finished);
    }

    pub fn invoke_repeated(&self) {
        self.emit(&ViewEvent::Repeated);
    }

    pub fn invoke_progress(&self, value: f32) {
        self.emit(&ViewEvent::Progress { value });
    }

    pub fn invoke_loaded(&self, composition: &Composition) {
        self.emit(&ViewEvent::Loaded {
            composition: composition.clone(),
        });
    }

    pub fn invoke_failed(&self, error: AdapterError) {
        self.emit(&ViewEvent::Failed { error });
    }

    pub fn invoke_clicked(&self) {
        self.emit(&ViewEvent::Clicked);
    }

    // ── command slots ───────────────────────────────────────────────────

    /// Installed by the platform handler at connect.
    pub fn install_command_sink(&self, sink: CommandSink) {
        self.inner.borrow_mut().commands = Some(sink);
    }

    /// Cleared at disconnect; later invocations become no-ops.
    pub fn clear_command_sink(&self) {
        self.inner.borrow_mut().commands = None;
    }

    pub fn is_attached(&self) -> bool {
        self.inner.borrow().commands.is_some()
    }

    pub fn invoke_command(&self, command: ViewCommand) {
        let sink = self.inner.borrow().commands.clone();
        match sink {
            Some(sink) => sink(&command),
            None => log::debug!("{} while detached is a no-op", command.kind().name()),
        }
    }

    pub fn play(&self) {
        self.invoke_command(ViewCommand::Play);
    }

    pub fn pause(&self) {
        self.invoke_command(ViewCommand::Pause);
    }

    pub fn resume(&self) {
        self.invoke_command(ViewCommand::Resume);
    }

    pub fn stop(&self) {
        self.invoke_command(ViewCommand::Stop);
    }

    pub fn click(&self) {
        self.invoke_command(ViewCommand::Click);
    }

    pub fn play_frame_range(&self, min_frame: u32, max_frame: u32) {
        self.invoke_command(ViewCommand::PlayFrameRange {
            min_frame,
            max_frame,
        });
    }

    pub fn play_progress_range(&self, min_progress: f32, max_progress: f32) {
        self.invoke_command(ViewCommand::PlayProgressRange {
            min_progress,
            max_progress,
        });
    }

    pub fn reverse_speed(&self) {
        self.invoke_command(ViewCommand::ReverseSpeed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording_view() -> (SharedAnimationView, Rc<RefCell<Vec<ViewProperty>>>) {
        let view = SharedAnimationView::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        view.on_property_changed(move |p| sink.borrow_mut().push(p));
        (view, seen)
    }

    #[test]
    fn progress_clamps_and_notifies_clamped_value() {
        let (view, seen) = recording_view();
        view.set_progress(1.7);
        assert_eq!(view.progress(), 1.0);
        assert_eq!(seen.borrow().as_slice(), &[ViewProperty::Progress]);

        view.set_progress(-0.3);
        assert_eq!(view.progress(), 0.0);
    }

    #[test]
    fn unchanged_writes_do_not_notify() {
        let (view, seen) = recording_view();
        view.set_speed(1.0);
        view.set_auto_play(false);
        assert!(seen.borrow().is_empty());

        view.set_speed(2.0);
        assert_eq!(seen.borrow().as_slice(), &[ViewProperty::Speed]);
    }

    #[test]
    fn notification_order_follows_mutation_order() {
        let (view, seen) = recording_view();
        view.set_speed(2.0);
        view.set_repeat_mode(RepeatMode::Infinite);
        view.set_min_frame(Some(10));
        assert_eq!(
            seen.borrow().as_slice(),
            &[
                ViewProperty::Speed,
                ViewProperty::RepeatMode,
                ViewProperty::MinFrame
            ]
        );
    }

    #[test]
    fn frame_reclamps_once_composition_is_known() {
        let (view, _) = recording_view();
        view.set_frame(500);
        assert_eq!(view.frame(), 500);

        view.note_composition(Composition::new("spinner", 60, 1000));
        assert_eq!(view.frame(), 59);

        view.set_frame(100);
        assert_eq!(view.frame(), 59);
    }

    #[test]
    fn repeat_count_floors_at_one() {
        let (view, _) = recording_view();
        view.set_repeat_count(0);
        assert_eq!(view.repeat_count(), 1);
    }

    #[test]
    fn commands_without_a_sink_are_no_ops() {
        let view = SharedAnimationView::new();
        // must not panic or emit anything
        view.play();
        view.stop();
        view.play_frame_range(1, 2);
    }

    #[test]
    fn command_sink_receives_invocations_until_cleared() {
        let view = SharedAnimationView::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        view.install_command_sink(Rc::new(move |cmd: &ViewCommand| {
            sink.borrow_mut().push(cmd.clone());
        }));
        assert!(view.is_attached());

        view.play();
        view.play_frame_range(10, 40);
        view.clear_command_sink();
        view.pause();

        assert_eq!(
            seen.borrow().as_slice(),
            &[
                ViewCommand::Play,
                ViewCommand::PlayFrameRange {
                    min_frame: 10,
                    max_frame: 40
                }
            ]
        );
    }

    #[test]
    fn property_names_round_trip() {
        for &p in ViewProperty::ALL {
            assert_eq!(ViewProperty::parse(p.name()), Some(p));
        }
        assert_eq!(ViewProperty::parse("bogus"), None);
    }

    #[test]
    fn subscribers_can_read_the_view_during_notification() {
        let view = SharedAnimationView::new();
        let observed = Rc::new(RefCell::new(0.0f32));
        {
            let view2 = view.clone();
            let observed = observed.clone();
            view.on_property_changed(move |p| {
                if p == ViewProperty::Speed {
                    *observed.borrow_mut() = view2.speed();
                }
            });
        }
        view.set_speed(3.5);
        assert_eq!(*observed.borrow(), 3.5);
    }
}
