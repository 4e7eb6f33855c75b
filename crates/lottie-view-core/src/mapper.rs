//! Declarative dispatch tables consumed by platform handlers.
//!
//! A handler owns one [`PropertyMapper`] and one [`CommandMapper`]. The host
//! framework drives both: a property-changed notification becomes a lookup
//! in the property table, an imperative command becomes a lookup in the
//! command table. Per-platform differences are table entries, not divergent
//! branches; a missing entry falls through to the base-view default, which
//! for this adapter is a no-op.
//!
//! Appliers read the current view attribute and push it to the engine. Every
//! applier must be idempotent: re-applying a property leaves the engine
//! state unchanged.

use hashbrown::HashMap;

use crate::commands::{CommandKind, ViewCommand};
use crate::view::{SharedAnimationView, ViewProperty};

pub type PropertyApplier<H> = fn(&mut H, &SharedAnimationView);
pub type CommandApplier<H> = fn(&mut H, &SharedAnimationView, &ViewCommand);

/// Attach-time apply order. Later entries may depend on earlier ones: speed
/// reads the bounds, progress reads the frame range. The animation source
/// and auto-play are handled outside this walk by the attach protocol.
pub const CONNECT_APPLY_ORDER: &[ViewProperty] = &[
    ViewProperty::CacheComposition,
    ViewProperty::MinFrame,
    ViewProperty::MaxFrame,
    ViewProperty::MinProgress,
    ViewProperty::MaxProgress,
    ViewProperty::Speed,
    ViewProperty::RepeatMode,
    ViewProperty::ImageAssetsFolder,
    ViewProperty::Frame,
    ViewProperty::Progress,
    ViewProperty::MergePaths,
];

/// Name-keyed table of property appliers.
pub struct PropertyMapper<H> {
    entries: HashMap<ViewProperty, PropertyApplier<H>>,
}

impl<H> PropertyMapper<H> {
    /// The base-view map. Host view-chrome properties (layout, background)
    /// are outside this adapter, so the base map starts empty and handlers
    /// overlay their entries.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn insert(&mut self, property: ViewProperty, applier: PropertyApplier<H>) {
        self.entries.insert(property, applier);
    }

    pub fn get(&self, property: ViewProperty) -> Option<PropertyApplier<H>> {
        self.entries.get(&property).copied()
    }

    pub fn contains(&self, property: ViewProperty) -> bool {
        self.entries.contains_key(&property)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<H> Default for PropertyMapper<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Name-keyed table of command appliers.
pub struct CommandMapper<H> {
    entries: HashMap<CommandKind, CommandApplier<H>>,
}

impl<H> CommandMapper<H> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn insert(&mut self, kind: CommandKind, applier: CommandApplier<H>) {
        self.entries.insert(kind, applier);
    }

    pub fn get(&self, kind: CommandKind) -> Option<CommandApplier<H>> {
        self.entries.get(&kind).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<H> Default for CommandMapper<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// The frame bound pair, validated. `None` when either half is unset or the
/// pair is rejected.
pub fn frame_bounds(view: &SharedAnimationView) -> Option<(u32, u32)> {
    let (min, max) = (view.min_frame()?, view.max_frame()?);
    if min > max {
        log::warn!("skipping frame bounds: min {min} > max {max}");
        return None;
    }
    Some((min, max))
}

/// The progress bound pair, validated. Frame bounds take precedence: when a
/// valid frame pair exists this returns `None` so callers skip the apply.
pub fn progress_bounds(view: &SharedAnimationView) -> Option<(f32, f32)> {
    if frame_bounds(view).is_some() {
        log::debug!("frame bounds take precedence over progress bounds");
        return None;
    }
    let (min, max) = (view.min_progress()?, view.max_progress()?);
    if min > max {
        log::warn!("skipping progress bounds: min {min} > max {max}");
        return None;
    }
    Some((min, max))
}
