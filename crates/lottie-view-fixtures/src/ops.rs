//! Recorded engine operations.

use lottie_view_core::{AnimationSource, RepeatMode};

/// One imperative call observed by a mock engine, in call order.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineOp {
    SetSource(AnimationSource),
    Play,
    Pause,
    Resume,
    Stop,
    Cancel,
    SetProgress(f32),
    SetFrame(u32),
    SetSpeed(f32),
    ReverseSpeed,
    SetMinFrame(u32),
    SetMaxFrame(u32),
    SetMinProgress(f32),
    SetMaxProgress(f32),
    SetCacheEnabled(bool),
    SetImageAssetsFolder(String),
    ConfigureRepeat(RepeatMode, u32),
    EnableMergePaths(bool),
    PerformClick,
    SetLoop(bool),
    PlayRangeFrames(u32, u32),
    PlayRangeProgress(f32, f32),
}
