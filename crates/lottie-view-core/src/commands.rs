//! Imperative commands routed from the view to the attached handler.
//!
//! A platform handler installs one command sink at connect and clears it at
//! disconnect. Invoking a command on a detached view is a no-op.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// A playback command plus its argument payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ViewCommand {
    Play,
    Pause,
    Resume,
    Stop,
    /// Synthesize a click on the engine view where the platform supports it.
    Click,
    /// Constrain playback to a frame window, then play.
    PlayFrameRange { min_frame: u32, max_frame: u32 },
    /// Constrain playback to a progress window, then play.
    PlayProgressRange { min_progress: f32, max_progress: f32 },
    /// Flip the playback direction.
    ReverseSpeed,
}

impl ViewCommand {
    #[inline]
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Play => CommandKind::Play,
            Self::Pause => CommandKind::Pause,
            Self::Resume => CommandKind::Resume,
            Self::Stop => CommandKind::Stop,
            Self::Click => CommandKind::Click,
            Self::PlayFrameRange { .. } => CommandKind::PlayFrameRange,
            Self::PlayProgressRange { .. } => CommandKind::PlayProgressRange,
            Self::ReverseSpeed => CommandKind::ReverseSpeed,
        }
    }
}

/// Discriminant used to key the host-facing command dispatch table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    Play,
    Pause,
    Resume,
    Stop,
    Click,
    PlayFrameRange,
    PlayProgressRange,
    ReverseSpeed,
}

impl CommandKind {
    pub const ALL: &'static [CommandKind] = &[
        CommandKind::Play,
        CommandKind::Pause,
        CommandKind::Resume,
        CommandKind::Stop,
        CommandKind::Click,
        CommandKind::PlayFrameRange,
        CommandKind::PlayProgressRange,
        CommandKind::ReverseSpeed,
    ];

    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Stop => "stop",
            Self::Click => "click",
            Self::PlayFrameRange => "play_frame_range",
            Self::PlayProgressRange => "play_progress_range",
            Self::ReverseSpeed => "reverse_speed",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }
}

/// The action a handler installs on the view at connect.
pub type CommandSink = Rc<dyn Fn(&ViewCommand)>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for &kind in CommandKind::ALL {
            assert_eq!(CommandKind::parse(kind.name()), Some(kind));
        }
        assert_eq!(CommandKind::parse("explode"), None);
    }

    #[test]
    fn kind_of_payload_commands() {
        let cmd = ViewCommand::PlayFrameRange {
            min_frame: 10,
            max_frame: 40,
        };
        assert_eq!(cmd.kind(), CommandKind::PlayFrameRange);
    }

    #[test]
    fn serde_round_trip() {
        let cmd = ViewCommand::PlayProgressRange {
            min_progress: 0.2,
            max_progress: 0.8,
        };
        let text = serde_json::to_string(&cmd).unwrap();
        let back: ViewCommand = serde_json::from_str(&text).unwrap();
        assert_eq!(cmd, back);
    }
}
