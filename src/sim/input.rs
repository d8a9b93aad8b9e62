use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::character::StateId;
use crate::error::ScriptError;

/// One raw input or game event, as the engine layer would deliver it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// Movement stick deflected. Held until `StopMove`; re-sent every frame.
    Move { x: f32, y: f32 },
    StopMove,
    Run { held: bool },
    Jump,
    Look { x: f32, y: f32 },
    Cast,
    FinishCast,
    Attack,
    FinishAttack,
    AttackRecovery,
    ConsumeAttack,
    Guard,
    ReleaseGuard,
    Deflect { against_player: bool },
    ForceState { state: StateId },
    BindPerspective { yaw: f32 },
    ResetPerspective,
    Damage { amount: i32 },
}

/// An event scheduled for a given frame and character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedInput {
    pub frame: u64,
    #[serde(default)]
    pub character: usize,
    #[serde(flatten)]
    pub event: InputEvent,
}

/// Frame-ordered list of scripted events.
///
/// Events are kept sorted by frame (stable, so events sharing a frame keep
/// their file order); every constructor goes through [`InputScript::new`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawScript")]
pub struct InputScript {
    events: Vec<ScriptedInput>,
}

#[derive(Deserialize)]
struct RawScript {
    events: Vec<ScriptedInput>,
}

impl From<RawScript> for InputScript {
    fn from(raw: RawScript) -> Self {
        Self::new(raw.events)
    }
}

impl InputScript {
    pub fn new(mut events: Vec<ScriptedInput>) -> Self {
        events.sort_by_key(|e| e.frame);
        Self { events }
    }

    pub fn from_json(text: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn events(&self) -> &[ScriptedInput] {
        &self.events
    }

    /// Reject scripts that address characters that were never spawned.
    pub fn check_characters(&self, count: usize) -> Result<(), ScriptError> {
        match self.events.iter().find(|e| e.character >= count) {
            Some(e) => Err(ScriptError::UnknownCharacter {
                index: e.character,
                count,
            }),
            None => Ok(()),
        }
    }

    pub fn events_for(&self, frame: u64) -> impl Iterator<Item = &ScriptedInput> {
        let start = self.events.partition_point(|e| e.frame < frame);
        let end = self.events.partition_point(|e| e.frame <= frame);
        self.events[start..end].iter()
    }

    pub fn last_frame(&self) -> Option<u64> {
        self.events.last().map(|e| e.frame)
    }
}

/// Movement axis currently held on a character's stick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HeldInput {
    pub axis: Option<Vec2>,
}
