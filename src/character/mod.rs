//! Player character controller: coarse states, fine-grained actions, and the
//! machine that arbitrates between them.

mod actions;
mod facade;
mod machine;
mod states;

#[cfg(test)]
pub(crate) mod testing;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};

pub use actions::{ActionListener, ActionSet};
pub use facade::CharacterFacade;
pub use machine::{CharacterStateMachine, StateListener};

/// All coarse states the character can be in.
///
/// Running, Casting and Attacking are specialisations of Walking: they share
/// its movement application and override speed and input handling.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StateId {
    Idle,
    Walking,
    Running,
    Airborne,
    Casting,
    Attacking,
}

/// Concurrent sub-activities tracked independently of the coarse state.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Move,
    LanternHold,
    ShieldBlock,
    Attack,
    LookAt,
    Deflecting,
    /// A cast was attempted but no spell was available.
    NoSpell,
}
