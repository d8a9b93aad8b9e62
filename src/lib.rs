//! Character controller core: a hierarchical state machine arbitrating
//! locomotion and combat, the concurrent action set it maintains, and the
//! observer plumbing that reports both to the rest of the game.
//!
//! The engine side is reached only through [`CharacterFacade`]; the [`sim`]
//! module hosts characters in a headless ECS world for replaying input.

pub mod camera;
pub mod character;
pub mod config;
pub mod error;
pub mod fsm;
pub mod observer;
pub mod sim;
pub mod stats;

pub use character::{Action, CharacterFacade, CharacterStateMachine, StateId};
pub use config::MachineConfig;
