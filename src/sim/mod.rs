//! Headless simulation that hosts characters in an ECS world and replays
//! scripted input against them.

mod input;
mod pawn;
mod systems;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use glam::Vec3;
use hecs::{Entity, World};

use crate::character::{Action, CharacterStateMachine, StateId};
use crate::config::{positive, MachineConfig};
use crate::error::ConfigError;
use crate::stats::EntityStatistics;

pub use input::{HeldInput, InputEvent, InputScript, ScriptedInput};
pub use pawn::Pawn;
pub use systems::{
    character_state_system, combat_timer_system, held_input_system, input_system,
    install_guard_modifier, pawn_physics_system, SwingTimer,
};

/// State machine component attached to every simulated character.
pub type Character = CharacterStateMachine<Pawn>;

/// Display name of a simulated character.
#[derive(Debug, Clone)]
pub struct Name(pub String);

/// Simulation-level settings that are not machine tunables.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    /// Fixed frame time in seconds.
    pub dt: f32,
    /// Seconds an unchained swing lasts before the attack finishes.
    pub attack_duration: f32,
    pub max_health: i32,
    /// Seconds a newly bound perspective takes to blend in.
    pub perspective_blend_time: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 1.0 / 60.0,
            attack_duration: 0.6,
            max_health: 100,
            perspective_blend_time: 0.25,
        }
    }
}

impl SimConfig {
    /// Frame time and swing length must be positive and finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("dt", self.dt)?;
        positive("attack_duration", self.attack_duration)?;
        Ok(())
    }
}

/// End-of-run snapshot of one character.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterReport {
    pub name: String,
    pub state: StateId,
    pub actions: Vec<Action>,
    pub position: Vec3,
    pub health: i32,
    pub transitions: usize,
}

/// Transition count kept per character by a state listener.
#[derive(Debug, Default, Clone)]
struct TransitionCounter(Arc<std::sync::atomic::AtomicUsize>);

pub struct Simulation {
    world: World,
    characters: Vec<Entity>,
    config: SimConfig,
    machine_config: MachineConfig,
    frame: u64,
}

impl Simulation {
    pub fn new(config: SimConfig, machine_config: MachineConfig) -> Self {
        Self {
            world: World::new(),
            characters: Vec::new(),
            config,
            machine_config,
            frame: 0,
        }
    }

    /// Spawn a character standing on the floor at `position`.
    pub fn spawn_character(&mut self, name: impl Into<String>, position: Vec3) -> Entity {
        let name = name.into();
        let pawn = Pawn::new(position, self.config.perspective_blend_time);
        let mut machine = Character::with_config(pawn, self.machine_config);
        let mut stats = EntityStatistics::new(self.config.max_health);
        install_guard_modifier(&mut machine, &mut stats);

        let swing = SwingTimer::default();
        let restarted = Arc::clone(&swing.restarted);
        machine.on_action_change(move |action, added| {
            if action == Action::Attack && added {
                restarted.store(true, Ordering::Relaxed);
            }
        });

        let counter = TransitionCounter::default();
        let count = Arc::clone(&counter.0);
        let label = name.clone();
        machine.on_state_change(move |_, from, to| {
            if from != to {
                count.fetch_add(1, Ordering::Relaxed);
            }
            tracing::info!(character = %label, from = %from, to = %to, "state change");
        });
        machine.broadcast_current_state();

        let entity = self.world.spawn((
            machine,
            Name(name),
            stats,
            HeldInput::default(),
            swing,
            counter,
        ));
        self.characters.push(entity);
        entity
    }

    pub fn characters(&self) -> &[Entity] {
        &self.characters
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Run one fixed frame with the given events.
    pub fn run_frame<'a>(&mut self, events: impl IntoIterator<Item = &'a ScriptedInput>) {
        let dt = self.config.dt;
        input_system(&mut self.world, &self.characters, events);
        held_input_system(&mut self.world);
        combat_timer_system(&mut self.world, self.config.attack_duration, dt);
        character_state_system(&mut self.world, dt);
        pawn_physics_system(&mut self.world, dt);
        self.frame += 1;
    }

    /// Replay `script` for `frames` frames, starting at the current frame.
    pub fn run(&mut self, script: &InputScript, frames: u64) {
        for _ in 0..frames {
            let frame = self.frame;
            self.run_frame(script.events_for(frame));
        }
    }

    pub fn report(&self) -> Vec<CharacterReport> {
        self.characters
            .iter()
            .filter_map(|&entity| {
                let mut query = self
                    .world
                    .query_one::<(&Character, &Name, &EntityStatistics, &TransitionCounter)>(entity)
                    .ok()?;
                let (machine, name, stats, counter) = query.get()?;
                Some(CharacterReport {
                    name: name.0.clone(),
                    state: machine.current_state(),
                    actions: machine.actions().iter().collect(),
                    position: machine.facade().position,
                    health: stats.health(),
                    transitions: counter.0.load(Ordering::Relaxed),
                })
            })
            .collect()
    }
}
