use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use glam::Vec2;
use hecs::{Entity, World};

use super::input::{HeldInput, InputEvent, ScriptedInput};
use super::Character;
use crate::camera::Rotator;
use crate::character::{Action, StateId};
use crate::stats::EntityStatistics;

/// Time spent in the current swing. `restarted` is raised by an action
/// listener whenever a fresh Attack begins, including chained swings.
#[derive(Debug, Default)]
pub struct SwingTimer {
    pub elapsed: f32,
    pub restarted: Arc<AtomicBool>,
}

// ---------------------------------------------------------------------------
// Input routing
// ---------------------------------------------------------------------------

/// Route this frame's scripted events into their characters.
///
/// Movement is latched in [`HeldInput`] and re-sent by [`held_input_system`],
/// the way a stick keeps firing while deflected.
pub fn input_system<'a>(
    world: &mut World,
    characters: &[Entity],
    events: impl IntoIterator<Item = &'a ScriptedInput>,
) {
    for scripted in events {
        let Some(&entity) = characters.get(scripted.character) else {
            tracing::warn!(index = scripted.character, "event for unknown character dropped");
            continue;
        };
        let Ok((machine, held, stats)) = world
            .query_one_mut::<(&mut Character, &mut HeldInput, &mut EntityStatistics)>(entity)
        else {
            continue;
        };

        match scripted.event {
            InputEvent::Move { x, y } => held.axis = Some(Vec2::new(x, y)),
            InputEvent::StopMove => {
                held.axis = None;
                machine.stop_move();
            }
            InputEvent::Run { held: run_held } => machine.run_update(run_held),
            InputEvent::Jump => machine.attempt_jump(),
            InputEvent::Look { x, y } => machine.attempt_look(Vec2::new(x, y)),
            InputEvent::Cast => machine.attempt_cast(),
            InputEvent::FinishCast => machine.finish_cast(),
            InputEvent::Attack => machine.attempt_attack(),
            InputEvent::FinishAttack => machine.finish_attack(),
            InputEvent::AttackRecovery => machine.attack_recovery(),
            InputEvent::ConsumeAttack => machine.consume_attack(),
            InputEvent::Guard => machine.attempt_guard(),
            InputEvent::ReleaseGuard => machine.finish_guard(),
            InputEvent::Deflect { against_player } => machine.deflection_event(against_player),
            InputEvent::ForceState { state } => machine.force_state(state),
            InputEvent::BindPerspective { yaw } => {
                let pawn = machine.facade_mut();
                let current = pawn.control.rotator();
                pawn.perspective.set_default_perspective(current);
                pawn.perspective.set_perspective(Rotator::from_yaw(yaw));
            }
            InputEvent::ResetPerspective => machine.facade_mut().perspective.reset_perspective(),
            InputEvent::Damage { amount } => {
                let applied = stats.apply_damage(amount);
                tracing::info!(amount, applied, health = stats.health(), "damage taken");
            }
        }
    }
}

pub fn held_input_system(world: &mut World) {
    for (_e, (machine, held)) in world.query_mut::<(&mut Character, &HeldInput)>() {
        if let Some(axis) = held.axis {
            machine.attempt_move(axis);
        }
    }
}

// ---------------------------------------------------------------------------
// Timers owned outside the machine
// ---------------------------------------------------------------------------

/// Finish casts once the configured cast time has elapsed and swings once
/// `attack_duration` has passed since the last fresh Attack.
pub fn combat_timer_system(world: &mut World, attack_duration: f32, dt: f32) {
    for (_e, (machine, swing)) in world.query_mut::<(&mut Character, &mut SwingTimer)>() {
        if machine.current_state() == StateId::Casting
            && machine.time_in_state() >= machine.cast_time()
        {
            machine.finish_cast();
        }

        if swing.restarted.swap(false, Ordering::Relaxed) {
            swing.elapsed = 0.0;
        }
        if machine.current_state() == StateId::Attacking
            && machine.actions().contains(Action::Attack)
        {
            swing.elapsed += dt;
            if swing.elapsed >= attack_duration {
                swing.elapsed = 0.0;
                machine.finish_attack();
            }
        } else {
            swing.elapsed = 0.0;
        }
    }
}

// ---------------------------------------------------------------------------
// Per-frame update
// ---------------------------------------------------------------------------

/// Drive each machine's per-frame step. Runs **before** `pawn_physics_system`
/// so a landing detected this frame is reported on the next step.
pub fn character_state_system(world: &mut World, dt: f32) {
    for (_e, machine) in world.query_mut::<&mut Character>() {
        machine.step(dt);
    }
}

pub fn pawn_physics_system(world: &mut World, dt: f32) {
    for (_e, machine) in world.query_mut::<&mut Character>() {
        let pawn = machine.facade_mut();
        pawn.integrate(dt);
        pawn.perspective.tick(dt);
    }
}

/// Guard-aware damage: halve incoming damage while ShieldBlock is active.
/// The flag is fed by an action listener so stats never reach into the machine.
pub fn install_guard_modifier(machine: &mut Character, stats: &mut EntityStatistics) {
    let guarding = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&guarding);
    machine.on_action_change(move |action, added| {
        if action == Action::ShieldBlock {
            flag.store(added, Ordering::Relaxed);
        }
    });
    stats.add_modifier(move |_, diff| {
        if diff < 0 && guarding.load(Ordering::Relaxed) {
            diff / 2
        } else {
            diff
        }
    });
}
