//! Per-state event handlers.
//!
//! Every handler takes the state being asked and returns the state the
//! machine should move to; returning the same state means "stay". Anything a
//! state does not handle falls through to "stay, do nothing".
//!
//! Running, Casting and Attacking reuse Walking's behaviour through the shared
//! helpers at the bottom ([`apply_movement`], [`walking_speed`]) instead of
//! inheriting it; each match arm spells out which family members share a rule.

use super::facade::CharacterFacade;
use super::machine::CharacterStateMachine;
use super::{Action, StateId};

type Machine<F> = CharacterStateMachine<F>;

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Returns `state` to accept the entry, or another state to redirect to.
pub(super) fn enter<F: CharacterFacade>(state: StateId, m: &mut Machine<F>) -> StateId {
    match state {
        StateId::Walking if m.run_pressed => StateId::Running,
        StateId::Running if !m.run_pressed => StateId::Walking,
        StateId::Walking | StateId::Running => {
            let speed = walking_speed(state, m);
            m.facade.set_max_walk_speed(speed);
            apply_movement(m);
            state
        }
        StateId::Airborne => {
            // Walking off a ledge is already a fall; only a grounded entry jumps.
            if !m.facade.is_falling() {
                m.facade.jump();
            }
            state
        }
        StateId::Casting => {
            let speed = walking_speed(state, m);
            m.facade.set_max_walk_speed(speed);
            state
        }
        StateId::Attacking => {
            m.can_chain = true;
            let speed = walking_speed(state, m);
            m.facade.set_max_walk_speed(speed);
            state
        }
        StateId::Idle => state,
    }
}

pub(super) fn exit<F: CharacterFacade>(state: StateId, m: &mut Machine<F>) {
    if state == StateId::Casting {
        m.actions.clear();
    }
}

// ---------------------------------------------------------------------------
// Motion
// ---------------------------------------------------------------------------

pub(super) fn step<F: CharacterFacade>(state: StateId, m: &mut Machine<F>, _dt: f32) -> StateId {
    match state {
        StateId::Idle if m.facade.is_falling() => StateId::Airborne,
        StateId::Airborne if !m.facade.is_falling() => StateId::Idle,
        _ => state,
    }
}

pub(super) fn attempt_move<F: CharacterFacade>(state: StateId, m: &mut Machine<F>) -> StateId {
    match state {
        StateId::Idle if m.run_pressed => StateId::Running,
        StateId::Idle => StateId::Walking,
        StateId::Walking | StateId::Running => {
            apply_movement(m);
            state
        }
        StateId::Casting => {
            m.actions.add(Action::Move);
            apply_movement(m);
            state
        }
        StateId::Attacking => {
            if m.actions.contains(Action::ShieldBlock) {
                m.actions.add(Action::Move);
                apply_movement(m);
                state
            } else if m.actions.is_empty() {
                StateId::Walking
            } else {
                state
            }
        }
        StateId::Airborne => state,
    }
}

pub(super) fn stop_move<F: CharacterFacade>(state: StateId, m: &mut Machine<F>) -> StateId {
    match state {
        StateId::Walking | StateId::Running => StateId::Idle,
        StateId::Casting | StateId::Attacking => {
            m.actions.remove(Action::Move);
            state
        }
        StateId::Idle | StateId::Airborne => state,
    }
}

pub(super) fn run_update<F: CharacterFacade>(state: StateId, m: &mut Machine<F>) -> StateId {
    match state {
        StateId::Walking if m.run_pressed => StateId::Running,
        StateId::Running if !m.run_pressed => StateId::Walking,
        _ => state,
    }
}

pub(super) fn attempt_jump<F: CharacterFacade>(state: StateId, _m: &mut Machine<F>) -> StateId {
    match state {
        StateId::Idle | StateId::Walking | StateId::Running => StateId::Airborne,
        _ => state,
    }
}

/// Shared by every state: raw look input turns the controller unless an
/// external perspective has taken over the view.
pub(super) fn attempt_look<F: CharacterFacade>(state: StateId, m: &mut Machine<F>) -> StateId {
    if m.facade.bound_perspective().is_none() {
        let look = m.look_axis;
        m.facade.add_controller_yaw_input(look.x);
        m.facade.add_controller_pitch_input(look.y);
    }
    state
}

// ---------------------------------------------------------------------------
// Spell casting
// ---------------------------------------------------------------------------

pub(super) fn attempt_cast<F: CharacterFacade>(state: StateId, _m: &mut Machine<F>) -> StateId {
    match state {
        StateId::Idle | StateId::Walking | StateId::Running => StateId::Casting,
        _ => state,
    }
}

pub(super) fn finish_cast<F: CharacterFacade>(state: StateId, _m: &mut Machine<F>) -> StateId {
    match state {
        StateId::Casting => StateId::Idle,
        _ => state,
    }
}

// ---------------------------------------------------------------------------
// Combat
// ---------------------------------------------------------------------------

pub(super) fn attempt_attack<F: CharacterFacade>(state: StateId, m: &mut Machine<F>) -> StateId {
    match state {
        StateId::Idle => {
            m.actions.clear();
            m.actions.add(Action::Attack);
            StateId::Attacking
        }
        StateId::Walking | StateId::Running => {
            m.actions.add(Action::Attack);
            StateId::Attacking
        }
        StateId::Attacking => {
            if chain_condition(m) {
                // Drop the guard and restart the swing so observers see a
                // fresh Attack even if one was still active.
                m.actions.remove(Action::ShieldBlock);
                m.actions.remove(Action::Attack);
                m.actions.add(Action::Attack);
            }
            state
        }
        StateId::Airborne | StateId::Casting => state,
    }
}

pub(super) fn finish_attack<F: CharacterFacade>(state: StateId, m: &mut Machine<F>) -> StateId {
    match state {
        StateId::Attacking => {
            m.actions.clear();
            if m.guard_pressed {
                m.actions.add(Action::ShieldBlock);
                state
            } else {
                StateId::Idle
            }
        }
        _ => state,
    }
}

pub(super) fn attempt_guard<F: CharacterFacade>(state: StateId, m: &mut Machine<F>) -> StateId {
    match state {
        StateId::Idle => {
            m.actions.clear();
            m.actions.add(Action::ShieldBlock);
            StateId::Attacking
        }
        StateId::Walking | StateId::Running => {
            m.actions.add(Action::ShieldBlock);
            StateId::Attacking
        }
        StateId::Attacking => {
            if chain_condition(m) {
                m.actions.remove(Action::Attack);
                m.actions.add(Action::ShieldBlock);
            }
            state
        }
        StateId::Airborne | StateId::Casting => state,
    }
}

pub(super) fn finish_guard<F: CharacterFacade>(state: StateId, m: &mut Machine<F>) -> StateId {
    match state {
        StateId::Attacking if m.actions.contains(Action::ShieldBlock) => {
            m.actions.clear();
            StateId::Idle
        }
        _ => state,
    }
}

/// A parry window overrides whatever sub-action was running without leaving
/// the combat state.
pub(super) fn deflection_event<F: CharacterFacade>(
    state: StateId,
    m: &mut Machine<F>,
    against_player: bool,
) -> StateId {
    match state {
        StateId::Attacking => {
            tracing::debug!(against_player, "deflection");
            m.actions.remove(Action::ShieldBlock);
            m.actions.remove(Action::Attack);
            m.actions.remove(Action::Move);
            m.actions.add(Action::Deflecting);
            state
        }
        _ => state,
    }
}

pub(super) fn attack_recovery<F: CharacterFacade>(state: StateId, m: &mut Machine<F>) {
    if state == StateId::Attacking {
        m.can_chain = true;
    }
}

/// Whether an attack or guard may be re-triggered from inside Attacking.
/// Holding a block always allows it; otherwise the one-shot window is spent.
fn chain_condition<F>(m: &mut Machine<F>) -> bool {
    if m.actions.contains(Action::ShieldBlock) {
        return true;
    }
    std::mem::replace(&mut m.can_chain, false)
}

// ---------------------------------------------------------------------------
// Walking-family helpers
// ---------------------------------------------------------------------------

fn walking_speed<F>(state: StateId, m: &Machine<F>) -> f32 {
    match state {
        StateId::Running => m.config.running_speed,
        StateId::Casting => m.config.cast_walk_speed,
        StateId::Attacking => m.config.guard_walk_speed,
        _ => m.config.walking_speed,
    }
}

/// Push the latched input axis into the facade along the view's ground-plane
/// basis: X along right, Y along forward.
fn apply_movement<F: CharacterFacade>(m: &mut Machine<F>) {
    let rotation = m
        .facade
        .bound_perspective()
        .unwrap_or_else(|| m.facade.control_rotation());
    let (forward, right) = rotation.yaw_basis();
    let axis = m.input_axis;
    m.facade.add_movement_input(forward, axis.y);
    m.facade.add_movement_input(right, axis.x);
}
