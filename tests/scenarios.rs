use std::sync::{Arc, Mutex};

use glam::{Vec2, Vec3};
use lantern::camera::Rotator;
use lantern::{Action, CharacterFacade, CharacterStateMachine, StateId};
use strum::IntoEnumIterator;

#[derive(Default)]
struct Body {
    falling: bool,
    enters: usize,
    jumps: usize,
}

impl CharacterFacade for Body {
    fn is_falling(&self) -> bool {
        self.falling
    }
    fn jump(&mut self) {
        self.jumps += 1;
    }
    fn add_movement_input(&mut self, _direction: Vec3, _scale: f32) {}
    fn set_max_walk_speed(&mut self, _speed: f32) {
        self.enters += 1;
    }
    fn control_rotation(&self) -> Rotator {
        Rotator::ZERO
    }
    fn add_controller_yaw_input(&mut self, _value: f32) {}
    fn add_controller_pitch_input(&mut self, _value: f32) {}
    fn bound_perspective(&self) -> Option<Rotator> {
        None
    }
}

type Machine = CharacterStateMachine<Body>;
type StateLog = Arc<Mutex<Vec<(StateId, StateId)>>>;
type ActionLog = Arc<Mutex<Vec<(Action, bool)>>>;

fn observed() -> (Machine, StateLog, ActionLog) {
    let mut m = Machine::new(Body::default());
    let states: StateLog = Arc::default();
    let actions: ActionLog = Arc::default();
    let sink = Arc::clone(&states);
    m.on_state_change(move |_, from, to| sink.lock().unwrap().push((from, to)));
    let sink = Arc::clone(&actions);
    m.on_action_change(move |a, added| sink.lock().unwrap().push((a, added)));
    (m, states, actions)
}

#[test]
fn self_transitions_are_silent_for_every_state() {
    for state in StateId::iter() {
        let (mut m, states, actions) = observed();
        if state == StateId::Running {
            m.run_update(true);
        }
        m.force_state(state);
        assert_eq!(m.current_state(), state);
        if state == StateId::Casting {
            // Leaving Casting clears the actions, so a held Move exposes an exit.
            m.attempt_move(Vec2::X);
            assert!(m.actions().contains(Action::Move));
        }
        states.lock().unwrap().clear();
        actions.lock().unwrap().clear();
        let before = (m.facade().enters, m.facade().jumps);

        m.force_state(state);

        assert_eq!(m.current_state(), state);
        assert!(states.lock().unwrap().is_empty(), "{state} announced itself");
        assert!(actions.lock().unwrap().is_empty(), "{state} touched its actions");
        assert_eq!(
            (m.facade().enters, m.facade().jumps),
            before,
            "{state} re-entered itself"
        );
        if state == StateId::Casting {
            assert!(m.actions().contains(Action::Move), "casting exited");
        }
        if state == StateId::Airborne {
            assert_eq!(m.facade().jumps, 1);
        }
    }
}

#[test]
fn force_state_reaches_every_state() {
    for state in StateId::iter() {
        let mut m = Machine::new(Body::default());
        if state == StateId::Running {
            m.run_update(true);
        }
        if state == StateId::Airborne {
            m.facade_mut().falling = true;
        }
        m.force_state(state);
        assert_eq!(m.current_state(), state);
    }
}

#[test]
fn walk_then_run_emits_one_notification_each() {
    let (mut m, states, _) = observed();

    m.attempt_move(Vec2::Y);
    assert_eq!(m.current_state(), StateId::Walking);
    assert_eq!(*states.lock().unwrap(), vec![(StateId::Idle, StateId::Walking)]);

    m.run_update(true);
    assert_eq!(m.current_state(), StateId::Running);
    assert_eq!(
        *states.lock().unwrap(),
        vec![
            (StateId::Idle, StateId::Walking),
            (StateId::Walking, StateId::Running)
        ]
    );
}

#[test]
fn redirected_walking_is_never_announced() {
    let (mut m, states, _) = observed();
    m.run_update(true);
    m.attempt_cast();
    m.finish_cast();
    states.lock().unwrap().clear();

    m.force_state(StateId::Walking);

    assert_eq!(m.current_state(), StateId::Running);
    assert_eq!(*states.lock().unwrap(), vec![(StateId::Idle, StateId::Running)]);
}

#[test]
fn guard_from_idle_enters_attacking_with_shield_block() {
    let (mut m, states, actions) = observed();

    m.attempt_guard();

    assert_eq!(m.current_state(), StateId::Attacking);
    assert_eq!(m.actions().iter().collect::<Vec<_>>(), vec![Action::ShieldBlock]);
    assert_eq!(*states.lock().unwrap(), vec![(StateId::Idle, StateId::Attacking)]);
    assert_eq!(*actions.lock().unwrap(), vec![(Action::ShieldBlock, true)]);
}

#[test]
fn falling_and_landing_drive_airborne() {
    let (mut m, states, _) = observed();
    m.facade_mut().falling = true;
    m.step(0.016);
    m.facade_mut().falling = false;
    m.step(0.016);
    assert_eq!(
        *states.lock().unwrap(),
        vec![
            (StateId::Idle, StateId::Airborne),
            (StateId::Airborne, StateId::Idle)
        ]
    );
}

#[test]
fn single_combo_window_per_attack_session() {
    let (mut m, _, actions) = observed();
    m.attempt_attack();
    actions.lock().unwrap().clear();

    m.attempt_attack();
    assert!(!m.can_chain());
    assert_eq!(
        *actions.lock().unwrap(),
        vec![(Action::Attack, false), (Action::Attack, true)]
    );

    m.attempt_attack();
    assert_eq!(m.current_state(), StateId::Attacking);
    assert_eq!(actions.lock().unwrap().len(), 2);
}

#[test]
fn finish_attack_respects_guard_latch() {
    let (mut m, _, _) = observed();
    m.attempt_attack();
    m.attempt_guard();
    m.finish_attack();
    assert_eq!(m.current_state(), StateId::Attacking);
    assert!(m.actions().contains(Action::ShieldBlock));

    m.finish_guard();
    m.attempt_attack();
    m.finish_attack();
    assert_eq!(m.current_state(), StateId::Idle);
    assert!(m.actions().is_empty());
}

#[test]
fn reentrant_force_state_stops_stale_notifications() {
    let mut m = Machine::new(Body::default());
    let calls = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&calls);
    m.on_state_change(move |m, from, to| {
        sink.lock().unwrap().push(("first", from, to));
        if to == StateId::Attacking {
            m.force_state(StateId::Casting);
        }
    });
    for tag in ["second", "third"] {
        let sink = Arc::clone(&calls);
        m.on_state_change(move |_, from, to| sink.lock().unwrap().push((tag, from, to)));
    }

    m.attempt_attack();

    assert_eq!(m.current_state(), StateId::Casting);
    let calls = calls.lock().unwrap();
    assert_eq!(
        *calls,
        vec![
            ("first", StateId::Idle, StateId::Attacking),
            ("first", StateId::Attacking, StateId::Casting),
            ("second", StateId::Attacking, StateId::Casting),
            ("third", StateId::Attacking, StateId::Casting),
        ]
    );
}

#[test]
fn leaving_cast_clears_actions_with_notifications() {
    let (mut m, _, actions) = observed();
    m.attempt_cast();
    m.attempt_move(Vec2::X);
    m.finish_cast();
    assert!(m.actions().is_empty());
    assert_eq!(
        *actions.lock().unwrap(),
        vec![(Action::Move, true), (Action::Move, false)]
    );
}
