use std::sync::Arc;

use glam::Vec2;

use super::actions::{ActionListener, ActionSet};
use super::facade::CharacterFacade;
use super::{states, Action, StateId};
use crate::config::{positive, MachineConfig};
use crate::error::ConfigError;
use crate::fsm::{StateMachine, TransitionId};
use crate::observer::{ListenerId, Observers};

/// Called with `(from, to)` after every committed transition.
///
/// Listeners receive the machine mutably and may drive it further (force a
/// state, start an action). A transition started from inside a listener
/// supersedes the one being announced: the remaining listeners are not told
/// about the stale transition.
pub type StateListener<F> =
    dyn Fn(&mut CharacterStateMachine<F>, StateId, StateId) + Send + Sync;

/// Entry redirects form short chains (Walking -> Running). Anything longer
/// means two states are bouncing the transition between each other.
const MAX_REDIRECTS: usize = 16;

/// Hierarchical character state machine.
///
/// Owns the current state, the [`ActionSet`], latched input, movement
/// tunables and the per-session combo window, and talks to the character
/// through `F`. Each machine owns all of its state data, so any number of
/// characters can run side by side.
///
/// Every state change goes through a single gateway that runs
/// exit, enter (which may redirect), commit, then notification.
pub struct CharacterStateMachine<F> {
    pub(super) facade: F,
    pub(super) fsm: StateMachine<StateId>,
    pub(super) config: MachineConfig,
    pub(super) run_pressed: bool,
    pub(super) guard_pressed: bool,
    pub(super) input_axis: Vec2,
    pub(super) look_axis: Vec2,
    pub(super) actions: ActionSet,
    /// One-shot combo window; reopened on entering Attacking.
    pub(super) can_chain: bool,
    listeners: Observers<StateListener<F>>,
}

impl<F: CharacterFacade> CharacterStateMachine<F> {
    pub fn new(facade: F) -> Self {
        Self::with_config(facade, MachineConfig::default())
    }

    pub fn with_config(facade: F, config: MachineConfig) -> Self {
        Self {
            facade,
            fsm: StateMachine::new(StateId::Idle),
            config,
            run_pressed: false,
            guard_pressed: false,
            input_axis: Vec2::ZERO,
            look_axis: Vec2::ZERO,
            actions: ActionSet::new(),
            can_chain: false,
            listeners: Observers::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Inbound events
    // -----------------------------------------------------------------------

    /// Per-frame update. Advances the time-in-state clock first so the
    /// just-entered flag stays set for the whole frame a transition fires.
    pub fn step(&mut self, dt: f32) {
        self.fsm.tick(dt);
        let next = states::step(self.current_state(), self, dt);
        self.update_state(next);
    }

    pub fn attempt_move(&mut self, axis: Vec2) {
        self.input_axis = axis;
        let next = states::attempt_move(self.current_state(), self);
        self.update_state(next);
    }

    pub fn stop_move(&mut self) {
        self.input_axis = Vec2::ZERO;
        let next = states::stop_move(self.current_state(), self);
        self.update_state(next);
    }

    pub fn run_update(&mut self, run_held: bool) {
        self.run_pressed = run_held;
        let next = states::run_update(self.current_state(), self);
        self.update_state(next);
    }

    pub fn attempt_jump(&mut self) {
        let next = states::attempt_jump(self.current_state(), self);
        self.update_state(next);
    }

    pub fn attempt_look(&mut self, axis: Vec2) {
        self.look_axis = axis;
        let next = states::attempt_look(self.current_state(), self);
        self.update_state(next);
    }

    pub fn attempt_cast(&mut self) {
        let next = states::attempt_cast(self.current_state(), self);
        self.update_state(next);
    }

    pub fn finish_cast(&mut self) {
        let next = states::finish_cast(self.current_state(), self);
        self.update_state(next);
    }

    pub fn attempt_attack(&mut self) {
        let next = states::attempt_attack(self.current_state(), self);
        self.update_state(next);
    }

    pub fn finish_attack(&mut self) {
        let next = states::finish_attack(self.current_state(), self);
        self.update_state(next);
    }

    /// Guard pressed. Latches the held flag, then lets the state react.
    pub fn attempt_guard(&mut self) {
        self.guard_pressed = true;
        let next = states::attempt_guard(self.current_state(), self);
        self.update_state(next);
    }

    /// Guard released.
    pub fn finish_guard(&mut self) {
        self.guard_pressed = false;
        let next = states::finish_guard(self.current_state(), self);
        self.update_state(next);
    }

    pub fn deflection_event(&mut self, against_player: bool) {
        let next = states::deflection_event(self.current_state(), self, against_player);
        self.update_state(next);
    }

    /// The swing has recovered far enough to accept another combo input.
    pub fn attack_recovery(&mut self) {
        states::attack_recovery(self.current_state(), self);
    }

    /// The current swing has landed; drop the Attack action.
    pub fn consume_attack(&mut self) {
        self.actions.remove(Action::Attack);
    }

    /// Administrative override. Still goes through the normal gateway, so
    /// exit/enter, redirects and notifications all apply.
    pub fn force_state(&mut self, state: StateId) {
        tracing::debug!(state = %state, "forcing state");
        self.update_state(state);
    }

    /// Tell every listener the current state as `(current, current)` so
    /// observers bound after construction can sync up.
    pub fn broadcast_current_state(&mut self) {
        let current = self.current_state();
        let tid = self.fsm.generation();
        self.notify(tid, current, current);
    }

    // -----------------------------------------------------------------------
    // Transition engine
    // -----------------------------------------------------------------------

    fn update_state(&mut self, target: StateId) {
        let mut target = target;
        let mut redirects = 0;
        loop {
            let from = self.current_state();
            if target == from {
                return;
            }

            let tid = self.fsm.begin_transition();
            states::exit(from, self);
            let entered = states::enter(target, self);

            if entered == target {
                self.fsm.commit(target);
                tracing::debug!(from = %from, to = %target, "state transition");
                self.notify(tid, from, target);
                return;
            }

            tracing::trace!(requested = %target, redirect = %entered, "entry redirected");
            redirects += 1;
            debug_assert!(
                redirects < MAX_REDIRECTS,
                "state entry redirects do not terminate ({from} -> {target})"
            );
            target = entered;
        }
    }

    fn notify(&mut self, tid: TransitionId, from: StateId, to: StateId) {
        for listener in self.listeners.snapshot() {
            if !self.fsm.is_current(tid) {
                tracing::debug!(from = %from, to = %to, "stale transition, notifications cancelled");
                break;
            }
            listener(self, from, to);
        }
    }

    // -----------------------------------------------------------------------
    // Observers
    // -----------------------------------------------------------------------

    pub fn on_state_change(
        &mut self,
        listener: impl Fn(&mut Self, StateId, StateId) + Send + Sync + 'static,
    ) -> ListenerId {
        self.listeners.add(Arc::new(listener))
    }

    pub fn remove_state_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn on_action_change(
        &mut self,
        listener: impl Fn(Action, bool) + Send + Sync + 'static,
    ) -> ListenerId {
        let listener: Arc<ActionListener> = Arc::new(listener);
        self.actions.add_listener(listener)
    }

    pub fn remove_action_listener(&mut self, id: ListenerId) -> bool {
        self.actions.remove_listener(id)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn current_state(&self) -> StateId {
        self.fsm.state
    }

    /// State committed before the current one.
    pub fn previous_state(&self) -> StateId {
        self.fsm.previous
    }

    pub fn time_in_state(&self) -> f32 {
        self.fsm.elapsed
    }

    pub fn just_entered(&self) -> bool {
        self.fsm.just_entered()
    }

    pub fn actions(&self) -> &ActionSet {
        &self.actions
    }

    pub fn run_pressed(&self) -> bool {
        self.run_pressed
    }

    pub fn guard_pressed(&self) -> bool {
        self.guard_pressed
    }

    pub fn input_axis(&self) -> Vec2 {
        self.input_axis
    }

    pub fn look_axis(&self) -> Vec2 {
        self.look_axis
    }

    pub fn can_chain(&self) -> bool {
        self.can_chain
    }

    pub fn facade(&self) -> &F {
        &self.facade
    }

    pub fn facade_mut(&mut self) -> &mut F {
        &mut self.facade
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: MachineConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn set_walking_speed(&mut self, speed: f32) -> Result<(), ConfigError> {
        self.config.walking_speed = positive("walking_speed", speed)?;
        Ok(())
    }

    pub fn set_running_speed(&mut self, speed: f32) -> Result<(), ConfigError> {
        self.config.running_speed = positive("running_speed", speed)?;
        Ok(())
    }

    pub fn set_cast_walk_speed(&mut self, speed: f32) -> Result<(), ConfigError> {
        self.config.cast_walk_speed = positive("cast_walk_speed", speed)?;
        Ok(())
    }

    pub fn set_cast_time(&mut self, seconds: f32) -> Result<(), ConfigError> {
        self.config.cast_time = positive("cast_time", seconds)?;
        Ok(())
    }

    pub fn cast_time(&self) -> f32 {
        self.config.cast_time
    }
}

impl<F> std::fmt::Debug for CharacterStateMachine<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharacterStateMachine")
            .field("state", &self.fsm.state)
            .field("actions", &self.actions)
            .field("run_pressed", &self.run_pressed)
            .field("guard_pressed", &self.guard_pressed)
            .field("can_chain", &self.can_chain)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::character::testing::RecordingFacade;

    type Log = Arc<Mutex<Vec<(StateId, StateId)>>>;

    fn machine() -> CharacterStateMachine<RecordingFacade> {
        CharacterStateMachine::new(RecordingFacade::default())
    }

    fn record(m: &mut CharacterStateMachine<RecordingFacade>) -> Log {
        let log: Log = Arc::default();
        let sink = Arc::clone(&log);
        m.on_state_change(move |_, from, to| sink.lock().unwrap().push((from, to)));
        log
    }

    #[test]
    fn starts_idle_with_no_actions() {
        let m = machine();
        assert_eq!(m.current_state(), StateId::Idle);
        assert!(m.actions().is_empty());
        assert!(m.just_entered());
    }

    #[test]
    fn transition_to_self_has_no_side_effects() {
        let mut m = machine();
        m.force_state(StateId::Casting);
        m.attempt_move(Vec2::Y);
        let log = record(&mut m);
        let action_log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&action_log);
        m.on_action_change(move |a, added| sink.lock().unwrap().push((a, added)));
        let speed_calls = m.facade().max_speed_calls.len();

        m.force_state(StateId::Casting);

        assert!(log.lock().unwrap().is_empty());
        assert!(action_log.lock().unwrap().is_empty());
        assert!(m.actions().contains(Action::Move));
        assert_eq!(m.facade().max_speed_calls.len(), speed_calls);
    }

    #[test]
    fn airborne_self_transition_does_not_jump_again() {
        let mut m = machine();
        m.attempt_jump();
        assert_eq!(m.facade().jumps, 1);

        m.force_state(StateId::Airborne);

        assert_eq!(m.current_state(), StateId::Airborne);
        assert_eq!(m.facade().jumps, 1);
    }

    #[test]
    fn walking_entry_redirects_to_running_when_run_held() {
        let mut m = machine();
        let log = record(&mut m);
        m.run_update(true);

        m.force_state(StateId::Walking);

        assert_eq!(m.current_state(), StateId::Running);
        assert_eq!(*log.lock().unwrap(), vec![(StateId::Idle, StateId::Running)]);
        assert_eq!(m.facade().max_speed_calls, vec![m.config().running_speed]);
    }

    #[test]
    fn redirect_back_to_current_state_is_a_no_op() {
        let mut m = machine();
        m.attempt_move(Vec2::Y);
        assert_eq!(m.current_state(), StateId::Walking);
        let log = record(&mut m);

        m.force_state(StateId::Running);

        assert_eq!(m.current_state(), StateId::Walking);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let mut m = machine();
        let order = Arc::new(Mutex::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let sink = Arc::clone(&order);
            m.on_state_change(move |_, _, _| sink.lock().unwrap().push(tag));
        }
        m.attempt_jump();
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn listener_observes_committed_state() {
        let mut m = machine();
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        m.on_state_change(move |m, _, to| {
            *sink.lock().unwrap() = Some((m.current_state(), to));
        });
        m.attempt_cast();
        assert_eq!(
            *seen.lock().unwrap(),
            Some((StateId::Casting, StateId::Casting))
        );
    }

    #[test]
    fn nested_transition_cancels_stale_notifications() {
        let mut m = machine();
        let log: Log = Arc::default();

        let first = Arc::clone(&log);
        m.on_state_change(move |m, from, to| {
            first.lock().unwrap().push((from, to));
            if to == StateId::Casting {
                m.force_state(StateId::Idle);
            }
        });
        let second = Arc::clone(&log);
        m.on_state_change(move |_, from, to| second.lock().unwrap().push((from, to)));

        m.attempt_cast();

        assert_eq!(m.current_state(), StateId::Idle);
        // Outer (Idle, Casting) reaches only the first listener; the nested
        // (Casting, Idle) reaches both.
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                (StateId::Idle, StateId::Casting),
                (StateId::Casting, StateId::Idle),
                (StateId::Casting, StateId::Idle),
            ]
        );
    }

    #[test]
    fn removed_listener_is_not_notified() {
        let mut m = machine();
        let log = record(&mut m);
        let count = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&count);
        let id = m.on_state_change(move |_, _, _| *sink.lock().unwrap() += 1);
        assert!(m.remove_state_listener(id));

        m.attempt_jump();

        assert_eq!(*count.lock().unwrap(), 0);
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn broadcast_reports_current_state_to_itself() {
        let mut m = machine();
        let log = record(&mut m);
        m.broadcast_current_state();
        assert_eq!(*log.lock().unwrap(), vec![(StateId::Idle, StateId::Idle)]);
    }

    #[test]
    fn step_tracks_time_in_state() {
        let mut m = machine();
        m.step(0.25);
        m.step(0.25);
        assert_eq!(m.time_in_state(), 0.5);
        assert!(!m.just_entered());

        m.attempt_cast();
        assert_eq!(m.time_in_state(), 0.0);
        assert!(m.just_entered());
        assert_eq!(m.previous_state(), StateId::Idle);
    }

    #[test]
    fn setters_reject_non_positive_tunables() {
        let mut m = machine();
        assert!(m.set_walking_speed(-1.0).is_err());
        assert!(m.set_running_speed(f32::NAN).is_err());
        assert!(m.set_cast_time(0.0).is_err());
        m.set_cast_walk_speed(75.0).unwrap();
        assert_eq!(m.config().cast_walk_speed, 75.0);

        let bad = MachineConfig {
            guard_walk_speed: 0.0,
            ..MachineConfig::default()
        };
        assert!(m.set_config(bad).is_err());
        assert_eq!(m.config().guard_walk_speed, MachineConfig::default().guard_walk_speed);
    }
}
