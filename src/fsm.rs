/// Transition bookkeeping shared by the character state machine.
///
/// `S` is the state identifier (usually a fieldless enum). The container
/// tracks the committed state, the previously committed state, how long the
/// machine has been in its current state, and a generation counter that
/// identifies each attempted transition. **Transition rules are kept out of
/// the container**; the owner decides what to enter and calls [`commit`].
///
/// # Usage
/// ```
/// use lantern::fsm::StateMachine;
///
/// let mut fsm = StateMachine::new(1u8);
/// fsm.tick(0.016);
/// let tid = fsm.begin_transition();
/// fsm.commit(2);
/// assert!(fsm.is_current(tid));
/// assert!(fsm.just_entered());
/// assert_eq!(fsm.previous, 1);
/// ```
///
/// [`commit`]: StateMachine::commit
#[derive(Debug, Clone)]
pub struct StateMachine<S: Copy + Eq> {
    pub state: S,
    pub previous: S,
    /// Seconds spent in the current state. Reset to 0.0 on each commit.
    pub elapsed: f32,
    entered_this_frame: bool,
    generation: TransitionId,
}

/// Generation stamp handed out by [`StateMachine::begin_transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TransitionId(u64);

impl<S: Copy + Eq> StateMachine<S> {
    /// Create a new machine starting in `initial`.
    /// `just_entered()` returns `true` until the first tick.
    pub fn new(initial: S) -> Self {
        Self {
            state: initial,
            previous: initial,
            elapsed: 0.0,
            entered_this_frame: true,
            generation: TransitionId::default(),
        }
    }

    /// Advance the generation counter and return the id of the transition
    /// that is now in flight. Any id handed out earlier becomes stale.
    pub fn begin_transition(&mut self) -> TransitionId {
        self.generation.0 = self.generation.0.wrapping_add(1);
        self.generation
    }

    /// Whether `id` still names the most recent transition, i.e. no nested
    /// transition has begun since it was issued.
    pub fn is_current(&self, id: TransitionId) -> bool {
        self.generation == id
    }

    /// Latest generation handed out.
    pub fn generation(&self) -> TransitionId {
        self.generation
    }

    /// Make `next` the committed state. Resets `elapsed` and sets
    /// `just_entered()` for one tick. Committing the current state is a no-op.
    pub fn commit(&mut self, next: S) {
        if self.state != next {
            self.previous = std::mem::replace(&mut self.state, next);
            self.elapsed = 0.0;
            self.entered_this_frame = true;
        }
    }

    /// Advance the elapsed-in-state timer by `dt` seconds and clear the
    /// `just_entered` flag. Tick at the start of a frame, before that frame's
    /// events: a state committed later in the frame then reads as just entered
    /// until the next frame's tick.
    pub fn tick(&mut self, dt: f32) {
        self.elapsed += dt;
        self.entered_this_frame = false;
    }

    /// Returns `true` only until the first tick after entering this state.
    pub fn just_entered(&self) -> bool {
        self.entered_this_frame
    }
}
