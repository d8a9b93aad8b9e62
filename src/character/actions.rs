use std::sync::Arc;

use bitflags::bitflags;
use strum::IntoEnumIterator;

use super::Action;
use crate::observer::{ListenerId, Observers};

/// Called with `(action, added)` after every membership change.
pub type ActionListener = dyn Fn(Action, bool) + Send + Sync;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    struct ActionBits: u8 {
        const MOVE = 1 << 0;
        const LANTERN_HOLD = 1 << 1;
        const SHIELD_BLOCK = 1 << 2;
        const ATTACK = 1 << 3;
        const LOOK_AT = 1 << 4;
        const DEFLECTING = 1 << 5;
        const NO_SPELL = 1 << 6;
    }
}

impl Action {
    fn bit(self) -> ActionBits {
        match self {
            Action::Move => ActionBits::MOVE,
            Action::LanternHold => ActionBits::LANTERN_HOLD,
            Action::ShieldBlock => ActionBits::SHIELD_BLOCK,
            Action::Attack => ActionBits::ATTACK,
            Action::LookAt => ActionBits::LOOK_AT,
            Action::Deflecting => ActionBits::DEFLECTING,
            Action::NoSpell => ActionBits::NO_SPELL,
        }
    }
}

/// Set of currently active [`Action`]s.
///
/// Membership changes are idempotent: adding a present action or removing an
/// absent one does nothing and notifies no one. The set is always updated
/// before its listeners run, so a listener reading it sees the change it is
/// being told about.
#[derive(Default)]
pub struct ActionSet {
    active: ActionBits,
    listeners: Observers<ActionListener>,
}

impl ActionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, action: Action) -> bool {
        self.active.contains(action.bit())
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn len(&self) -> usize {
        self.active.bits().count_ones() as usize
    }

    /// Active actions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Action> + '_ {
        Action::iter().filter(|a| self.contains(*a))
    }

    /// Returns whether the action was newly added.
    pub fn add(&mut self, action: Action) -> bool {
        if self.contains(action) {
            return false;
        }
        self.active.insert(action.bit());
        tracing::trace!(action = %action, "action added");
        self.notify(action, true);
        true
    }

    /// Returns whether the action was present.
    pub fn remove(&mut self, action: Action) -> bool {
        if !self.contains(action) {
            return false;
        }
        self.active.remove(action.bit());
        tracing::trace!(action = %action, "action removed");
        self.notify(action, false);
        true
    }

    /// Remove every active action, notifying once per removal.
    pub fn clear(&mut self) {
        let active: Vec<Action> = self.iter().collect();
        for action in active {
            self.remove(action);
        }
    }

    pub fn add_listener(&mut self, listener: Arc<ActionListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    fn notify(&self, action: Action, added: bool) {
        for listener in self.listeners.snapshot() {
            listener(action, added);
        }
    }
}

impl std::fmt::Debug for ActionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recorded(set: &mut ActionSet) -> Arc<Mutex<Vec<(Action, bool)>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        set.add_listener(Arc::new(move |a: Action, added: bool| {
            sink.lock().unwrap().push((a, added))
        }));
        log
    }

    #[test]
    fn add_and_remove_are_idempotent() {
        let mut set = ActionSet::new();
        let log = recorded(&mut set);

        assert!(set.add(Action::Attack));
        assert!(!set.add(Action::Attack));
        assert!(set.remove(Action::Attack));
        assert!(!set.remove(Action::Attack));

        assert_eq!(
            *log.lock().unwrap(),
            vec![(Action::Attack, true), (Action::Attack, false)]
        );
        assert!(set.is_empty());
    }

    #[test]
    fn clear_notifies_each_removal() {
        let mut set = ActionSet::new();
        set.add(Action::ShieldBlock);
        set.add(Action::Move);
        let log = recorded(&mut set);

        set.clear();

        assert!(set.is_empty());
        assert_eq!(
            *log.lock().unwrap(),
            vec![(Action::Move, false), (Action::ShieldBlock, false)]
        );
    }

    #[test]
    fn clear_on_empty_set_is_silent() {
        let mut set = ActionSet::new();
        let log = recorded(&mut set);
        set.clear();
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn iter_and_len_reflect_membership() {
        let mut set = ActionSet::new();
        set.add(Action::Deflecting);
        set.add(Action::LanternHold);
        assert_eq!(set.len(), 2);
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![Action::LanternHold, Action::Deflecting]
        );
        assert_eq!(format!("{set:?}"), "{LanternHold, Deflecting}");
    }
}
