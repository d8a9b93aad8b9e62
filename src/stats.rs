use std::sync::Arc;

use crate::observer::{ListenerId, Observers};

/// Rewrites a pending health diff before it is applied (armour, shields,
/// vulnerability). Modifiers run in registration order, each seeing the
/// previous one's output.
pub type HealthModifier = dyn Fn(&EntityStatistics, i32) -> i32 + Send + Sync;

/// Called with `(base, diff)`: health before the change and the applied diff.
pub type HealthListener = dyn Fn(i32, i32) + Send + Sync;

/// Per-entity statistics. Only health is tracked for now.
pub struct EntityStatistics {
    health: i32,
    min_health: i32,
    max_health: i32,
    modifiers: Vec<Arc<HealthModifier>>,
    listeners: Observers<HealthListener>,
}

impl EntityStatistics {
    /// A `max_health` below the minimum of zero is raised to zero, leaving an
    /// already depleted entity.
    pub fn new(max_health: i32) -> Self {
        let min_health = 0;
        let max_health = max_health.max(min_health);
        Self {
            health: max_health,
            min_health,
            max_health,
            modifiers: Vec::new(),
            listeners: Observers::new(),
        }
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    pub fn is_depleted(&self) -> bool {
        self.health <= self.min_health
    }

    pub fn set_health(&mut self, health: i32) {
        self.health = health.clamp(self.min_health, self.max_health);
    }

    pub fn add_modifier(
        &mut self,
        modifier: impl Fn(&EntityStatistics, i32) -> i32 + Send + Sync + 'static,
    ) {
        self.modifiers.push(Arc::new(modifier));
    }

    pub fn on_health_change(
        &mut self,
        listener: impl Fn(i32, i32) + Send + Sync + 'static,
    ) -> ListenerId {
        self.listeners.add(Arc::new(listener))
    }

    pub fn remove_health_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Run `diff` through the modifiers, apply it within bounds, and return
    /// the diff that actually landed.
    pub fn apply_health_diff(&mut self, diff: i32) -> i32 {
        let diff = self
            .modifiers
            .iter()
            .fold(diff, |pending, modifier| modifier(self, pending));

        let base = self.health;
        self.set_health(base.saturating_add(diff));
        let applied = self.health - base;
        if applied != 0 {
            tracing::trace!(base, applied, "health changed");
            for listener in self.listeners.snapshot() {
                listener(base, applied);
            }
        }
        applied
    }

    pub fn apply_damage(&mut self, amount: i32) -> i32 {
        self.apply_health_diff(amount.saturating_neg())
    }
}

impl std::fmt::Debug for EntityStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStatistics")
            .field("health", &self.health)
            .field("max_health", &self.max_health)
            .field("modifiers", &self.modifiers.len())
            .finish_non_exhaustive()
    }
}
