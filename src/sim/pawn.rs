use glam::Vec3;

use crate::camera::{ControlRotation, PerspectiveManager, Rotator};
use crate::character::CharacterFacade;

// Units follow the machine tunables: centimetres and seconds.
const GRAVITY: f32 = -980.0;
const JUMP_IMPULSE: f32 = 700.0;

/// Kinematic stand-in for a character body: a point on a flat floor at y = 0.
///
/// Movement input accumulates between integrations; each integration turns
/// it into horizontal velocity at the current max walk speed, so the state
/// machine alone decides how fast the pawn may go.
#[derive(Debug, Clone)]
pub struct Pawn {
    pub position: Vec3,
    pub velocity: Vec3,
    pub control: ControlRotation,
    pub perspective: PerspectiveManager,
    pub jump_impulse: f32,
    pending_input: Vec3,
    max_walk_speed: f32,
    grounded: bool,
}

impl Pawn {
    pub fn new(position: Vec3, perspective_blend_time: f32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            control: ControlRotation::new(),
            perspective: PerspectiveManager::new(perspective_blend_time),
            jump_impulse: JUMP_IMPULSE,
            pending_input: Vec3::ZERO,
            max_walk_speed: 0.0,
            grounded: position.y <= 0.0,
        }
    }

    pub fn max_walk_speed(&self) -> f32 {
        self.max_walk_speed
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Semi-implicit Euler step: velocity first, then position, then floor
    /// contact.
    pub fn integrate(&mut self, dt: f32) {
        // Analog input is allowed to be partial but never to exceed max speed.
        let input = self.pending_input.clamp_length_max(1.0);
        self.pending_input = Vec3::ZERO;
        self.velocity.x = input.x * self.max_walk_speed;
        self.velocity.z = input.z * self.max_walk_speed;

        if !self.grounded {
            self.velocity.y += GRAVITY * dt;
        }
        self.position += self.velocity * dt;

        if self.position.y <= 0.0 && self.velocity.y <= 0.0 {
            self.position.y = 0.0;
            self.velocity.y = 0.0;
            self.grounded = true;
        } else if self.position.y > 0.0 {
            self.grounded = false;
        }
    }
}

impl CharacterFacade for Pawn {
    fn is_falling(&self) -> bool {
        !self.grounded
    }

    fn jump(&mut self) {
        if self.grounded {
            self.velocity.y = self.jump_impulse;
            self.grounded = false;
        }
    }

    fn add_movement_input(&mut self, direction: Vec3, scale: f32) {
        self.pending_input += direction * scale;
    }

    fn set_max_walk_speed(&mut self, speed: f32) {
        self.max_walk_speed = speed;
    }

    fn control_rotation(&self) -> Rotator {
        self.control.rotator()
    }

    fn add_controller_yaw_input(&mut self, value: f32) {
        self.control.add_yaw(value);
    }

    fn add_controller_pitch_input(&mut self, value: f32) {
        self.control.add_pitch(value);
    }

    fn bound_perspective(&self) -> Option<Rotator> {
        self.perspective
            .is_bound()
            .then(|| self.perspective.perspective())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jump_leaves_ground_and_lands() {
        let mut pawn = Pawn::new(Vec3::ZERO, 0.0);
        assert!(!pawn.is_falling());
        pawn.jump();
        assert!(pawn.is_falling());

        let mut frames = 0;
        while pawn.is_falling() {
            pawn.integrate(1.0 / 60.0);
            frames += 1;
            assert!(frames < 600, "pawn never landed");
        }
        assert_eq!(pawn.position.y, 0.0);
        // 2 * 700 / 980 s of flight at 60 Hz.
        assert!((80..=90).contains(&frames));
    }

    #[test]
    fn movement_input_is_scaled_by_max_speed() {
        let mut pawn = Pawn::new(Vec3::ZERO, 0.0);
        pawn.set_max_walk_speed(200.0);
        pawn.add_movement_input(Vec3::X, 1.0);
        pawn.add_movement_input(Vec3::Z, 1.0);
        pawn.integrate(0.5);

        let horizontal = Vec3::new(pawn.velocity.x, 0.0, pawn.velocity.z);
        assert!((horizontal.length() - 200.0).abs() < 1e-3);

        // Input is consumed by the integration.
        pawn.integrate(0.5);
        assert_eq!(pawn.velocity, Vec3::ZERO);
    }

    #[test]
    fn bound_perspective_is_reported_blended() {
        let mut pawn = Pawn::new(Vec3::ZERO, 1.0);
        assert_eq!(pawn.bound_perspective(), None);
        pawn.perspective.set_perspective(Rotator::from_yaw(90.0));
        pawn.perspective.tick(1.0);
        assert_eq!(pawn.bound_perspective(), Some(Rotator::from_yaw(90.0)));
    }
}
