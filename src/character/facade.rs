use glam::Vec3;

use crate::camera::Rotator;

/// What the state machine needs from the character that owns it.
///
/// The machine pushes movement and jump requests through these calls and
/// reads back grounded/falling status and view rotation. Physics integration
/// and rendering stay on the implementor's side.
pub trait CharacterFacade {
    /// Whether the character is currently airborne and descending or rising
    /// under gravity.
    fn is_falling(&self) -> bool;

    /// Request a jump impulse.
    fn jump(&mut self);

    /// Accumulate movement input along a world-space direction.
    fn add_movement_input(&mut self, direction: Vec3, scale: f32);

    fn set_max_walk_speed(&mut self, speed: f32);

    fn control_rotation(&self) -> Rotator;

    fn add_controller_yaw_input(&mut self, value: f32);

    fn add_controller_pitch_input(&mut self, value: f32);

    /// Rotation of an externally bound perspective, if one is active. While
    /// bound, it replaces the controller rotation for movement and look
    /// input is ignored.
    fn bound_perspective(&self) -> Option<Rotator>;
}
