use glam::Vec3;

use super::CharacterFacade;
use crate::camera::Rotator;

/// Facade double that records every outbound call.
#[derive(Debug, Default)]
pub(crate) struct RecordingFacade {
    pub falling: bool,
    pub jumps: usize,
    pub movement: Vec<(Vec3, f32)>,
    pub max_speed_calls: Vec<f32>,
    pub rotation: Rotator,
    pub yaw_inputs: Vec<f32>,
    pub pitch_inputs: Vec<f32>,
    pub perspective: Option<Rotator>,
}

impl CharacterFacade for RecordingFacade {
    fn is_falling(&self) -> bool {
        self.falling
    }

    fn jump(&mut self) {
        self.jumps += 1;
    }

    fn add_movement_input(&mut self, direction: Vec3, scale: f32) {
        self.movement.push((direction, scale));
    }

    fn set_max_walk_speed(&mut self, speed: f32) {
        self.max_speed_calls.push(speed);
    }

    fn control_rotation(&self) -> Rotator {
        self.rotation
    }

    fn add_controller_yaw_input(&mut self, value: f32) {
        self.yaw_inputs.push(value);
    }

    fn add_controller_pitch_input(&mut self, value: f32) {
        self.pitch_inputs.push(value);
    }

    fn bound_perspective(&self) -> Option<Rotator> {
        self.perspective
    }
}
