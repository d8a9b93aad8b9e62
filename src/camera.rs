use glam::Vec3;

/// Euler rotation in degrees. Y is up; yaw turns around Y.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rotator {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl Rotator {
    pub const ZERO: Self = Self {
        pitch: 0.0,
        yaw: 0.0,
        roll: 0.0,
    };

    pub fn from_yaw(yaw: f32) -> Self {
        Self { yaw, ..Self::ZERO }
    }

    /// Horizontal forward and right unit vectors for this rotation's yaw.
    /// Pitch and roll are ignored so movement stays on the ground plane.
    pub fn yaw_basis(&self) -> (Vec3, Vec3) {
        let yaw_rad = self.yaw.to_radians();
        let forward = Vec3::new(yaw_rad.cos(), 0.0, yaw_rad.sin()).normalize();
        let right = forward.cross(Vec3::Y).normalize();
        (forward, right)
    }

    /// Blend toward `to` by `t` in `[0, 1]`, taking the short way round.
    pub fn lerp(&self, to: Rotator, t: f32) -> Rotator {
        let t = t.clamp(0.0, 1.0);
        Rotator {
            pitch: self.pitch + shortest_arc(self.pitch, to.pitch) * t,
            yaw: self.yaw + shortest_arc(self.yaw, to.yaw) * t,
            roll: self.roll + shortest_arc(self.roll, to.roll) * t,
        }
    }
}

fn shortest_arc(from: f32, to: f32) -> f32 {
    (to - from + 180.0).rem_euclid(360.0) - 180.0
}

/// Controller rotation driven by look input.
#[derive(Debug, Clone, Copy)]
pub struct ControlRotation {
    pub yaw: f32,
    pub pitch: f32,
    pub sensitivity: f32,
}

impl ControlRotation {
    pub fn new() -> Self {
        Self {
            yaw: -90.0_f32,
            pitch: 0.0,
            sensitivity: 1.0,
        }
    }

    pub fn add_yaw(&mut self, value: f32) {
        self.yaw += value * self.sensitivity;
    }

    pub fn add_pitch(&mut self, value: f32) {
        self.pitch -= value * self.sensitivity;
        self.pitch = self.pitch.clamp(-89.0, 89.0);
    }

    pub fn rotator(&self) -> Rotator {
        Rotator {
            pitch: self.pitch,
            yaw: self.yaw,
            roll: 0.0,
        }
    }
}

impl Default for ControlRotation {
    fn default() -> Self {
        Self::new()
    }
}

/// Blends between a default perspective and an externally bound one
/// (a lock-on target, a cutscene camera, ...).
///
/// Binding a perspective restarts the interpolation; [`perspective`] eases
/// from the default rotation to the bound one over `interpolation_time`
/// seconds as [`tick`] advances.
///
/// [`perspective`]: PerspectiveManager::perspective
/// [`tick`]: PerspectiveManager::tick
#[derive(Debug, Clone)]
pub struct PerspectiveManager {
    pub interpolation_time: f32,
    current_interpolation: f32,
    default_perspective: Rotator,
    bound: Option<Rotator>,
}

impl PerspectiveManager {
    pub fn new(interpolation_time: f32) -> Self {
        Self {
            interpolation_time,
            current_interpolation: 0.0,
            default_perspective: Rotator::ZERO,
            bound: None,
        }
    }

    pub fn tick(&mut self, dt: f32) {
        if self.bound.is_some() {
            self.current_interpolation =
                (self.current_interpolation + dt).min(self.interpolation_time.max(0.0));
        }
    }

    pub fn set_perspective(&mut self, rotation: Rotator) {
        self.bound = Some(rotation);
        self.current_interpolation = 0.0;
    }

    pub fn set_default_perspective(&mut self, rotation: Rotator) {
        self.default_perspective = rotation;
    }

    pub fn reset_perspective(&mut self) {
        self.bound = None;
    }

    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    pub fn base_perspective(&self) -> Rotator {
        self.default_perspective
    }

    /// Blend factor in `[0, 1]`; 1 once the interpolation has finished.
    pub fn blend(&self) -> f32 {
        if self.interpolation_time <= 0.0 {
            1.0
        } else {
            (self.current_interpolation / self.interpolation_time).clamp(0.0, 1.0)
        }
    }

    /// Current blended rotation, or the default when nothing is bound.
    pub fn perspective(&self) -> Rotator {
        match self.bound {
            Some(target) => self.default_perspective.lerp(target, self.blend()),
            None => self.default_perspective,
        }
    }
}
