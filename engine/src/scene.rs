//! Live state of the decorative scene: placed stars, the scene clock, and the
//! free-look camera.

use std::f32::consts::TAU;
use std::time::Duration;

use dream_types::{CameraSpec, SceneSpec, Star, Vec3};

/// Yaw change per terminal column of mouse travel, in radians.
pub const YAW_PER_COLUMN: f32 = 0.02;
/// Pitch change per terminal row. Rows are about twice as tall as columns.
pub const PITCH_PER_ROW: f32 = 0.04;
/// Rotation per arrow key press.
pub const KEY_LOOK_STEP: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerLock {
    #[default]
    Released,
    Locked,
}

/// A point projected onto the view plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    /// Horizontal position in `[-1, 1]`, right is positive.
    pub ndc_x: f32,
    /// Vertical position in `[-1, 1]`, up is positive.
    pub ndc_y: f32,
    /// Distance along the view direction.
    pub depth: f32,
}

#[derive(Debug, Clone)]
pub struct SceneState {
    stars: Vec<Star>,
    elapsed: Duration,
    yaw: f32,
    pitch: f32,
    pointer: PointerLock,
    last_pointer: Option<(u16, u16)>,
}

impl SceneState {
    #[must_use]
    pub fn new(stars: Vec<Star>) -> Self {
        Self {
            stars,
            elapsed: Duration::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            pointer: PointerLock::Released,
            last_pointer: None,
        }
    }

    /// Scatter stars with `rand`.
    #[must_use]
    pub fn generate(spec: &SceneSpec) -> Self {
        Self::new(spec.stars.place(rand::random::<f32>))
    }

    #[must_use]
    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    #[must_use]
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    pub fn advance(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    #[must_use]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    #[must_use]
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    #[must_use]
    pub fn pointer(&self) -> PointerLock {
        self.pointer
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.pointer == PointerLock::Locked
    }

    pub fn lock_pointer(&mut self, column: u16, row: u16) {
        if self.pointer == PointerLock::Released {
            tracing::debug!("Pointer locked");
        }
        self.pointer = PointerLock::Locked;
        self.last_pointer = Some((column, row));
    }

    pub fn release_pointer(&mut self) {
        if self.pointer == PointerLock::Locked {
            tracing::debug!("Pointer released");
        }
        self.pointer = PointerLock::Released;
        self.last_pointer = None;
    }

    /// Rotate by the mouse travel since the last reported position.
    ///
    /// Ignored unless the pointer is locked.
    pub fn pointer_moved(&mut self, column: u16, row: u16, camera: &CameraSpec) {
        if self.pointer != PointerLock::Locked {
            return;
        }
        if let Some((last_col, last_row)) = self.last_pointer {
            let dx = f32::from(column) - f32::from(last_col);
            let dy = f32::from(row) - f32::from(last_row);
            // Moving the mouse right turns right; moving it down looks down.
            self.look(-dx * YAW_PER_COLUMN, -dy * PITCH_PER_ROW, camera);
        }
        self.last_pointer = Some((column, row));
    }

    /// Rotate the camera. Positive yaw turns left, positive pitch looks up.
    pub fn look(&mut self, d_yaw: f32, d_pitch: f32, camera: &CameraSpec) {
        self.yaw = (self.yaw + d_yaw).rem_euclid(TAU);
        self.pitch = (self.pitch + d_pitch).clamp(-camera.max_pitch, camera.max_pitch);
    }

    /// `world` expressed in camera space, where the camera looks down `-Z`.
    #[must_use]
    pub fn view_space(&self, camera: &CameraSpec, world: Vec3) -> Vec3 {
        let rel = world - camera.position;

        let (sin_y, cos_y) = self.yaw.sin_cos();
        let x1 = rel.x * cos_y - rel.z * sin_y;
        let z1 = rel.x * sin_y + rel.z * cos_y;

        let (sin_p, cos_p) = self.pitch.sin_cos();
        let y2 = rel.y * cos_p + z1 * sin_p;
        let z2 = z1 * cos_p - rel.y * sin_p;

        Vec3::new(x1, y2, z2)
    }

    /// Perspective-project `world` for a viewport `aspect` units wide per unit
    /// tall. Points behind the camera or outside the frustum yield `None`.
    #[must_use]
    pub fn project(&self, camera: &CameraSpec, world: Vec3, aspect: f32) -> Option<Projected> {
        let view = self.view_space(camera, world);
        let depth = -view.z;
        if depth <= NEAR_PLANE {
            return None;
        }
        let scale = camera.half_fov_tan() * depth;
        let ndc_y = view.y / scale;
        let ndc_x = view.x / (scale * aspect.max(f32::EPSILON));
        if ndc_x.abs() > 1.0 || ndc_y.abs() > 1.0 {
            return None;
        }
        Some(Projected {
            ndc_x,
            ndc_y,
            depth,
        })
    }

    /// Size in view-plane units of an object of `radius` at `depth`.
    #[must_use]
    pub fn apparent_radius(camera: &CameraSpec, radius: f32, depth: f32) -> f32 {
        if depth <= NEAR_PLANE {
            return 0.0;
        }
        radius / (camera.half_fov_tan() * depth)
    }
}

const NEAR_PLANE: f32 = 0.1;
