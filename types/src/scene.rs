//! Static parameters of the decorative scene.
//!
//! Everything here is fixed at construction. The only value that changes over
//! time is the guiding light's emissive intensity, computed from elapsed time.

use std::f32::consts::{PI, TAU};
use std::ops::{Add, Mul, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Point on a sphere of radius `r` from polar angle `phi` and azimuth `theta`.
    #[must_use]
    pub fn from_spherical(r: f32, phi: f32, theta: f32) -> Self {
        let sin_phi = phi.sin();
        Self {
            x: r * sin_phi * theta.sin(),
            y: r * phi.cos(),
            z: r * sin_phi * theta.cos(),
        }
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const CYAN: Self = Self(0, 255, 255);

    /// Multiply each channel by `factor`, saturating at 255.
    #[must_use]
    pub fn scale(self, factor: f32) -> Self {
        let channel = |c: u8| (f32::from(c) * factor.max(0.0)).round().min(255.0) as u8;
        Self(channel(self.0), channel(self.1), channel(self.2))
    }

    /// Linear blend toward `other`; `t = 0` keeps `self`, `t = 1` yields `other`.
    #[must_use]
    pub fn mix(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let channel = |a: u8, b: u8| {
            (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round() as u8
        };
        Self(
            channel(self.0, other.0),
            channel(self.1, other.1),
            channel(self.2, other.2),
        )
    }

    /// HSL to RGB, all components in `[0, 1]`.
    #[must_use]
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let s = saturation.clamp(0.0, 1.0);
        let l = lightness.clamp(0.0, 1.0);
        if s == 0.0 {
            let v = (l * 255.0).round() as u8;
            return Self(v, v, v);
        }
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        let h = hue.rem_euclid(1.0);
        let channel = |t: f32| {
            let t = t.rem_euclid(1.0);
            let v = if t < 1.0 / 6.0 {
                p + (q - p) * 6.0 * t
            } else if t < 0.5 {
                q
            } else if t < 2.0 / 3.0 {
                p + (q - p) * (2.0 / 3.0 - t) * 6.0
            } else {
                p
            };
            (v * 255.0).round() as u8
        };
        Self(channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0))
    }
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

// ============================================================================
// Components
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSpec {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub position: Vec3,
    /// Pitch limit for free-look, in radians either side of the horizon.
    pub max_pitch: f32,
}

impl CameraSpec {
    /// `tan(fov / 2)`, the projection scale at unit depth.
    #[must_use]
    pub fn half_fov_tan(&self) -> f32 {
        (self.fov_degrees.to_radians() / 2.0).tan()
    }
}

impl Default for CameraSpec {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            position: Vec3::new(0.0, 0.0, 3.0),
            max_pitch: PI / 2.0,
        }
    }
}

/// Point light with physically based distance falloff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLightSpec {
    pub position: Vec3,
    pub color: Rgb,
    pub intensity: f32,
    /// Cutoff distance; contribution is zero at and beyond it.
    pub distance: f32,
    pub decay: f32,
}

impl PointLightSpec {
    /// Light reaching a point `d` units away, before color.
    #[must_use]
    pub fn attenuation(&self, d: f32) -> f32 {
        let d = d.max(0.0);
        if self.distance > 0.0 && d >= self.distance {
            return 0.0;
        }
        let mut falloff = 1.0 / d.powf(self.decay).max(0.01);
        if self.distance > 0.0 {
            let ratio = (d / self.distance).powi(4);
            let window = (1.0 - ratio).clamp(0.0, 1.0);
            falloff *= window * window;
        }
        self.intensity * falloff
    }
}

impl Default for PointLightSpec {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            color: Rgb::CYAN,
            intensity: 50.0,
            distance: 100.0,
            decay: 2.0,
        }
    }
}

/// Distance fog ramping from clear at `near` to opaque at `far`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FogSpec {
    pub color: Rgb,
    pub near: f32,
    pub far: f32,
}

impl FogSpec {
    /// Fog amount at `depth`: 0 at or before `near`, 1 at or beyond `far`.
    #[must_use]
    pub fn factor(&self, depth: f32) -> f32 {
        smoothstep(self.near, self.far, depth)
    }

    #[must_use]
    pub fn apply(&self, color: Rgb, depth: f32) -> Rgb {
        color.mix(self.color, self.factor(depth))
    }
}

impl Default for FogSpec {
    fn default() -> Self {
        Self {
            color: Rgb(0x03, 0x00, 0x0a),
            near: 10.0,
            far: 40.0,
        }
    }
}

/// One placed star.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub position: Vec3,
    pub size: f32,
    pub color: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarfieldSpec {
    pub count: usize,
    /// Inner radius of the star shell.
    pub radius: f32,
    /// Thickness of the star shell.
    pub depth: f32,
    /// Size multiplier.
    pub factor: f32,
    pub saturation: f32,
    /// Soften star edges.
    pub fade: bool,
    /// Twinkle rate multiplier.
    pub speed: f32,
}

impl StarfieldSpec {
    /// Place `count` stars, drawing uniform samples in `[0, 1)` from `sample`.
    ///
    /// Radii start at `radius + depth` and shrink by at most `depth / count`
    /// per star, so every star lies within `[radius, radius + depth]`.
    pub fn place(&self, mut sample: impl FnMut() -> f32) -> Vec<Star> {
        let mut stars = Vec::with_capacity(self.count);
        if self.count == 0 {
            return stars;
        }
        let increment = self.depth / self.count as f32;
        let mut r = self.radius + self.depth;
        for i in 0..self.count {
            r -= increment * sample().clamp(0.0, 1.0);
            let phi = (1.0 - sample().clamp(0.0, 1.0) * 2.0).acos();
            let theta = sample().clamp(0.0, 1.0) * TAU;
            let position = Vec3::from_spherical(r, phi, theta);
            let hue = i as f32 / self.count as f32;
            let color = Rgb::from_hsl(hue, self.saturation, 0.9);
            let size = (0.5 + 0.5 * sample().clamp(0.0, 1.0)) * self.factor;
            stars.push(Star {
                position,
                size,
                color,
            });
        }
        stars
    }

    /// Global twinkle scale in `[0.5, 1.0]`.
    #[must_use]
    pub fn twinkle(&self, elapsed_secs: f32) -> f32 {
        (3.0 + (elapsed_secs * self.speed + 100.0).sin()) / 4.0
    }
}

impl Default for StarfieldSpec {
    fn default() -> Self {
        Self {
            count: 5000,
            radius: 150.0,
            depth: 50.0,
            factor: 5.0,
            saturation: 0.0,
            fade: true,
            speed: 1.0,
        }
    }
}

/// The single animated emissive object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuidingLightSpec {
    pub position: Vec3,
    pub radius: f32,
    pub color: Rgb,
    pub pulse_amplitude: f32,
    pub pulse_offset: f32,
    /// Angular rate in radians per second.
    pub pulse_rate: f32,
}

impl GuidingLightSpec {
    /// `sin(rate * t) * amplitude + offset`.
    #[must_use]
    pub fn emissive_intensity(&self, elapsed_secs: f32) -> f32 {
        (elapsed_secs * self.pulse_rate).sin() * self.pulse_amplitude + self.pulse_offset
    }
}

impl Default for GuidingLightSpec {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, -20.0),
            radius: 0.5,
            color: Rgb::CYAN,
            pulse_amplitude: 0.5,
            pulse_offset: 1.5,
            pulse_rate: 2.0,
        }
    }
}

/// The whole composition.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SceneSpec {
    pub camera: CameraSpec,
    pub light: PointLightSpec,
    pub fog: FogSpec,
    pub stars: StarfieldSpec,
    pub guide: GuidingLightSpec,
}
