//! Rising heat blobs under a slowly turning fan of sun rays.

use std::f32::consts::TAU;

use rand::{Rng, rngs::StdRng};

use crate::fx::{
    Animate, random_coord,
    surface::{Point, Rgba, Surface, Viewport},
};

pub const POOL_SIZE: usize = 30;
pub const OPACITY_DECAY: f32 = 0.001;
pub const RESPAWN_DEPTH: f32 = 20.0;
pub const RAY_COUNT: usize = 12;
pub const RAY_SPIN: f32 = 0.002;
const WOBBLE_AMPLITUDE: f32 = 10.0;
const MAX_OPACITY: f32 = 0.3;

const BLOB_CORE: Rgba = Rgba::new(255, 160, 60, 0.0);
const BLOB_EDGE: Rgba = Rgba::new(255, 100, 0, 0.0);
const RAY: Rgba = Rgba::new(255, 220, 150, 0.0);
const WARM_TINT: Rgba = Rgba::new(255, 120, 20, 0.0);
const HAZE_TINT: Rgba = Rgba::new(255, 200, 130, 0.0);

#[derive(Debug, Clone, PartialEq)]
pub struct HeatParticle {
    pub x: f32,
    pub y: f32,
    pub speed: f32,
    pub radius: f32,
    pub opacity: f32,
    pub wobble: f32,
    pub wobble_speed: f32,
}

impl HeatParticle {
    fn spawn(rng: &mut impl Rng, viewport: Viewport) -> Self {
        Self {
            x: random_coord(rng, viewport.width),
            y: random_coord(rng, viewport.height),
            speed: rng.random_range(0.5..2.0),
            radius: rng.random_range(20.0..60.0),
            opacity: fresh_opacity(rng),
            wobble: rng.random_range(0.0..TAU),
            wobble_speed: rng.random_range(0.02..0.05),
        }
    }

    /// Puts the particle back just below the bottom edge, reusing its slot.
    fn respawn(&mut self, rng: &mut impl Rng, viewport: Viewport) {
        self.x = random_coord(rng, viewport.width);
        self.y = viewport.height + RESPAWN_DEPTH;
        self.opacity = fresh_opacity(rng);
        self.wobble = rng.random_range(0.0..TAU);
    }

    #[must_use]
    pub fn exhausted(&self) -> bool {
        self.y < -self.radius || self.opacity <= 0.0
    }

    /// Where the blob is painted this frame.
    #[must_use]
    pub fn draw_center(&self) -> Point {
        Point::new(self.x + self.wobble.sin() * WOBBLE_AMPLITUDE, self.y)
    }
}

fn fresh_opacity(rng: &mut impl Rng) -> f32 {
    rng.random_range(0.1..MAX_OPACITY)
}

#[derive(Debug)]
pub struct HeatShimmer {
    intensity: f32,
    particles: Vec<HeatParticle>,
    ray_angle: f32,
    rng: StdRng,
}

impl HeatShimmer {
    #[must_use]
    pub fn new(intensity: f32, viewport: Viewport, mut rng: StdRng) -> Self {
        let particles = (0..POOL_SIZE)
            .map(|_| HeatParticle::spawn(&mut rng, viewport))
            .collect();
        Self {
            intensity,
            particles,
            ray_angle: 0.0,
            rng,
        }
    }

    #[must_use]
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    #[must_use]
    pub fn particles(&self) -> &[HeatParticle] {
        &self.particles
    }

    #[must_use]
    pub fn ray_angle(&self) -> f32 {
        self.ray_angle
    }

    fn ray_origin(viewport: Viewport) -> Point {
        Point::new(viewport.width * 0.85, viewport.height * 0.1)
    }
}

impl Animate for HeatShimmer {
    fn update(&mut self, viewport: Viewport) {
        for particle in &mut self.particles {
            particle.y -= particle.speed * self.intensity;
            particle.wobble += particle.wobble_speed;
            particle.opacity -= OPACITY_DECAY;
            if particle.exhausted() {
                particle.respawn(&mut self.rng, viewport);
            }
        }
        self.ray_angle = (self.ray_angle + RAY_SPIN) % TAU;
    }

    /// Paints over the previous frame; the translucent tints build up into
    /// a warm trail. The host clears the surface when an effect is mounted.
    fn draw(&self, surface: &mut dyn Surface) {
        let viewport = surface.viewport();

        for particle in &self.particles {
            surface.radial_gradient(
                particle.draw_center(),
                particle.radius,
                BLOB_CORE.with_alpha(particle.opacity),
                BLOB_EDGE,
            );
        }

        let origin = Self::ray_origin(viewport);
        let reach = viewport.width.max(viewport.height);
        let step = TAU / RAY_COUNT as f32;
        let ray = RAY.with_alpha(0.05 * self.intensity);
        for i in 0..RAY_COUNT {
            let from = self.ray_angle + step * i as f32;
            surface.wedge(origin, from, from + step * 0.3, reach, ray);
        }

        surface.fill(WARM_TINT.with_alpha(0.02 * self.intensity));
        surface.fill(HAZE_TINT.with_alpha(0.01));
    }
}
