//! Drifting storm clouds, branching lightning and the screen flash.

use std::time::Duration;

use rand::{Rng, rngs::StdRng};

use crate::fx::{
    Animate, random_coord,
    audio::AudioTrigger,
    surface::{Point, Rgba, Surface, Viewport},
};

pub const CLOUD_COUNT: usize = 30;
pub const BOLT_DECAY: f32 = 0.1;
pub const BOLT_LIFETIME_FRAMES: u32 = 10;
pub const FLASH_DURATION: Duration = Duration::from_millis(100);
pub const BASE_STRIKE_PERIOD: Duration = Duration::from_millis(2000);
pub const MIN_STRIKE_PERIOD: Duration = Duration::from_millis(1);
pub const BRANCH_CHANCE: f64 = 0.3;

const BOLT_JITTER: f32 = 30.0;
const BRANCH_JITTER: f32 = 20.0;

const CLOUD: Rgba = Rgba::new(90, 90, 115, 0.0);
const BOLT_GLOW: Rgba = Rgba::new(150, 170, 255, 0.0);
const BOLT_CORE: Rgba = Rgba::new(240, 245, 255, 0.0);

#[derive(Debug, Clone, PartialEq)]
pub struct CloudParticle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub speed: f32,
    pub opacity: f32,
}

impl CloudParticle {
    fn spawn(rng: &mut impl Rng, viewport: Viewport) -> Self {
        Self {
            x: random_coord(rng, viewport.width),
            y: random_coord(rng, viewport.height * 0.3),
            radius: rng.random_range(50.0..150.0),
            speed: rng.random_range(0.1..0.5),
            opacity: rng.random_range(0.05..0.15),
        }
    }

    fn drift(&mut self, viewport: Viewport) {
        self.x += self.speed;
        if self.x - self.radius > viewport.width {
            self.x = -self.radius;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightningBranch {
    pub points: Vec<Point>,
}

impl LightningBranch {
    fn grow(rng: &mut impl Rng, start: Point) -> Self {
        let segments = rng.random_range(3..=5);
        let mut points = Vec::with_capacity(segments + 1);
        points.push(start);
        let mut cursor = start;
        for _ in 0..segments {
            cursor = Point::new(
                cursor.x + rng.random_range(-BRANCH_JITTER..BRANCH_JITTER),
                cursor.y + rng.random_range(15.0..35.0),
            );
            points.push(cursor);
        }
        Self { points }
    }

    #[must_use]
    pub fn segments(&self) -> usize {
        self.points.len().saturating_sub(1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightningBolt {
    pub points: Vec<Point>,
    pub branches: Vec<LightningBranch>,
    frames: u32,
}

impl LightningBolt {
    /// Builds a jagged path from a random spot on the top edge down to a
    /// depth between 30% and 70% of the viewport height.
    pub fn generate(rng: &mut impl Rng, viewport: Viewport) -> Self {
        let origin = Point::new(random_coord(rng, viewport.width), 0.0);
        let target = viewport.height * rng.random_range(0.3..0.7);

        let mut points = vec![origin];
        let mut branches = Vec::new();
        let mut cursor = origin;
        while cursor.y < target {
            cursor = Point::new(
                cursor.x + rng.random_range(-BOLT_JITTER..BOLT_JITTER),
                (cursor.y + rng.random_range(20.0..60.0)).min(target),
            );
            points.push(cursor);
            if points.len() > 2 && rng.random_bool(BRANCH_CHANCE) {
                branches.push(LightningBranch::grow(rng, cursor));
            }
        }

        Self {
            points,
            branches,
            frames: 0,
        }
    }

    #[must_use]
    pub fn origin(&self) -> Point {
        self.points[0]
    }

    #[must_use]
    pub fn endpoint(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    #[must_use]
    pub fn segments(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    #[must_use]
    pub fn frames_lived(&self) -> u32 {
        self.frames
    }

    #[must_use]
    pub fn opacity(&self) -> f32 {
        (1.0 - BOLT_DECAY * self.frames as f32).max(0.0)
    }

    #[must_use]
    pub fn is_spent(&self) -> bool {
        self.frames >= BOLT_LIFETIME_FRAMES
    }

    fn age(&mut self) {
        self.frames = self.frames.saturating_add(1);
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let opacity = self.opacity();
        surface.stroke(&self.points, 12.0, BOLT_GLOW.with_alpha(opacity * 0.35));
        surface.stroke(&self.points, 2.0, BOLT_CORE.with_alpha(opacity));
        for branch in &self.branches {
            surface.stroke(&branch.points, 6.0, BOLT_GLOW.with_alpha(opacity * 0.2));
            surface.stroke(&branch.points, 1.0, BOLT_CORE.with_alpha(opacity * 0.5));
        }
    }
}

/// On/off flash state. Each raise gets a new generation so a clear issued
/// for an older strike cannot end a newer flash early.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlashSignal {
    active: bool,
    generation: u64,
}

impl FlashSignal {
    pub fn raise(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.active = true;
        self.generation
    }

    pub fn clear(&mut self, generation: u64) -> bool {
        if self.active && generation == self.generation {
            self.active = false;
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// Time between strike checks: `2000ms / intensity`, never shorter than
/// [`MIN_STRIKE_PERIOD`]. Non-positive or non-finite intensities never
/// strike, nor do ones so small the period does not fit a `Duration`.
#[must_use]
pub fn strike_period(intensity: f32) -> Option<Duration> {
    if !intensity.is_finite() || intensity <= 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(BASE_STRIKE_PERIOD.as_secs_f64() / f64::from(intensity))
        .ok()
        .map(|period| period.max(MIN_STRIKE_PERIOD))
}

#[derive(Debug)]
pub struct ThunderStorm {
    intensity: f32,
    with_sound: bool,
    clouds: Vec<CloudParticle>,
    bolts: Vec<LightningBolt>,
    flash: FlashSignal,
    audio: Option<Box<dyn AudioTrigger>>,
    rng: StdRng,
}

impl ThunderStorm {
    #[must_use]
    pub fn new(intensity: f32, with_sound: bool, viewport: Viewport, mut rng: StdRng) -> Self {
        let clouds = (0..CLOUD_COUNT)
            .map(|_| CloudParticle::spawn(&mut rng, viewport))
            .collect();
        Self {
            intensity,
            with_sound,
            clouds,
            bolts: Vec::new(),
            flash: FlashSignal::default(),
            audio: None,
            rng,
        }
    }

    #[must_use]
    pub fn with_audio(mut self, audio: Box<dyn AudioTrigger>) -> Self {
        self.audio = Some(audio);
        self
    }

    #[must_use]
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    #[must_use]
    pub fn clouds(&self) -> &[CloudParticle] {
        &self.clouds
    }

    #[must_use]
    pub fn bolts(&self) -> &[LightningBolt] {
        &self.bolts
    }

    #[must_use]
    pub fn flash_active(&self) -> bool {
        self.flash.is_active()
    }

    #[must_use]
    pub fn strike_period(&self) -> Option<Duration> {
        strike_period(self.intensity)
    }

    /// One strike-timer tick: strikes with probability `intensity`.
    /// Returns the flash generation when a strike happened.
    pub fn strike_tick(&mut self, viewport: Viewport) -> Option<u64> {
        let roll: f32 = self.rng.random();
        (roll < self.intensity).then(|| self.strike(viewport))
    }

    /// Adds a fresh bolt, raises the flash and pings the audio hook.
    pub fn strike(&mut self, viewport: Viewport) -> u64 {
        let bolt = LightningBolt::generate(&mut self.rng, viewport);
        log::debug!(
            "lightning strike: {} segments, {} branches",
            bolt.segments(),
            bolt.branches.len()
        );
        self.bolts.push(bolt);
        if self.with_sound
            && let Some(audio) = self.audio.as_mut()
        {
            audio.thunder(self.intensity);
        }
        self.flash.raise()
    }

    pub fn clear_flash(&mut self, generation: u64) -> bool {
        self.flash.clear(generation)
    }
}

impl Animate for ThunderStorm {
    fn update(&mut self, viewport: Viewport) {
        for cloud in &mut self.clouds {
            cloud.drift(viewport);
        }
        for bolt in &mut self.bolts {
            bolt.age();
        }
        self.bolts.retain(|bolt| !bolt.is_spent());
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.clear();
        for cloud in &self.clouds {
            surface.radial_gradient(
                Point::new(cloud.x, cloud.y),
                cloud.radius,
                CLOUD.with_alpha(cloud.opacity),
                CLOUD,
            );
        }
        for bolt in &self.bolts {
            bolt.draw(surface);
        }
    }
}
