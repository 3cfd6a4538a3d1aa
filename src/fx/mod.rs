pub mod audio;
pub mod heat;
pub mod render_loop;
pub mod surface;
pub mod thunder;

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::fx::{
    heat::HeatShimmer,
    surface::{Surface, Viewport},
    thunder::ThunderStorm,
};

/// A per-frame animated effect: advance state, then paint it.
pub trait Animate {
    fn update(&mut self, viewport: Viewport);
    fn draw(&self, surface: &mut dyn Surface);
}

/// The effect instance owned by one mount.
#[derive(Debug)]
pub enum Scene {
    Heat(HeatShimmer),
    Thunder(ThunderStorm),
}

impl Scene {
    #[must_use]
    pub fn as_thunder_mut(&mut self) -> Option<&mut ThunderStorm> {
        match self {
            Self::Thunder(storm) => Some(storm),
            Self::Heat(_) => None,
        }
    }

    #[must_use]
    pub fn as_thunder(&self) -> Option<&ThunderStorm> {
        match self {
            Self::Thunder(storm) => Some(storm),
            Self::Heat(_) => None,
        }
    }
}

impl Animate for Scene {
    fn update(&mut self, viewport: Viewport) {
        match self {
            Self::Heat(heat) => heat.update(viewport),
            Self::Thunder(storm) => storm.update(viewport),
        }
    }

    fn draw(&self, surface: &mut dyn Surface) {
        match self {
            Self::Heat(heat) => heat.draw(surface),
            Self::Thunder(storm) => storm.draw(surface),
        }
    }
}

/// Seeded when a seed is given so runs can be replayed.
#[must_use]
pub fn effect_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Uniform position along an axis of length `extent`; zero when the axis
/// has no length.
pub(crate) fn random_coord(rng: &mut impl Rng, extent: f32) -> f32 {
    if extent > 0.0 {
        rng.random_range(0.0..extent)
    } else {
        0.0
    }
}
