#![allow(clippy::missing_errors_doc)]

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

pub const DEFAULT_INTENSITY: f32 = 0.5;

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EffectArg {
    #[default]
    #[serde(alias = "heat")]
    Heat,
    #[serde(alias = "thunder", alias = "storm")]
    Thunder,
}

impl EffectArg {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Heat => "heat shimmer",
            Self::Thunder => "thunderstorm",
        }
    }
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Parser, Clone)]
#[command(
    name = "ambient-fx",
    version,
    about = "Heat shimmer and thunderstorm effects for the terminal"
)]
pub struct Cli {
    /// Effect to show (default: last used, else heat)
    #[arg(value_enum)]
    pub effect: Option<EffectArg>,

    /// Effect intensity; 0..1 is the intended range, larger values exaggerate
    #[arg(long)]
    pub intensity: Option<f32>,

    /// Ring the terminal bell on lightning strikes
    #[arg(long)]
    pub sound: bool,

    /// Target FPS (15..120)
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u8).range(15..=120))]
    pub fps: u8,

    /// Disable the lightning flash overlay
    #[arg(long)]
    pub no_flash: bool,

    /// Seed the particle generator for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Hide the key hint line
    #[arg(long)]
    pub no_hint: bool,

    /// Neither read nor write the settings file
    #[arg(long)]
    pub ephemeral: bool,

    /// Write logs to this file (filter with RUST_LOG)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    #[must_use]
    pub fn default_effect(&self) -> EffectArg {
        self.effect.unwrap_or_default()
    }

    #[must_use]
    pub fn default_intensity(&self) -> f32 {
        self.intensity.unwrap_or(DEFAULT_INTENSITY)
    }
}
