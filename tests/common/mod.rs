#![allow(dead_code)]

use ambient_fx::{
    app::{settings::RuntimeSettings, state::AppState},
    cli::{Cli, EffectArg},
    fx::surface::Viewport,
};
use ratatui::buffer::Buffer;

pub fn quiet_cli() -> Cli {
    Cli {
        effect: None,
        intensity: None,
        sound: false,
        fps: 60,
        no_flash: false,
        seed: Some(1234),
        no_hint: true,
        ephemeral: true,
        log_file: None,
    }
}

pub fn fresh_state(effect: EffectArg, intensity: f32, cols: u16, rows: u16) -> AppState {
    let settings = RuntimeSettings {
        effect,
        intensity,
        ..RuntimeSettings::default()
    };
    AppState::new(&quiet_cli(), settings, None, Viewport::for_cells(cols, rows))
}

pub fn rgb_sum(color: ratatui::style::Color) -> u32 {
    match color {
        ratatui::style::Color::Rgb(r, g, b) => u32::from(r) + u32::from(g) + u32::from(b),
        _ => 0,
    }
}

/// Total brightness of every half block in the buffer.
pub fn brightness(buffer: &Buffer) -> u64 {
    buffer
        .content()
        .iter()
        .map(|cell| u64::from(rgb_sum(cell.fg) + rgb_sum(cell.bg)))
        .sum()
}
