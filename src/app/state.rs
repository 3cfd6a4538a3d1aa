use std::path::PathBuf;

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

use crate::{
    app::{
        events::{AppEvent, Epoch},
        mount::Mount,
        settings::{RuntimeSettings, save_runtime_settings},
    },
    cli::{Cli, EffectArg},
    fx::{
        Scene,
        audio::TerminalBell,
        effect_rng,
        heat::HeatShimmer,
        surface::{RasterSurface, Surface, Viewport},
        thunder::ThunderStorm,
    },
};

pub const INTENSITY_STEP: f32 = 0.1;
const MAX_KEYBOARD_INTENSITY: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Running,
    Quit,
}

#[derive(Debug)]
pub struct AppState {
    pub mode: AppMode,
    pub running: bool,
    pub settings: RuntimeSettings,
    pub surface: RasterSurface,
    pub show_hint: bool,
    settings_path: Option<PathBuf>,
    mount: Option<Mount>,
    last_epoch: Epoch,
    fps: u8,
    seed: Option<u64>,
}

impl AppState {
    pub fn new(
        cli: &Cli,
        settings: RuntimeSettings,
        settings_path: Option<PathBuf>,
        viewport: Viewport,
    ) -> Self {
        Self {
            mode: AppMode::Running,
            running: true,
            settings,
            surface: RasterSurface::new(viewport),
            show_hint: !cli.no_hint,
            settings_path,
            mount: None,
            last_epoch: 0,
            fps: cli.fps,
            seed: cli.seed,
        }
    }

    #[must_use]
    pub fn mount(&self) -> Option<&Mount> {
        self.mount.as_ref()
    }

    /// Whether the flash overlay should be painted this frame.
    #[must_use]
    pub fn flash_visible(&self) -> bool {
        self.settings.flash && self.mount.as_ref().is_some_and(Mount::flash_active)
    }

    pub async fn handle_event(&mut self, event: AppEvent, tx: &mpsc::Sender<AppEvent>) -> Result<()> {
        match event {
            AppEvent::Bootstrap => self.mount_effect(tx),
            AppEvent::TickFrame { epoch } => {
                if let Some(mount) = self.mount.as_mut().filter(|m| m.epoch() == epoch) {
                    mount.frame(&mut self.surface);
                }
            }
            AppEvent::StrikeCheck { epoch } => {
                let viewport = self.surface.viewport();
                if let Some(mount) = self.mount.as_mut().filter(|m| m.epoch() == epoch) {
                    mount.strike_check(viewport, tx);
                }
            }
            AppEvent::FlashClear { epoch, generation } => {
                if let Some(mount) = self.mount.as_mut().filter(|m| m.epoch() == epoch) {
                    mount.clear_flash(generation);
                }
            }
            AppEvent::Input(event) => self.handle_input(event, tx).await?,
            AppEvent::Quit => {
                self.teardown();
                self.mode = AppMode::Quit;
            }
        }

        Ok(())
    }

    /// Replaces any current mount with a fresh instance of the selected
    /// effect on a blank surface. Skipped while the surface has no area.
    pub fn mount_effect(&mut self, tx: &mpsc::Sender<AppEvent>) {
        self.teardown();
        let viewport = self.surface.viewport();
        if viewport.is_empty() {
            log::debug!("surface has no area yet; deferring mount");
            return;
        }
        self.surface.clear();
        self.last_epoch += 1;
        let scene = self.build_scene(self.last_epoch, viewport);
        self.mount = Some(Mount::start(self.last_epoch, scene, tx, self.fps));
    }

    pub fn teardown(&mut self) {
        if let Some(mut mount) = self.mount.take() {
            mount.teardown();
        }
    }

    fn build_scene(&self, epoch: Epoch, viewport: Viewport) -> Scene {
        let rng = effect_rng(self.seed.map(|seed| seed.wrapping_add(epoch)));
        let RuntimeSettings {
            effect,
            intensity,
            with_sound,
            ..
        } = self.settings;
        match effect {
            EffectArg::Heat => Scene::Heat(HeatShimmer::new(intensity, viewport, rng)),
            EffectArg::Thunder => {
                let storm = ThunderStorm::new(intensity, with_sound, viewport, rng);
                Scene::Thunder(if with_sound {
                    storm.with_audio(Box::new(TerminalBell))
                } else {
                    storm
                })
            }
        }
    }

    async fn handle_input(&mut self, event: Event, tx: &mpsc::Sender<AppEvent>) -> Result<()> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if is_interrupt(key) {
                    tx.send(AppEvent::Quit).await?;
                    return Ok(());
                }
                match key.code {
                    KeyCode::Esc | KeyCode::Char('q') => {
                        tx.send(AppEvent::Quit).await?;
                    }
                    KeyCode::Char('h') => self.switch_effect(EffectArg::Heat, tx),
                    KeyCode::Char('t') => self.switch_effect(EffectArg::Thunder, tx),
                    KeyCode::Char('+' | '=') => self.adjust_intensity(INTENSITY_STEP, tx),
                    KeyCode::Char('-') => self.adjust_intensity(-INTENSITY_STEP, tx),
                    KeyCode::Char('s') => {
                        self.settings.with_sound = !self.settings.with_sound;
                        self.settings_changed(tx);
                    }
                    KeyCode::Char('?') => self.show_hint = !self.show_hint,
                    _ => {}
                }
            }
            Event::Resize(cols, rows) => self.resize(Viewport::for_cells(cols, rows), tx),
            _ => {}
        }

        Ok(())
    }

    /// Follows the viewport. Particles keep their positions; a mount that
    /// was deferred for lack of area happens now.
    fn resize(&mut self, viewport: Viewport, tx: &mpsc::Sender<AppEvent>) {
        self.surface.resize(viewport);
        if self.mount.is_none() && self.mode == AppMode::Running {
            self.mount_effect(tx);
        }
    }

    fn switch_effect(&mut self, effect: EffectArg, tx: &mpsc::Sender<AppEvent>) {
        if self.settings.effect == effect {
            return;
        }
        self.settings.effect = effect;
        self.settings_changed(tx);
    }

    fn adjust_intensity(&mut self, delta: f32, tx: &mpsc::Sender<AppEvent>) {
        let next = ((self.settings.intensity + delta) * 10.0).round() / 10.0;
        let next = next.clamp(0.0, MAX_KEYBOARD_INTENSITY);
        if (next - self.settings.intensity).abs() < f32::EPSILON {
            return;
        }
        self.settings.intensity = next;
        self.settings_changed(tx);
    }

    fn settings_changed(&mut self, tx: &mpsc::Sender<AppEvent>) {
        self.mount_effect(tx);
        self.persist_settings();
    }

    fn persist_settings(&self) {
        let Some(path) = &self.settings_path else {
            return;
        };
        if let Err(err) = save_runtime_settings(path, &self.settings) {
            log::warn!("saving settings failed: {err}");
        }
    }
}

fn is_interrupt(key: KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c'))
}

#[cfg(test)]
mod tests;
