use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use super::{AppMode, AppState};
use crate::{
    app::{events::AppEvent, settings::RuntimeSettings},
    cli::EffectArg,
    fx::{
        Scene,
        surface::{Surface, Viewport},
    },
};

fn state(effect: EffectArg, intensity: f32, viewport: Viewport) -> AppState {
    let cli = crate::test_support::test_cli();
    let settings = RuntimeSettings {
        effect,
        intensity,
        ..RuntimeSettings::default()
    };
    AppState::new(&cli, settings, None, viewport)
}

fn key(code: KeyCode) -> AppEvent {
    AppEvent::Input(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
}

fn epoch(state: &AppState) -> u64 {
    state.mount().map(|m| m.epoch()).expect("mounted")
}

#[tokio::test(start_paused = true)]
async fn bootstrap_mounts_selected_effect() {
    let (tx, _rx) = mpsc::channel(256);
    let mut state = state(EffectArg::Heat, 0.5, Viewport::for_cells(80, 24));
    assert!(state.mount().is_none());

    state.handle_event(AppEvent::Bootstrap, &tx).await.expect("bootstrap");

    let mount = state.mount().expect("mounted");
    assert_eq!(mount.epoch(), 1);
    assert!(matches!(mount.scene(), Scene::Heat(_)));
}

#[tokio::test(start_paused = true)]
async fn empty_surface_defers_mount_until_resize() {
    let (tx, _rx) = mpsc::channel(256);
    let mut state = state(EffectArg::Thunder, 0.5, Viewport::default());

    state.handle_event(AppEvent::Bootstrap, &tx).await.expect("bootstrap");
    assert!(state.mount().is_none());

    state
        .handle_event(AppEvent::Input(Event::Resize(80, 24)), &tx)
        .await
        .expect("resize");
    assert_eq!(state.surface.viewport(), Viewport::for_cells(80, 24));
    assert!(matches!(
        state.mount().map(|m| m.scene()),
        Some(Scene::Thunder(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn resize_keeps_the_particle_pool() {
    let (tx, _rx) = mpsc::channel(256);
    let mut state = state(EffectArg::Thunder, 0.5, Viewport::for_cells(80, 24));
    state.handle_event(AppEvent::Bootstrap, &tx).await.expect("bootstrap");
    let before = state.mount().and_then(|m| m.scene().as_thunder()).map(|s| s.clouds().to_vec());

    state
        .handle_event(AppEvent::Input(Event::Resize(120, 40)), &tx)
        .await
        .expect("resize");

    assert_eq!(state.surface.viewport(), Viewport::new(960.0, 640.0));
    assert_eq!(epoch(&state), 1, "resize does not remount");
    let after = state.mount().and_then(|m| m.scene().as_thunder()).map(|s| s.clouds().to_vec());
    assert_eq!(before, after);
}

#[tokio::test(start_paused = true)]
async fn frame_ticks_only_reach_the_current_mount() {
    let (tx, _rx) = mpsc::channel(256);
    let mut state = state(EffectArg::Heat, 0.5, Viewport::for_cells(40, 12));
    state.handle_event(AppEvent::Bootstrap, &tx).await.expect("bootstrap");
    state.handle_event(AppEvent::TickFrame { epoch: 1 }, &tx).await.expect("frame");
    assert_eq!(state.mount().map(|m| m.frames()), Some(1));

    state.handle_event(key(KeyCode::Char('t')), &tx).await.expect("switch");
    assert_eq!(epoch(&state), 2);

    let surface = state.surface.clone();
    state.handle_event(AppEvent::TickFrame { epoch: 1 }, &tx).await.expect("stale frame");
    assert_eq!(state.mount().map(|m| m.frames()), Some(0));
    assert_eq!(state.surface, surface);
}

#[tokio::test(start_paused = true)]
async fn heat_trail_builds_up_and_remount_starts_blank() {
    let (tx, _rx) = mpsc::channel(256);
    let mut state = state(EffectArg::Heat, 0.5, Viewport::for_cells(40, 12));
    state.handle_event(AppEvent::Bootstrap, &tx).await.expect("bootstrap");

    let mut warmth = Vec::new();
    for _ in 0..3 {
        state.handle_event(AppEvent::TickFrame { epoch: epoch(&state) }, &tx).await.expect("frame");
        warmth.push(state.surface.sample(0, 0).map_or(0.0, |dot| dot.a));
    }
    assert!(warmth.windows(2).all(|pair| pair[1] > pair[0]), "{warmth:?}");

    state.handle_event(key(KeyCode::Char('+')), &tx).await.expect("remount");
    assert_eq!(epoch(&state), 2);
    assert!(state.surface.sample(0, 0).is_none(), "new mount starts on a blank surface");
}

#[tokio::test(start_paused = true)]
async fn strike_flash_clears_after_its_timer() {
    let (tx, mut rx) = mpsc::channel(256);
    let mut state = state(EffectArg::Thunder, 1.0, Viewport::for_cells(80, 24));
    state.handle_event(AppEvent::Bootstrap, &tx).await.expect("bootstrap");

    let struck_at = tokio::time::Instant::now();
    state.handle_event(AppEvent::StrikeCheck { epoch: 1 }, &tx).await.expect("strike");
    assert!(state.flash_visible());

    let clear = loop {
        match rx.recv().await.expect("event") {
            event @ AppEvent::FlashClear { .. } => break event,
            _ => {}
        }
    };
    assert!(struck_at.elapsed() >= crate::fx::thunder::FLASH_DURATION);
    state.handle_event(clear, &tx).await.expect("clear");
    assert!(!state.flash_visible());
}

#[tokio::test(start_paused = true)]
async fn quit_tears_down_before_pending_timers_fire() {
    let (tx, _rx) = mpsc::channel(256);
    let mut state = state(EffectArg::Thunder, 1.0, Viewport::for_cells(80, 24));
    state.handle_event(AppEvent::Bootstrap, &tx).await.expect("bootstrap");
    state.handle_event(AppEvent::StrikeCheck { epoch: 1 }, &tx).await.expect("strike");

    state.handle_event(AppEvent::Quit, &tx).await.expect("quit");
    assert_eq!(state.mode, AppMode::Quit);
    assert!(state.mount().is_none());

    let surface = state.surface.clone();
    for event in [
        AppEvent::TickFrame { epoch: 1 },
        AppEvent::StrikeCheck { epoch: 1 },
        AppEvent::FlashClear {
            epoch: 1,
            generation: 1,
        },
    ] {
        state.handle_event(event, &tx).await.expect("late event");
    }
    assert_eq!(state.surface, surface);
    assert!(!state.flash_visible());
}

#[tokio::test(start_paused = true)]
async fn disabled_flash_is_never_visible() {
    let (tx, _rx) = mpsc::channel(256);
    let mut state = state(EffectArg::Thunder, 1.0, Viewport::for_cells(80, 24));
    state.settings.flash = false;
    state.handle_event(AppEvent::Bootstrap, &tx).await.expect("bootstrap");
    state.handle_event(AppEvent::StrikeCheck { epoch: 1 }, &tx).await.expect("strike");
    assert!(!state.flash_visible());
}

#[tokio::test(start_paused = true)]
async fn intensity_keys_step_and_remount() {
    let (tx, _rx) = mpsc::channel(256);
    let mut state = state(EffectArg::Heat, 0.5, Viewport::for_cells(40, 12));
    state.handle_event(AppEvent::Bootstrap, &tx).await.expect("bootstrap");

    state.handle_event(key(KeyCode::Char('+')), &tx).await.expect("up");
    assert!((state.settings.intensity - 0.6).abs() < 1e-6);
    assert_eq!(epoch(&state), 2);

    state.handle_event(key(KeyCode::Char('-')), &tx).await.expect("down");
    state.handle_event(key(KeyCode::Char('-')), &tx).await.expect("down");
    assert!((state.settings.intensity - 0.4).abs() < 1e-6);

    let Some(Scene::Heat(heat)) = state.mount().map(|m| m.scene()) else {
        panic!("expected heat scene");
    };
    assert!((heat.intensity() - 0.4).abs() < 1e-6);
}

#[tokio::test(start_paused = true)]
async fn intensity_keys_stop_at_zero() {
    let (tx, _rx) = mpsc::channel(256);
    let mut state = state(EffectArg::Heat, 0.0, Viewport::for_cells(40, 12));
    state.handle_event(AppEvent::Bootstrap, &tx).await.expect("bootstrap");

    state.handle_event(key(KeyCode::Char('-')), &tx).await.expect("down");
    assert!(state.settings.intensity.abs() < f32::EPSILON);
    assert_eq!(epoch(&state), 1, "unchanged intensity keeps the mount");
}

#[tokio::test(start_paused = true)]
async fn quit_keys_send_quit() {
    let (tx, mut rx) = mpsc::channel(256);
    let mut state = state(EffectArg::Heat, 0.5, Viewport::for_cells(40, 12));

    state.handle_event(key(KeyCode::Char('q')), &tx).await.expect("q");
    assert!(matches!(rx.recv().await, Some(AppEvent::Quit)));

    let ctrl_c = AppEvent::Input(Event::Key(KeyEvent::new(
        KeyCode::Char('c'),
        KeyModifiers::CONTROL,
    )));
    state.handle_event(ctrl_c, &tx).await.expect("ctrl-c");
    assert!(matches!(rx.recv().await, Some(AppEvent::Quit)));
}

#[tokio::test(start_paused = true)]
async fn sound_toggle_flips_setting() {
    let (tx, _rx) = mpsc::channel(256);
    let mut state = state(EffectArg::Heat, 0.5, Viewport::for_cells(40, 12));
    state.handle_event(key(KeyCode::Char('s')), &tx).await.expect("sound");
    assert!(state.settings.with_sound);
    state.handle_event(key(KeyCode::Char('s')), &tx).await.expect("sound");
    assert!(!state.settings.with_sound);
}
