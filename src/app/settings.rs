use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::{Cli, EffectArg};

const CONFIG_DIR_ENV: &str = "AMBIENT_FX_CONFIG_DIR";
const DEFAULT_BACKDROP: [u8; 3] = [12, 12, 20];

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("creating settings directory {path} failed")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("serializing settings payload failed")]
    Serialize(#[from] serde_json::Error),
    #[error("writing settings file {path} failed")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    pub effect: EffectArg,
    pub intensity: f32,
    pub with_sound: bool,
    pub flash: bool,
    /// Colour the effects are screen-blended over.
    pub backdrop: [u8; 3],
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            effect: EffectArg::default(),
            intensity: crate::cli::DEFAULT_INTENSITY,
            with_sound: false,
            flash: true,
            backdrop: DEFAULT_BACKDROP,
        }
    }
}

impl RuntimeSettings {
    pub fn from_cli_defaults(cli: &Cli) -> Self {
        Self {
            effect: cli.default_effect(),
            intensity: cli.default_intensity(),
            with_sound: cli.sound,
            flash: !cli.no_flash,
            ..Self::default()
        }
    }
}

/// Settings from disk with explicit CLI flags layered on top.
pub fn load_runtime_settings(cli: &Cli, enable_disk: bool) -> (RuntimeSettings, Option<PathBuf>) {
    let mut settings = RuntimeSettings::from_cli_defaults(cli);
    if !enable_disk {
        return (settings, None);
    }

    let Some(path) = settings_path() else {
        return (settings, None);
    };

    match fs::read_to_string(&path) {
        Ok(content) => match serde_json::from_str::<RuntimeSettings>(&content) {
            Ok(saved) => settings = saved,
            Err(err) => log::warn!("ignoring unreadable settings at {}: {err}", path.display()),
        },
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => log::warn!("could not read settings at {}: {err}", path.display()),
    }

    if let Some(effect) = cli.effect {
        settings.effect = effect;
    }
    if let Some(intensity) = cli.intensity {
        settings.intensity = intensity;
    }
    if cli.sound {
        settings.with_sound = true;
    }
    if cli.no_flash {
        settings.flash = false;
    }

    (settings, Some(path))
}

pub fn save_runtime_settings(path: &Path, settings: &RuntimeSettings) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| SettingsError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let payload = serde_json::to_string_pretty(settings)?;
    fs::write(path, payload).map_err(|source| SettingsError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn settings_path() -> Option<PathBuf> {
    if let Some(base) = std::env::var_os(CONFIG_DIR_ENV) {
        return Some(PathBuf::from(base).join("settings.json"));
    }

    let home = std::env::var_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("ambient-fx")
            .join("settings.json"),
    )
}
