use crate::cli::Cli;

pub(crate) fn test_cli() -> Cli {
    Cli {
        effect: None,
        intensity: None,
        sound: false,
        fps: 60,
        no_flash: false,
        seed: Some(7),
        no_hint: false,
        ephemeral: true,
        log_file: None,
    }
}
