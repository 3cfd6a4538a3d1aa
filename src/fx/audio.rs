use std::{
    fmt,
    io::{self, Write},
};

/// External sound collaborator notified on every lightning strike.
pub trait AudioTrigger: fmt::Debug + Send {
    fn thunder(&mut self, intensity: f32);
}

/// Rings the terminal bell; the closest thing a terminal has to thunder.
#[derive(Debug, Default)]
pub struct TerminalBell;

impl AudioTrigger for TerminalBell {
    fn thunder(&mut self, _intensity: f32) {
        let mut stdout = io::stdout();
        if let Err(err) = stdout.write_all(b"\x07").and_then(|()| stdout.flush()) {
            log::debug!("terminal bell failed: {err}");
        }
    }
}
