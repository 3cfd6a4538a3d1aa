use crate::fx::{Animate, surface::Surface};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Cancelled,
}

/// Drives one effect: every tick updates all state, then draws it.
#[derive(Debug, Clone)]
pub struct FrameLoop {
    state: LoopState,
    frames: u64,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameLoop {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: LoopState::Running,
            frames: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> LoopState {
        self.state
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Runs a single frame. Returns `false` without touching the effect or
    /// the surface when cancelled or when the surface has no area yet.
    pub fn tick(&mut self, effect: &mut dyn Animate, surface: &mut dyn Surface) -> bool {
        if !self.is_running() {
            return false;
        }
        let viewport = surface.viewport();
        if viewport.is_empty() {
            return false;
        }
        effect.update(viewport);
        effect.draw(surface);
        self.frames = self.frames.saturating_add(1);
        true
    }

    /// Stops the loop. Returns whether it was still running.
    pub fn cancel(&mut self) -> bool {
        let was_running = self.is_running();
        self.state = LoopState::Cancelled;
        was_running
    }
}
