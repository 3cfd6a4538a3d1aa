use tokio::{sync::mpsc::Sender, task::JoinHandle};

use crate::{
    app::events::{AppEvent, Epoch, schedule_flash_clear, start_frame_task, start_strike_task},
    fx::{
        Scene,
        render_loop::FrameLoop,
        surface::{Surface, Viewport},
        thunder::ThunderStorm,
    },
};

/// One mounted effect together with every timer feeding it.
#[derive(Debug)]
pub struct Mount {
    epoch: Epoch,
    scene: Scene,
    frame_loop: FrameLoop,
    tasks: Vec<JoinHandle<()>>,
}

impl Mount {
    /// A mount with no timers attached; frames are driven by the caller.
    #[must_use]
    pub fn new(epoch: Epoch, scene: Scene) -> Self {
        Self {
            epoch,
            scene,
            frame_loop: FrameLoop::new(),
            tasks: Vec::new(),
        }
    }

    /// Mounts `scene` and starts its frame ticker and, for thunder, the
    /// strike ticker.
    #[must_use]
    pub fn start(epoch: Epoch, scene: Scene, tx: &Sender<AppEvent>, fps: u8) -> Self {
        let mut mount = Self::new(epoch, scene);
        mount.track(start_frame_task(tx.clone(), epoch, fps));
        if let Some(period) = mount
            .scene
            .as_thunder()
            .and_then(ThunderStorm::strike_period)
        {
            mount.track(start_strike_task(tx.clone(), epoch, period));
        }
        log::info!("mounted effect #{epoch} at {fps} fps");
        mount
    }

    #[must_use]
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.frame_loop.is_running()
    }

    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frame_loop.frames()
    }

    pub fn frame(&mut self, surface: &mut dyn Surface) -> bool {
        self.frame_loop.tick(&mut self.scene, surface)
    }

    /// Strike timer tick. On a strike the flash clear is scheduled here so
    /// it is cancelled together with the mount.
    pub fn strike_check(&mut self, viewport: Viewport, tx: &Sender<AppEvent>) -> Option<u64> {
        if !self.is_live() {
            return None;
        }
        let generation = self.scene.as_thunder_mut()?.strike_tick(viewport)?;
        self.track(schedule_flash_clear(tx.clone(), self.epoch, generation));
        Some(generation)
    }

    pub fn clear_flash(&mut self, generation: u64) -> bool {
        if !self.is_live() {
            return false;
        }
        self.scene
            .as_thunder_mut()
            .is_some_and(|storm| storm.clear_flash(generation))
    }

    #[must_use]
    pub fn flash_active(&self) -> bool {
        self.is_live()
            && self
                .scene
                .as_thunder()
                .is_some_and(ThunderStorm::flash_active)
    }

    /// Cancels the frame loop and aborts every pending timer. Safe to call
    /// repeatedly; returns whether this call did the work.
    pub fn teardown(&mut self) -> bool {
        let was_live = self.frame_loop.cancel();
        for task in self.tasks.drain(..) {
            task.abort();
        }
        if was_live {
            log::info!("tore down effect #{}", self.epoch);
        }
        was_live
    }

    fn track(&mut self, handle: JoinHandle<()>) {
        self.tasks.retain(|task| !task.is_finished());
        self.tasks.push(handle);
    }
}

impl Drop for Mount {
    fn drop(&mut self) {
        self.teardown();
    }
}
