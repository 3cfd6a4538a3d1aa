use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use tokio::{
    sync::mpsc::Sender,
    task::JoinHandle,
    time::{Instant, interval, interval_at, sleep},
};

use crate::fx::thunder::FLASH_DURATION;

/// Identifies one effect mount; timer events from an older mount are stale.
pub type Epoch = u64;

#[derive(Debug)]
pub enum AppEvent {
    Bootstrap,
    TickFrame { epoch: Epoch },
    StrikeCheck { epoch: Epoch },
    FlashClear { epoch: Epoch, generation: u64 },
    Input(Event),
    Quit,
}

pub fn spawn_input_task() -> impl futures::Stream<Item = Event> {
    EventStream::new().filter_map(|event| async move { event.ok() })
}

pub fn start_frame_task(tx: Sender<AppEvent>, epoch: Epoch, fps: u8) -> JoinHandle<()> {
    let fps = fps.max(15);
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_millis(1000_u64 / u64::from(fps)));
        loop {
            ticker.tick().await;
            if tx.send(AppEvent::TickFrame { epoch }).await.is_err() {
                break;
            }
        }
    })
}

/// Repeating strike check; the first check happens one full period in.
/// A period too long to schedule never fires.
pub fn start_strike_task(tx: Sender<AppEvent>, epoch: Epoch, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        if period.is_zero() {
            return;
        }
        let Some(start) = Instant::now().checked_add(period) else {
            log::debug!("strike period {period:?} out of range; no strikes for #{epoch}");
            return;
        };
        let mut ticker = interval_at(start, period);
        loop {
            ticker.tick().await;
            if tx.send(AppEvent::StrikeCheck { epoch }).await.is_err() {
                break;
            }
        }
    })
}

pub fn schedule_flash_clear(tx: Sender<AppEvent>, epoch: Epoch, generation: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        sleep(FLASH_DURATION).await;
        let _ = tx.send(AppEvent::FlashClear { epoch, generation }).await;
    })
}
