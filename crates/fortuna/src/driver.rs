use std::thread;
use std::time::{Duration, Instant};

use async_channel::Receiver;

use crate::config;
use crate::control::WheelHandle;
use crate::events::AppEvent;

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// The single ticking timeline. While a spin is in flight the engine is
/// sampled once per frame interval; idle, the loop parks on the event channel
/// until a control event arrives.
pub fn run(handle: &WheelHandle, rx: &Receiver<AppEvent>) {
    loop {
        if handle.is_spinning() {
            if let Some(outcome) = handle.advance(Instant::now()) {
                log::info!("Wheel settled on '{}' (segment {})", outcome.label, outcome.index);
            }
            while let Ok(event) = rx.try_recv() {
                if !on_event(handle, event) {
                    return;
                }
            }
            thread::sleep(FRAME_INTERVAL);
        } else {
            match rx.recv_blocking() {
                Ok(event) => {
                    if !on_event(handle, event) {
                        return;
                    }
                }
                Err(_) => return,
            }
        }
    }
}

fn on_event(handle: &WheelHandle, event: AppEvent) -> bool {
    match event {
        AppEvent::SpinStarted => {}
        AppEvent::ConfigReload => match config::load_config() {
            Ok(cfg) => {
                handle.set_tuning(cfg.spin.tuning());
                log::info!("Configuration reloaded");
            }
            Err(e) => log::error!("Failed to reload config: {}", e),
        },
        AppEvent::Shutdown => {
            log::info!("Shutting down, persisting wheel state");
            handle.persist();
            return false;
        }
    }
    true
}
