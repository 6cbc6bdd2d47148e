use std::path::PathBuf;
use std::thread;

use async_channel::Sender;
use tokio::runtime::Runtime;

use crate::control::WheelHandle;
use crate::events::AppEvent;

pub fn start_background_services(socket_path: PathBuf, handle: WheelHandle, tx: Sender<AppEvent>) {
    thread::spawn(move || {
        let rt = Runtime::new().expect("Failed to create Tokio runtime");

        rt.block_on(async {
            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    crate::sys::server::run_server(socket_path, handle, tx).await;
                });
            }

            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    crate::config::run_async_watcher(tx).await;
                });
            }

            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        let _ = tx.send(AppEvent::Shutdown).await;
                    }
                });
            }

            std::future::pending::<()>().await;
        });
    });
}
