use std::path::PathBuf;

use async_channel::Sender;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;

use crate::control::{Reply, Request, WheelHandle};
use crate::events::AppEvent;

/// Serve the control protocol: one JSON request per line, one JSON reply per
/// line, written back only to the requesting connection. Lines that are not a
/// recognized request shape are dropped without a reply; the socket may carry
/// unrelated traffic.
pub async fn run_server(path: PathBuf, handle: WheelHandle, tx: Sender<AppEvent>) {
    // Cleanup old socket if it exists
    if std::fs::metadata(&path).is_ok() {
        let _ = std::fs::remove_file(&path);
    }

    let listener = match UnixListener::bind(&path) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind unix socket: {}", e);
            return;
        }
    };
    log::info!("Control socket listening on {}", path.display());

    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let handle = handle.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let (read_half, mut write_half) = stream.into_split();
                    let reader = BufReader::new(read_half);
                    let mut lines = reader.lines();

                    while let Ok(Some(line)) = lines.next_line().await {
                        let request: Request = match serde_json::from_str(line.trim()) {
                            Ok(r) => r,
                            Err(_) => continue,
                        };
                        let is_spin = matches!(request, Request::Spin);
                        let reply = handle.handle_request(request);

                        // wake the driver loop so it starts ticking the clock
                        if is_spin
                            && matches!(reply, Reply::SpinResult { ok: true })
                            && tx.send(AppEvent::SpinStarted).await.is_err()
                        {
                            break;
                        }

                        match serde_json::to_string(&reply) {
                            Ok(mut json) => {
                                json.push('\n');
                                if write_half.write_all(json.as_bytes()).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => log::error!("Failed to encode reply: {}", e),
                        }
                    }
                });
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}
