use std::path::PathBuf;

use clap::Parser;
use fortuna::config;
use fortuna::control::WheelHandle;
use fortuna::driver;
use fortuna::store::{self, Override, Store};
use fortuna::sys::runtime;
use fortuna::wheel::WheelEngine;

#[derive(Parser, Debug)]
#[command(name = "fortuna", version, about, long_about = None)]
struct Cli {
    /// Replace the labels at startup: a JSON array of strings or a
    /// comma-separated list. An empty value starts an empty wheel.
    #[arg(long)]
    labels: Option<String>,

    /// Start from the 12 default labels, ignoring any persisted snapshot
    #[arg(long)]
    reset: bool,

    /// Wipe the persisted snapshot before restoring state
    #[arg(long)]
    clear_state: bool,

    /// Write the bundled default config.toml if none exists, then exit
    #[arg(long)]
    write_config: bool,

    /// Unix socket to serve the control protocol on (overrides config)
    #[arg(long)]
    socket: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.write_config {
        let path = config::write_default_config()?;
        println!("{}", path.display());
        return Ok(());
    }

    let cfg = config::load_or_default();
    let socket_path = cli.socket.unwrap_or_else(|| cfg.socket_path.clone());

    let store = Store::at_default_location()?;
    if cli.clear_state {
        store.clear();
    }

    let mut pairs: Vec<(&str, &str)> = Vec::new();
    if let Some(labels) = cli.labels.as_deref() {
        pairs.push(("labels", labels));
    }
    if cli.reset {
        pairs.push(("reset", ""));
    }
    let state = store::initial(Override::from_pairs(pairs), &store);
    log::info!(
        "Wheel ready: {} segments, rotation {:.3}",
        state.labels.len(),
        state.rotation
    );

    let engine = WheelEngine::new(state, cfg.spin.tuning(), store);
    let handle = WheelHandle::new(engine);

    let (tx, rx) = async_channel::bounded(32);
    runtime::start_background_services(socket_path, handle.clone(), tx);

    driver::run(&handle, &rx);
    Ok(())
}
