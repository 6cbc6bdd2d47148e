use clap::{Parser, Subcommand};
use fortuna::control::{Reply, Request};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

const SOCKET_PATH: &str = "/tmp/fortuna.sock";

#[derive(Parser, Debug)]
#[command(name = "wofctl", version, about, long_about = None)]
struct Cli {
    /// Socket the fortuna daemon is listening on
    #[arg(short, long, default_value = SOCKET_PATH)]
    socket: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Replace the wheel's labels
    SetLabels { labels: Vec<String> },
    /// Restore the default wheel
    Reset,
    /// Start a spin
    Spin,
    /// Print the current labels and rotation
    GetState,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let request = match cli.command {
        Commands::SetLabels { labels } => Request::SetLabels { labels },
        Commands::Reset => Request::Reset,
        Commands::Spin => Request::Spin,
        Commands::GetState => Request::GetState,
    };

    match send_request(&cli.socket, &request)? {
        Reply::GetStateResult { labels, rotation } => {
            println!("rotation: {rotation}");
            for label in labels {
                println!("{label}");
            }
        }
        Reply::SetLabelsResult { ok } | Reply::ResetResult { ok } | Reply::SpinResult { ok } => {
            if !ok {
                anyhow::bail!("The daemon refused the request.");
            }
            println!("ok");
        }
    }
    Ok(())
}

fn send_request(socket: &Path, request: &Request) -> anyhow::Result<Reply> {
    let mut stream = UnixStream::connect(socket).map_err(|e| {
        anyhow::anyhow!(
            "Failed to connect to fortuna daemon at {}: {}. Is fortuna running?",
            socket.display(),
            e
        )
    })?;

    log::debug!("Sending {:?}", request);
    writeln!(stream, "{}", serde_json::to_string(request)?)?;

    let mut line = String::new();
    BufReader::new(&stream).read_line(&mut line)?;
    Ok(serde_json::from_str(line.trim())?)
}
