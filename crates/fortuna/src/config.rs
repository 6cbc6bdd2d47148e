use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_SOCKET_PATH: &str = "/tmp/fortuna.sock";
pub const DEFAULT_SPIN_DURATION_MS: u64 = 4200;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FortunaConfig {
    pub socket_path: PathBuf,
    pub spin: SpinSection,
}

impl Default for FortunaConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            spin: SpinSection::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct SpinSection {
    pub duration_ms: u64,
    pub min_turns: f64,
    pub max_turns: f64,
}

impl Default for SpinSection {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_SPIN_DURATION_MS,
            min_turns: 4.0,
            max_turns: 6.0,
        }
    }
}

impl SpinSection {
    pub fn tuning(&self) -> SpinTuning {
        SpinTuning {
            duration: Duration::from_millis(self.duration_ms),
            min_turns: self.min_turns,
            max_turns: self.max_turns.max(self.min_turns),
        }
    }
}

/// Timing parameters for one spin. The duration is constant per spin
/// regardless of the distance traveled, and the easing curve is fixed.
#[derive(Debug, Clone, Copy)]
pub struct SpinTuning {
    pub duration: Duration,
    pub min_turns: f64,
    pub max_turns: f64,
}

impl Default for SpinTuning {
    fn default() -> Self {
        SpinSection::default().tuning()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

pub(crate) fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "fortuna", "fortuna")
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs = project_dirs().ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config() -> Result<FortunaConfig, ConfigError> {
    let config_path = get_config_path()?;

    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(config::Environment::with_prefix("FORTUNA"))
        .build()?;

    Ok(s.try_deserialize()?)
}

pub fn load_or_default() -> FortunaConfig {
    match load_config() {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Falling back to default configuration: {}", e);
            FortunaConfig::default()
        }
    }
}

pub fn write_default_config() -> std::io::Result<PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

use crate::events::AppEvent;
use async_channel::Sender;

pub async fn run_async_watcher(tx: Sender<AppEvent>) {
    let config_path = match get_config_path() {
        Ok(p) => p,
        Err(e) => {
            log::error!("Config watcher error: {}", e);
            return;
        }
    };
    let config_dir = match config_path.parent() {
        Some(p) => p.to_path_buf(),
        None => return,
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", e);
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                let meaningful_event = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                );

                if meaningful_event
                    && event.paths.iter().any(|p| p == &config_path)
                    && tx.send(AppEvent::ConfigReload).await.is_err()
                {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}
