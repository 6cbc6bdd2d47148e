#[derive(Debug, Clone)]
pub enum AppEvent {
    SpinStarted,
    ConfigReload,
    Shutdown,
}
