use std::io;
use std::path::PathBuf;

/// Failures outside the frame loop. Block queries and streaming calls never fail.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("failed to spawn chunk generation worker: {0}")]
    WorkerSpawn(#[source] io::Error),

    #[error("failed to read settings from {}: {source}", .path.display())]
    SettingsIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse settings: {0}")]
    SettingsParse(#[from] toml::de::Error),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}
