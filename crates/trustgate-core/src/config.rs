use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_IPC_DIR: &str = "/dev/socket/trusty-ipc";

const CONFIG_ENV: &str = "TRUSTGATE_CONFIG";
const IPC_DIR_ENV: &str = "TRUSTGATE_IPC_DIR";

#[derive(Debug, Deserialize)]
struct ConfigFile {
    ipc_dir: Option<String>,
    io_timeout_ms: Option<u64>,
}

/// Where secure-world ports live and how long a single exchange may block.
#[derive(Debug, Clone)]
pub struct IpcConfig {
    pub ipc_dir: PathBuf,
    pub io_timeout: Option<Duration>,
}

impl Default for IpcConfig {
    fn default() -> Self {
        Self {
            ipc_dir: PathBuf::from(DEFAULT_IPC_DIR),
            io_timeout: None,
        }
    }
}

impl IpcConfig {
    /// Resolve configuration: optional JSON file named by
    /// `TRUSTGATE_CONFIG`, then `TRUSTGATE_IPC_DIR`. Unreadable or
    /// unparsable files fall back to defaults.
    pub fn from_env() -> Self {
        let mut config = IpcConfig::default();

        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if let Ok(contents) = std::fs::read_to_string(path) {
                if let Ok(file) = serde_json::from_str::<ConfigFile>(&contents) {
                    if let Some(dir) = file.ipc_dir {
                        config.ipc_dir = PathBuf::from(dir);
                    }
                    config.io_timeout = file.io_timeout_ms.and_then(|ms| {
                        if ms == 0 {
                            None
                        } else {
                            Some(Duration::from_millis(ms))
                        }
                    });
                }
            }
        }

        if let Ok(dir) = std::env::var(IPC_DIR_ENV) {
            config.ipc_dir = PathBuf::from(dir);
        }

        config
    }

    pub fn endpoint(&self, port: &str) -> PathBuf {
        self.ipc_dir.join(port)
    }
}
