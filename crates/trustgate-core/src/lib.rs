mod channel;
mod config;
mod firmware;
mod hwsecure;

pub use channel::{Channel, TipcChannel};
pub use config::{IpcConfig, DEFAULT_IPC_DIR};
pub use firmware::{load_firmware_from, load_firmware_package, load_firmware_package_with};
pub use hwsecure::HwSecureClient;

pub use trustgate_proto::{ProtoError, SecureFlag, SecureMode, ServiceError};

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// The package source could not be opened, measured, or read.
    #[error("package not found: {0}")]
    NotFound(#[source] std::io::Error),
    /// The endpoint could not be reached, or the connection dropped
    /// mid-exchange.
    #[error("connection error: {0}")]
    Connection(#[source] std::io::Error),
    /// The response did not match the expected layout.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtoError),
    /// A rejection reported by the secure world.
    #[error("service error: {0}")]
    Service(#[from] ServiceError),
}
