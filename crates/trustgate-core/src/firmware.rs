use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use trustgate_proto::{
    decode_firmware_response, encode_firmware_request, FirmwareRequest, FIRMWARE_LOADER_PORT,
    FIRMWARE_RESP_LEN, MAX_MSG_SIZE,
};

use crate::channel::{Channel, TipcChannel};
use crate::config::IpcConfig;
use crate::{ClientError, Result};

/// Transfer states for one package load. Errors are terminal: a failed
/// transfer is never resumed, callers restart from a fresh announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadState {
    Idle,
    SizeAnnounced,
    Streaming { sent: u64 },
    Completed { sent: u64 },
}

fn step<C, R>(
    state: LoadState,
    channel: &mut C,
    source: &mut R,
    package_size: u64,
) -> Result<LoadState>
where
    C: Channel,
    R: Read,
{
    match state {
        LoadState::Idle => {
            let request = encode_firmware_request(&FirmwareRequest::Load { package_size });
            channel.send(&request)?;
            Ok(LoadState::SizeAnnounced)
        }
        LoadState::SizeAnnounced => {
            // The service accepts or rejects before any payload moves.
            let frame = channel.recv(FIRMWARE_RESP_LEN)?;
            let response = decode_firmware_response(&frame)?;
            response.status()?;
            Ok(LoadState::Streaming { sent: 0 })
        }
        LoadState::Streaming { sent } if sent < package_size => {
            let want = (package_size - sent).min(MAX_MSG_SIZE as u64) as usize;
            let mut chunk = vec![0u8; want];
            source.read_exact(&mut chunk).map_err(ClientError::NotFound)?;
            channel.send(&chunk)?;
            let sent = sent + want as u64;
            debug!(sent, package_size, "streamed chunk");
            Ok(LoadState::Streaming { sent })
        }
        LoadState::Streaming { sent } => {
            let frame = channel.recv(FIRMWARE_RESP_LEN)?;
            let response = decode_firmware_response(&frame)?;
            response.status()?;
            Ok(LoadState::Completed { sent })
        }
        LoadState::Completed { .. } => Ok(state),
    }
}

/// Run the load protocol over an already-open channel: announce
/// `package_size`, stream exactly that many bytes from `source` in chunks
/// of at most [`MAX_MSG_SIZE`], then read the verification verdict.
/// Returns the number of bytes transferred.
pub fn load_firmware_from<C, R>(mut channel: C, mut source: R, package_size: u64) -> Result<u64>
where
    C: Channel,
    R: Read,
{
    let mut state = LoadState::Idle;
    loop {
        state = step(state, &mut channel, &mut source, package_size)?;
        if let LoadState::Completed { sent } = state {
            return Ok(sent);
        }
    }
}

/// Load a signed firmware package into the secure world.
pub fn load_firmware_package(path: impl AsRef<Path>) -> Result<u64> {
    load_firmware_package_with(&IpcConfig::from_env(), path)
}

pub fn load_firmware_package_with(config: &IpcConfig, path: impl AsRef<Path>) -> Result<u64> {
    let path = path.as_ref();
    let file = File::open(path).map_err(ClientError::NotFound)?;
    let package_size = file.metadata().map_err(ClientError::NotFound)?.len();
    let channel = TipcChannel::connect(&config.endpoint(FIRMWARE_LOADER_PORT))?;
    channel.set_io_timeout(config.io_timeout)?;
    info!(path = %path.display(), package_size, "loading firmware package");
    load_firmware_from(channel, file, package_size)
}
