use std::io::{self, Read, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use tracing::debug;

use trustgate_proto::{ProtoError, MAX_MSG_SIZE};

use crate::{ClientError, Result};

/// One blocking connection to a secure-world port.
///
/// At most one exchange is in flight per channel; callers that need
/// concurrency open independent channels. The connection is released when
/// the channel is dropped, on every exit path.
pub trait Channel {
    /// Send one complete message.
    fn send(&mut self, frame: &[u8]) -> Result<()>;

    /// Receive exactly `len` bytes of response.
    fn recv(&mut self, len: usize) -> Result<Bytes>;

    /// One blocking round trip.
    fn call(&mut self, frame: &[u8], resp_len: usize) -> Result<Bytes> {
        self.send(frame)?;
        self.recv(resp_len)
    }
}

impl<C: Channel + ?Sized> Channel for &mut C {
    fn send(&mut self, frame: &[u8]) -> Result<()> {
        (**self).send(frame)
    }

    fn recv(&mut self, len: usize) -> Result<Bytes> {
        (**self).recv(len)
    }
}

/// Channel over the secure-world IPC device, addressed by port name
/// resolved to a filesystem endpoint.
pub struct TipcChannel {
    stream: UnixStream,
}

impl TipcChannel {
    pub fn connect(endpoint: &Path) -> Result<Self> {
        let stream = UnixStream::connect(endpoint).map_err(ClientError::Connection)?;
        debug!(endpoint = %endpoint.display(), "connected to secure world");
        Ok(Self { stream })
    }

    /// Apply a read/write deadline to the underlying connection. The
    /// channel itself never times out on its own.
    pub fn set_io_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.stream
            .set_read_timeout(timeout)
            .map_err(ClientError::Connection)?;
        self.stream
            .set_write_timeout(timeout)
            .map_err(ClientError::Connection)
    }
}

impl Channel for TipcChannel {
    fn send(&mut self, frame: &[u8]) -> Result<()> {
        if frame.len() > MAX_MSG_SIZE {
            return Err(ClientError::Protocol(ProtoError::FrameTooLarge(frame.len())));
        }
        self.stream.write_all(frame).map_err(ClientError::Connection)
    }

    fn recv(&mut self, len: usize) -> Result<Bytes> {
        let mut buf = vec![0u8; len];
        let mut read = 0;
        while read < len {
            match self.stream.read(&mut buf[read..]) {
                // EOF before any response byte is a dropped connection;
                // EOF mid-response is a layout violation.
                Ok(0) if read == 0 => {
                    return Err(ClientError::Connection(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "connection closed by service",
                    )))
                }
                Ok(0) => {
                    return Err(ClientError::Protocol(ProtoError::ShortResponse {
                        got: read,
                        need: len,
                    }))
                }
                Ok(n) => read += n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(ClientError::Connection(err)),
            }
        }
        Ok(Bytes::from(buf))
    }
}
