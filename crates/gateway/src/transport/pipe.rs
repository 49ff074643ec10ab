//! OS pipe transport
//!
//! The platform serves one duplex pipe per symbol/timeframe and accepts a
//! single client on it. On Windows this is a named pipe opened as a file;
//! elsewhere it is a Unix domain socket under the configured directory.

use std::io::{self, Read, Write};

use super::config::PipeConfig;
use super::{Channel, Endpoint, Transport};
use crate::error::{ConnectError, TransportError};

#[cfg(windows)]
type Stream = std::fs::File;
#[cfg(unix)]
type Stream = std::os::unix::net::UnixStream;

/// Windows: the pipe does not exist
#[cfg(windows)]
const ERROR_FILE_NOT_FOUND: i32 = 2;
/// Windows: all pipe instances are busy
#[cfg(windows)]
const ERROR_PIPE_BUSY: i32 = 231;

/// Transport connecting to the platform's pipe for one endpoint
#[derive(Debug, Clone)]
pub struct PipeTransport {
    endpoint: Endpoint,
    config: PipeConfig,
}

impl PipeTransport {
    pub fn new(endpoint: Endpoint, config: PipeConfig) -> Self {
        Self { endpoint, config }
    }

    pub fn config(&self) -> &PipeConfig {
        &self.config
    }

    fn connect_error(&self, error: io::Error) -> ConnectError {
        let endpoint = self.endpoint.to_string();

        #[cfg(windows)]
        {
            match error.raw_os_error() {
                Some(ERROR_FILE_NOT_FOUND) => return ConnectError::NotFound(endpoint),
                Some(ERROR_PIPE_BUSY) => return ConnectError::AlreadyConnected(endpoint),
                _ => {}
            }
        }

        match error.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::ConnectionRefused => {
                ConnectError::NotFound(endpoint)
            }
            io::ErrorKind::ResourceBusy | io::ErrorKind::WouldBlock => {
                ConnectError::AlreadyConnected(endpoint)
            }
            _ => ConnectError::Io {
                endpoint,
                source: error,
            },
        }
    }

    #[cfg(windows)]
    fn open(&self) -> io::Result<Stream> {
        std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(self.config.path(&self.endpoint))
    }

    #[cfg(unix)]
    fn open(&self) -> io::Result<Stream> {
        let stream = Stream::connect(self.config.path(&self.endpoint))?;
        stream.set_read_timeout(self.config.read_timeout())?;
        Ok(stream)
    }
}

impl Transport for PipeTransport {
    type Channel = PipeChannel;

    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn connect(&self) -> Result<PipeChannel, ConnectError> {
        let stream = self.open().map_err(|e| self.connect_error(e))?;

        #[cfg(windows)]
        {
            if self.config.read_timeout_ms.is_some() {
                log::warn!(
                    "API {}: read timeout is not supported on named pipes, reads block",
                    self.endpoint
                );
            }
        }

        log::debug!(
            "API {}: pipe {} open",
            self.endpoint,
            self.config.path(&self.endpoint).display()
        );
        Ok(PipeChannel {
            stream: Some(stream),
        })
    }
}

/// Connected platform pipe
#[derive(Debug)]
pub struct PipeChannel {
    stream: Option<Stream>,
}

impl PipeChannel {
    fn stream(&mut self) -> Result<&mut Stream, TransportError> {
        self.stream.as_mut().ok_or(TransportError::ChannelClosed)
    }
}

fn transport_error(error: io::Error) -> TransportError {
    match error.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => TransportError::Timeout,
        io::ErrorKind::BrokenPipe | io::ErrorKind::ConnectionReset => TransportError::ChannelClosed,
        _ => TransportError::Io(error),
    }
}

impl Channel for PipeChannel {
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let stream = self.stream()?;
        stream.write_all(bytes).map_err(transport_error)?;
        stream.flush().map_err(transport_error)
    }

    fn receive(&mut self, n: usize) -> Result<Vec<u8>, TransportError> {
        let stream = self.stream()?;
        let mut buffer = vec![0u8; n];
        let mut filled = 0;
        while filled < n {
            match stream.read(&mut buffer[filled..]) {
                Ok(0) => break,
                Ok(read) => filled += read,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                // The platform closing its end of a Windows pipe reads as BrokenPipe
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => break,
                Err(e) => return Err(transport_error(e)),
            }
        }
        buffer.truncate(filled);
        Ok(buffer)
    }

    fn close(&mut self) -> Result<(), TransportError> {
        #[cfg(unix)]
        {
            if let Some(stream) = &self.stream {
                match stream.shutdown(std::net::Shutdown::Both) {
                    Ok(()) => {}
                    Err(e) if e.kind() == io::ErrorKind::NotConnected => {}
                    Err(e) => return Err(TransportError::Io(e)),
                }
            }
        }
        self.stream.take().map(drop).ok_or(TransportError::ChannelClosed)
    }
}
