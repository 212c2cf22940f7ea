//! clamd engine client.
//!
//! This module provides an `EngineClient` that talks to the ClamAV daemon
//! over TCP.
//!
//! # Requirements
//!
//! - clamd must be running with `TCPSocket` enabled
//! - `StreamMaxLength` on the daemon should be at least
//!   [`ClamdConfig::max_stream_size`]
//!
//! # Protocol
//!
//! Uses the null-terminated `zPING` and `zINSTREAM` commands. INSTREAM
//! data is sent as chunks, each prefixed with its length as a 4-byte
//! big-endian integer, and terminated by a zero-length chunk.

use crate::config::ClamdConfig;
use crate::core::{EngineClient, ScanError};

use async_trait::async_trait;
use std::future::Future;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

const ENGINE: &str = "clamd";

/// What a healthy clamd answers to `zPING`.
const PONG: &str = "PONG";

/// Reply prefix clamd uses when a stream exceeds `StreamMaxLength`.
const SIZE_LIMIT_REPLY: &str = "INSTREAM size limit exceeded";

/// clamd client implementation.
///
/// Every call opens its own connection, which is closed when the call
/// returns, successfully or not.
///
/// # Example
///
/// ```rust,ignore
/// use clamgate::backends::ClamdClient;
/// use clamgate::config::ClamdConfig;
///
/// let client = ClamdClient::new(ClamdConfig::new().with_host("127.0.0.1"))?;
/// let status = client.ping().await?;
/// ```
#[derive(Debug, Clone)]
pub struct ClamdClient {
    config: ClamdConfig,
}

impl ClamdClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: ClamdConfig) -> Result<Self, ScanError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Creates a client for `127.0.0.1:3310`.
    pub fn with_defaults() -> Result<Self, ScanError> {
        Self::new(ClamdConfig::default())
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ClamdConfig {
        &self.config
    }

    /// Runs `fut` under the configured timeout.
    async fn timed<T, F>(&self, fut: F) -> Result<T, ScanError>
    where
        F: Future<Output = std::io::Result<T>>,
    {
        match tokio::time::timeout(self.config.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(ScanError::connection_failed(ENGINE, e.to_string())),
            Err(_) => Err(ScanError::timeout(ENGINE, self.config.timeout)),
        }
    }

    async fn connect(&self) -> Result<TcpStream, ScanError> {
        let address = self.config.address();
        tracing::debug!(address = %address, "Connecting to clamd");
        self.timed(TcpStream::connect(address.as_str())).await
    }

    /// Reads the reply up to EOF and strips the trailing NUL.
    async fn read_reply(&self, stream: &mut TcpStream) -> Result<Vec<u8>, ScanError> {
        let mut reply = Vec::new();
        self.timed(stream.read_to_end(&mut reply)).await?;
        while matches!(reply.last(), Some(0)) {
            reply.pop();
        }
        Ok(reply)
    }

    async fn send_chunks(&self, stream: &mut TcpStream, data: &[u8]) -> Result<(), ScanError> {
        self.timed(stream.write_all(b"zINSTREAM\0")).await?;

        for chunk in data.chunks(self.config.chunk_size) {
            let len = chunk.len() as u32;
            self.timed(stream.write_all(&len.to_be_bytes())).await?;
            self.timed(stream.write_all(chunk)).await?;
        }

        self.timed(stream.write_all(&0u32.to_be_bytes())).await?;
        self.timed(stream.flush()).await
    }

    /// Runs a single null-terminated command and returns the reply.
    async fn command(&self, command: &[u8]) -> Result<Vec<u8>, ScanError> {
        let mut stream = self.connect().await?;
        self.timed(stream.write_all(command)).await?;
        self.read_reply(&mut stream).await
    }
}

fn is_size_limit_reply(reply: &[u8]) -> bool {
    reply.starts_with(SIZE_LIMIT_REPLY.as_bytes())
}

#[async_trait]
impl EngineClient for ClamdClient {
    fn name(&self) -> &str {
        ENGINE
    }

    async fn ping(&self) -> Result<String, ScanError> {
        let reply = self.command(b"zPING\0").await?;
        let status = String::from_utf8_lossy(&reply).trim().to_string();
        if status != PONG {
            tracing::warn!(reply = %status, "Unexpected clamd ping reply");
            return Err(ScanError::engine_unavailable(
                ENGINE,
                format!("unexpected ping reply: {:?}", status),
            ));
        }
        Ok(status)
    }

    async fn scan(&self, data: &[u8]) -> Result<Vec<u8>, ScanError> {
        if data.len() as u64 > self.config.max_stream_size {
            return Err(ScanError::size_limit(
                ENGINE,
                format!(
                    "stream of {} bytes exceeds the {} byte limit",
                    data.len(),
                    self.config.max_stream_size
                ),
            ));
        }

        let mut stream = self.connect().await?;

        if let Err(write_err) = self.send_chunks(&mut stream, data).await {
            // clamd hangs up mid-stream when StreamMaxLength is hit; its
            // reply says why.
            return match self.read_reply(&mut stream).await {
                Ok(reply) if is_size_limit_reply(&reply) => Err(ScanError::size_limit(
                    ENGINE,
                    String::from_utf8_lossy(&reply).trim().to_string(),
                )),
                _ => Err(write_err),
            };
        }

        let reply = self.read_reply(&mut stream).await?;
        if is_size_limit_reply(&reply) {
            return Err(ScanError::size_limit(
                ENGINE,
                String::from_utf8_lossy(&reply).trim().to_string(),
            ));
        }

        tracing::debug!(
            bytes = data.len(),
            reply_len = reply.len(),
            "clamd INSTREAM finished"
        );
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::net::TcpListener;

    async fn listener() -> (TcpListener, ClamdConfig) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let config = ClamdConfig::new()
            .with_port(port)
            .with_timeout(Duration::from_millis(500))
            .with_chunk_size(4);
        (listener, config)
    }

    async fn read_command(stream: &mut TcpStream) -> Vec<u8> {
        let mut command = Vec::new();
        loop {
            let byte = stream.read_u8().await.unwrap();
            if byte == 0 {
                return command;
            }
            command.push(byte);
        }
    }

    /// Reads INSTREAM chunks until the terminator; returns (data, chunk count).
    async fn read_instream(stream: &mut TcpStream) -> (Vec<u8>, usize) {
        let mut data = Vec::new();
        let mut chunks = 0;
        loop {
            let len = stream.read_u32().await.unwrap() as usize;
            if len == 0 {
                return (data, chunks);
            }
            let mut chunk = vec![0u8; len];
            stream.read_exact(&mut chunk).await.unwrap();
            data.extend_from_slice(&chunk);
            chunks += 1;
        }
    }

    #[tokio::test]
    async fn test_ping() {
        let (listener, config) = listener().await;
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            assert_eq!(read_command(&mut stream).await, b"zPING");
            stream.write_all(b"PONG\0").await.unwrap();
        });

        let client = ClamdClient::new(config).unwrap();
        assert_eq!(client.ping().await.unwrap(), "PONG");
    }

    #[tokio::test]
    async fn test_ping_unexpected_reply() {
        let (listener, config) = listener().await;
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            read_command(&mut stream).await;
            stream.write_all(b"UNKNOWN COMMAND\0").await.unwrap();
        });

        let client = ClamdClient::new(config).unwrap();
        let err = client.ping().await.unwrap_err();
        assert!(
            matches!(err, ScanError::EngineUnavailable { .. }),
            "unexpected error: {}",
            err
        );
        assert_eq!(err.engine(), Some("clamd"));
    }

    #[tokio::test]
    async fn test_instream_framing_and_reply() {
        let (listener, config) = listener().await;
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            assert_eq!(read_command(&mut stream).await, b"zINSTREAM");
            let received = read_instream(&mut stream).await;
            stream.write_all(b"stream: OK\0").await.unwrap();
            received
        });

        let client = ClamdClient::new(config).unwrap();
        let reply = client.scan(b"0123456789").await.unwrap();
        assert_eq!(reply, b"stream: OK");

        let (data, chunks) = server.await.unwrap();
        assert_eq!(data, b"0123456789");
        assert_eq!(chunks, 3);
    }

    #[tokio::test]
    async fn test_size_limit_reply() {
        let (listener, config) = listener().await;
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            read_command(&mut stream).await;
            read_instream(&mut stream).await;
            stream
                .write_all(b"INSTREAM size limit exceeded. ERROR\0")
                .await
                .unwrap();
        });

        let client = ClamdClient::new(config).unwrap();
        let err = client.scan(b"too large").await.unwrap_err();
        assert!(err.is_size_limit(), "unexpected error: {}", err);
    }

    #[tokio::test]
    async fn test_client_side_ceiling() {
        let config = ClamdConfig::new().with_max_stream_size(4);
        let client = ClamdClient::new(config).unwrap();

        let err = client.scan(b"0123456789").await.unwrap_err();
        assert!(err.is_size_limit());
    }

    #[tokio::test]
    async fn test_timeout() {
        let (listener, config) = listener().await;
        let config = config.with_timeout(Duration::from_millis(100));
        tokio::spawn(async move {
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let client = ClamdClient::new(config).unwrap();
        let err = client.ping().await.unwrap_err();
        assert!(matches!(err, ScanError::Timeout { .. }), "unexpected error: {}", err);
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let (listener, config) = listener().await;
        drop(listener);

        let client = ClamdClient::new(config).unwrap();
        let err = client.scan(b"data").await.unwrap_err();
        assert!(matches!(
            err,
            ScanError::ConnectionFailed { .. } | ScanError::Timeout { .. }
        ));
        assert!(!err.is_size_limit());
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(ClamdClient::new(ClamdConfig::new().with_host("")).is_err());
        assert!(ClamdClient::new(ClamdConfig::new().with_chunk_size(0)).is_err());
    }
}
