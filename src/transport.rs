//! TCP connection, frame I/O and the version handshake.
//!
//! Every message after the preamble is a 4-byte big-endian length followed by
//! that many payload bytes. [`Connection`] owns the socket until it is split
//! into a [`FrameReader`] and a [`FrameWriter`], each handed to exactly one
//! pipeline task.

use std::io;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use crate::decoder::MessageDecoder;
use crate::encoder::build_connect_request;
use crate::errors::{IBApiError, Result};
use crate::protocol::client_errors::{BAD_LENGTH, CONNECT_FAIL, UNSUPPORTED_VERSION};
use crate::protocol::{HEADER_LEN, MAX_CLIENT_VER, MAX_MSG_LEN, NO_VALID_ID};

// ============================================================================
// Connection State
// ============================================================================

/// Lifecycle of a client connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnState {
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
    /// Reserved; the handshake reports a redirect as an error instead.
    Redirect = 3,
}

impl ConnState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => ConnState::Connecting,
            2 => ConnState::Connected,
            3 => ConnState::Redirect,
            _ => ConnState::Disconnected,
        }
    }
}

/// [`ConnState`] shared between the client handle and the pipeline tasks.
#[derive(Debug)]
pub(crate) struct SharedState(AtomicU8);

impl SharedState {
    pub(crate) fn new(state: ConnState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    pub(crate) fn get(&self) -> ConnState {
        ConnState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn set(&self, state: ConnState) {
        self.0.store(state as u8, Ordering::Release);
    }

    /// Set `state` and return the previous one.
    pub(crate) fn replace(&self, state: ConnState) -> ConnState {
        ConnState::from_u8(self.0.swap(state as u8, Ordering::AcqRel))
    }
}

// ============================================================================
// I/O statistics
// ============================================================================

/// Byte and frame counters for one connection.
#[derive(Debug, Default)]
pub struct IoStats {
    bytes_read: AtomicU64,
    bytes_written: AtomicU64,
    frames_read: AtomicU64,
    frames_written: AtomicU64,
}

/// Point-in-time copy of [`IoStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IoStatsSnapshot {
    pub bytes_read: u64,
    pub bytes_written: u64,
    pub frames_read: u64,
    pub frames_written: u64,
}

impl IoStats {
    pub fn snapshot(&self) -> IoStatsSnapshot {
        IoStatsSnapshot {
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            frames_read: self.frames_read.load(Ordering::Relaxed),
            frames_written: self.frames_written.load(Ordering::Relaxed),
        }
    }
}

// ============================================================================
// Connection
// ============================================================================

/// An open TCP connection to TWS or IB Gateway.
pub struct Connection {
    reader: OwnedReadHalf,
    writer: OwnedWriteHalf,
    stats: Arc<IoStats>,
}

impl Connection {
    /// Dial `addr` (`host:port`).
    pub async fn connect(addr: &str) -> Result<Self> {
        let stream = TcpStream::connect(addr).await.map_err(|e| {
            IBApiError::client(NO_VALID_ID, CONNECT_FAIL, &format!("{addr}: {e}"))
        })?;
        stream.set_nodelay(true)?;
        let (reader, writer) = stream.into_split();
        tracing::debug!(%addr, "socket connected");
        Ok(Self {
            reader,
            writer,
            stats: Arc::new(IoStats::default()),
        })
    }

    pub fn stats(&self) -> Arc<IoStats> {
        Arc::clone(&self.stats)
    }

    /// Split into the halves owned by the reader and writer tasks.
    pub fn into_split(self) -> (FrameReader, FrameWriter) {
        (
            FrameReader {
                reader: self.reader,
                read_buf: BytesMut::with_capacity(8192),
                stats: Arc::clone(&self.stats),
            },
            FrameWriter {
                writer: Some(BufWriter::new(self.writer)),
                stats: self.stats,
            },
        )
    }
}

// ============================================================================
// FrameReader
// ============================================================================

/// Read half: yields one frame payload (length prefix stripped) at a time.
pub struct FrameReader {
    reader: OwnedReadHalf,
    read_buf: BytesMut,
    stats: Arc<IoStats>,
}

impl FrameReader {
    /// Read the next complete frame.
    ///
    /// Cancel-safe: bytes already received stay buffered, so a dropped call
    /// resumes where it left off.
    pub async fn read_frame(&mut self) -> Result<BytesMut> {
        self.fill(HEADER_LEN).await?;

        let header = [self.read_buf[0], self.read_buf[1], self.read_buf[2], self.read_buf[3]];
        let msg_len = u32::from_be_bytes(header) as usize;
        if msg_len == 0 || msg_len > MAX_MSG_LEN {
            return Err(IBApiError::client(
                NO_VALID_ID,
                BAD_LENGTH,
                &format!("declared frame length {msg_len}"),
            ));
        }

        self.fill(HEADER_LEN + msg_len).await?;
        self.read_buf.advance(HEADER_LEN);
        let frame = self.read_buf.split_to(msg_len);
        self.stats.frames_read.fetch_add(1, Ordering::Relaxed);
        Ok(frame)
    }

    async fn fill(&mut self, needed: usize) -> Result<()> {
        while self.read_buf.len() < needed {
            let n = self.reader.read_buf(&mut self.read_buf).await?;
            if n == 0 {
                return Err(IBApiError::Disconnected(
                    "connection closed by peer".into(),
                ));
            }
            self.stats.bytes_read.fetch_add(n as u64, Ordering::Relaxed);
        }
        Ok(())
    }
}

/// Interrupted and would-block reads are retried; anything else ends the
/// connection.
pub(crate) fn is_transient(err: &IBApiError) -> bool {
    match err {
        IBApiError::Io(e) => matches!(
            e.kind(),
            io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
        ),
        _ => false,
    }
}

// ============================================================================
// FrameWriter
// ============================================================================

/// Write half: writes complete frames and flushes after each.
pub struct FrameWriter {
    writer: Option<BufWriter<OwnedWriteHalf>>,
    stats: Arc<IoStats>,
}

impl FrameWriter {
    /// Write one already-framed message.
    pub async fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        self.write_raw(frame).await?;
        self.stats.frames_written.fetch_add(1, Ordering::Relaxed);
        if tracing::enabled!(tracing::Level::TRACE) {
            tracing::trace!(
                kind = frame_kind(frame).unwrap_or(-1),
                len = frame.len().saturating_sub(HEADER_LEN),
                "frame written"
            );
        }
        Ok(())
    }

    /// Write bytes that are not a frame (the handshake preamble).
    pub(crate) async fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| IBApiError::Disconnected("writer shut down".into()))?;
        writer.write_all(bytes).await?;
        writer.flush().await?;
        self.stats
            .bytes_written
            .fetch_add(bytes.len() as u64, Ordering::Relaxed);
        Ok(())
    }

    /// Drop anything left in the write buffer after a failed write.
    pub(crate) fn reset(&mut self) {
        if let Some(w) = self.writer.take() {
            self.writer = Some(BufWriter::new(w.into_inner()));
        }
    }

    /// Close without flushing; buffered bytes are discarded.
    pub(crate) fn close(&mut self) {
        self.writer.take();
    }

    /// Send FIN; later writes fail with `Disconnected`.
    pub async fn shutdown(&mut self) {
        if let Some(mut w) = self.writer.take() {
            let _ = w.shutdown().await;
        }
    }
}

/// Message kind of a framed outbound message, for logging.
fn frame_kind(frame: &[u8]) -> Option<i32> {
    let payload = frame.get(HEADER_LEN..)?;
    let end = payload.iter().position(|&b| b == 0)?;
    std::str::from_utf8(&payload[..end]).ok()?.parse().ok()
}

// ============================================================================
// Handshake
// ============================================================================

/// What the server tells us in its handshake reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub server_version: i32,
    pub connection_time: String,
}

/// Send the `API\0` preamble and read the server's version reply.
///
/// A negative version is a redirect and fails with `Protocol`. Zero, or a
/// version newer than this client speaks, fails with UNSUPPORTED_VERSION.
pub async fn handshake(
    reader: &mut FrameReader,
    writer: &mut FrameWriter,
    connect_options: &str,
) -> Result<ServerInfo> {
    let preamble = build_connect_request(connect_options)?;
    writer.write_raw(&preamble).await?;

    let frame = reader.read_frame().await?;
    let mut dec = MessageDecoder::new(&frame, 0);
    let server_version = dec.decode_i32()?;

    if server_version < 0 {
        let target = if dec.has_remaining() { dec.decode_string()? } else { String::new() };
        return Err(IBApiError::Protocol(format!("server redirect to '{target}'")));
    }
    if server_version == 0 || server_version > MAX_CLIENT_VER {
        return Err(IBApiError::client(
            NO_VALID_ID,
            UNSUPPORTED_VERSION,
            &format!("server version {server_version}"),
        ));
    }

    let connection_time = if dec.has_remaining() {
        dec.decode_string()?
    } else {
        String::new()
    };

    tracing::info!(
        server_version,
        connection_time = %connection_time,
        "handshake complete"
    );

    Ok(ServerInfo {
        server_version,
        connection_time,
    })
}
