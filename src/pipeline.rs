//! The three long-lived tasks behind a connected client.
//!
//! ```text
//! callers --outbound--> writer task --> socket
//! socket --> reader task --frames--> decoder task --> Wrapper
//!            any task   --notices-->  decoder task
//! ```
//!
//! All three also listen on a termination broadcast and exit as soon as it
//! fires. The decoder is the only task that calls into the [`Wrapper`].

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use bytes::BytesMut;
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::decoder::decode_frame;
use crate::errors::IBApiError;
use crate::protocol::client_errors::{BAD_MESSAGE, NOT_CONNECTED};
use crate::protocol::NO_VALID_ID;
use crate::transport::{is_transient, ConnState, FrameReader, FrameWriter, SharedState};
use crate::wrapper::{IBEvent, Wrapper};

// ============================================================================
// Writer
// ============================================================================

pub(crate) async fn run_writer(
    mut writer: FrameWriter,
    mut outbound: mpsc::Receiver<BytesMut>,
    mut shutdown: broadcast::Receiver<()>,
    notices: mpsc::Sender<IBApiError>,
    state: Arc<SharedState>,
) {
    // A write can block for as long as the peer refuses to read, so it races
    // the termination signal too.
    let interrupted = loop {
        tokio::select! {
            biased;
            _ = shutdown.recv() => break false,
            frame = outbound.recv() => {
                let Some(frame) = frame else { break false };
                if state.get() != ConnState::Connected {
                    let _ = notices
                        .send(IBApiError::client(NO_VALID_ID, NOT_CONNECTED, ""))
                        .await;
                    continue;
                }
                tokio::select! {
                    biased;
                    _ = shutdown.recv() => break true,
                    res = writer.write_frame(&frame) => {
                        if let Err(e) = res {
                            tracing::error!(error = %e, "socket write failed");
                            writer.reset();
                            let _ = notices.send(e).await;
                        }
                    }
                }
            }
        }
    };
    if interrupted {
        tracing::warn!("write interrupted by shutdown, dropping socket");
        writer.close();
    } else {
        writer.shutdown().await;
    }
    tracing::debug!("writer task stopped");
}

// ============================================================================
// Reader
// ============================================================================

pub(crate) async fn run_reader(
    mut reader: FrameReader,
    frames: mpsc::Sender<BytesMut>,
    mut shutdown: broadcast::Receiver<()>,
    state: Arc<SharedState>,
) {
    loop {
        tokio::select! {
            biased;
            _ = shutdown.recv() => break,
            res = reader.read_frame() => match res {
                Ok(frame) => {
                    if frames.send(frame).await.is_err() {
                        break;
                    }
                }
                Err(e) if is_transient(&e) => {
                    tracing::warn!(error = %e, "transient read error, retrying");
                }
                Err(IBApiError::Disconnected(reason)) => {
                    tracing::info!(%reason, "server closed the connection");
                    state.set(ConnState::Disconnected);
                    break;
                }
                Err(e) => {
                    tracing::error!(error = %e, "read failed, closing connection");
                    state.set(ConnState::Disconnected);
                    break;
                }
            }
        }
    }
    // Dropping `frames` tells the decoder the stream is over.
    tracing::debug!("reader task stopped");
}

// ============================================================================
// Decoder
// ============================================================================

/// Tracks the two messages that complete the connect handshake.
pub(crate) struct Warmup {
    next_valid_id: bool,
    managed_accounts: bool,
    ready: Option<oneshot::Sender<()>>,
}

impl Warmup {
    pub(crate) fn new(ready: oneshot::Sender<()>) -> Self {
        Self {
            next_valid_id: false,
            managed_accounts: false,
            ready: Some(ready),
        }
    }

    fn observe(&mut self, event: &IBEvent) -> bool {
        match event {
            IBEvent::NextValidId { .. } => self.next_valid_id = true,
            IBEvent::ManagedAccounts { .. } => self.managed_accounts = true,
            _ => {}
        }
        self.next_valid_id && self.managed_accounts
    }
}

pub(crate) struct DecoderTask {
    pub(crate) frames: mpsc::Receiver<BytesMut>,
    pub(crate) notices: mpsc::Receiver<IBApiError>,
    pub(crate) shutdown: broadcast::Receiver<()>,
    pub(crate) wrapper: Arc<dyn Wrapper>,
    pub(crate) state: Arc<SharedState>,
    pub(crate) next_id: Arc<AtomicI32>,
    pub(crate) server_version: i32,
    pub(crate) warmup: Option<Warmup>,
}

impl DecoderTask {
    pub(crate) async fn run(mut self) {
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.recv() => break,
                Some(notice) = self.notices.recv() => self.handle_notice(notice),
                frame = self.frames.recv() => match frame {
                    Some(frame) => self.handle_frame(&frame),
                    None => {
                        self.state.set(ConnState::Disconnected);
                        self.wrapper.on_event(&IBEvent::ConnectionClosed);
                        break;
                    }
                },
            }
        }
        tracing::debug!("decoder task stopped");
    }

    fn handle_frame(&mut self, frame: &[u8]) {
        let events = match decode_frame(frame, self.server_version) {
            Ok(events) => events,
            Err(e) => {
                tracing::error!(error = %e, len = frame.len(), "dropping undecodable frame");
                return;
            }
        };

        for event in &events {
            if let IBEvent::NextValidId { order_id } = event {
                self.next_id.fetch_max(*order_id, Ordering::AcqRel);
            }
            self.wrapper.on_event(event);

            let done = self.warmup.as_mut().is_some_and(|w| w.observe(event));
            if done {
                self.finish_warmup();
            }
        }
    }

    fn finish_warmup(&mut self) {
        let Some(mut warmup) = self.warmup.take() else { return };
        self.state.set(ConnState::Connected);
        tracing::info!("connection ready");
        self.wrapper.on_event(&IBEvent::ConnectAck);
        if let Some(ready) = warmup.ready.take() {
            let _ = ready.send(());
        }
    }

    fn handle_notice(&self, notice: IBApiError) {
        tracing::warn!(error = %notice, "pipeline notice");
        self.wrapper.on_event(&error_event(&notice));
    }
}

/// Turn a client-side failure into the `Error` event the wrapper sees.
pub(crate) fn error_event(err: &IBApiError) -> IBEvent {
    match err {
        IBApiError::Client { req_id, code, message } => IBEvent::Error {
            req_id: *req_id,
            code: *code,
            message: message.clone(),
        },
        other => IBEvent::Error {
            req_id: NO_VALID_ID,
            code: BAD_MESSAGE.code,
            message: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Connection;
    use crate::wrapper::ChannelWrapper;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn framed(fields: &[&str]) -> Vec<u8> {
        let mut body = Vec::new();
        for f in fields {
            body.extend_from_slice(f.as_bytes());
            body.push(0);
        }
        let mut frame = (body.len() as u32).to_be_bytes().to_vec();
        frame.extend(body);
        frame
    }

    /// Starts a server that writes `messages` and then closes.
    async fn server_sending(messages: Vec<Vec<u8>>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            for m in messages {
                stream.write_all(&m).await.unwrap();
            }
        });
        addr
    }

    struct Harness {
        events: mpsc::UnboundedReceiver<IBEvent>,
        shutdown: broadcast::Sender<()>,
        state: Arc<SharedState>,
        next_id: Arc<AtomicI32>,
        ready: oneshot::Receiver<()>,
        tasks: Vec<tokio::task::JoinHandle<()>>,
        _writer: FrameWriter,
    }

    async fn spawn_read_side(addr: &str) -> Harness {
        let (reader, writer) = Connection::connect(addr).await.unwrap().into_split();
        let (wrapper, events) = ChannelWrapper::new();
        let (shutdown, _) = broadcast::channel(1);
        let (frames_tx, frames_rx) = mpsc::channel(100);
        let (_notices_tx, notices_rx) = mpsc::channel(10);
        let (ready_tx, ready) = oneshot::channel();
        let state = Arc::new(SharedState::new(ConnState::Connecting));
        let next_id = Arc::new(AtomicI32::new(0));

        let reader_task = tokio::spawn(run_reader(
            reader,
            frames_tx,
            shutdown.subscribe(),
            Arc::clone(&state),
        ));
        let decoder = DecoderTask {
            frames: frames_rx,
            notices: notices_rx,
            shutdown: shutdown.subscribe(),
            wrapper: Arc::new(wrapper),
            state: Arc::clone(&state),
            next_id: Arc::clone(&next_id),
            server_version: 157,
            warmup: Some(Warmup::new(ready_tx)),
        };
        let decoder_task = tokio::spawn(decoder.run());

        Harness {
            events,
            shutdown,
            state,
            next_id,
            ready,
            tasks: vec![reader_task, decoder_task],
            _writer: writer,
        }
    }

    #[tokio::test]
    async fn warmup_completes_after_both_messages() {
        let addr = server_sending(vec![
            framed(&["9", "1", "100"]),
            framed(&["15", "1", "DU123"]),
            framed(&["49", "1", "1700000000"]),
        ])
        .await;
        let mut h = spawn_read_side(&addr).await;

        assert_eq!(h.events.recv().await, Some(IBEvent::NextValidId { order_id: 100 }));
        assert_eq!(
            h.events.recv().await,
            Some(IBEvent::ManagedAccounts { accounts: vec!["DU123".into()] })
        );
        assert_eq!(h.events.recv().await, Some(IBEvent::ConnectAck));
        assert_eq!(h.events.recv().await, Some(IBEvent::CurrentTime { time: 1700000000 }));
        assert_eq!(h.events.recv().await, Some(IBEvent::ConnectionClosed));

        h.ready.await.unwrap();
        assert_eq!(h.next_id.load(Ordering::Acquire), 100);
        assert_eq!(h.state.get(), ConnState::Disconnected);
        for t in h.tasks {
            t.await.unwrap();
        }
    }

    #[tokio::test]
    async fn undecodable_frame_is_dropped() {
        let addr = server_sending(vec![
            framed(&["49", "1", "not-a-number"]),
            framed(&["49", "1", "5"]),
        ])
        .await;
        let mut h = spawn_read_side(&addr).await;

        assert_eq!(h.events.recv().await, Some(IBEvent::CurrentTime { time: 5 }));
        assert_eq!(h.events.recv().await, Some(IBEvent::ConnectionClosed));
    }

    #[tokio::test]
    async fn shutdown_stops_tasks_on_idle_socket() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1];
            let _ = stream.read(&mut buf).await;
        });

        let h = spawn_read_side(&addr).await;
        let _ = h.shutdown.send(());
        for t in h.tasks {
            tokio::time::timeout(Duration::from_secs(2), t)
                .await
                .expect("task did not stop")
                .unwrap();
        }
    }

    #[tokio::test]
    async fn writer_refuses_frames_until_connected() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            stream.read_to_end(&mut received).await.unwrap();
            received
        });

        let (_reader, writer) = Connection::connect(&addr).await.unwrap().into_split();
        let (outbound_tx, outbound_rx) = mpsc::channel(10);
        let (notices_tx, mut notices_rx) = mpsc::channel(10);
        let (shutdown, _) = broadcast::channel(1);
        let state = Arc::new(SharedState::new(ConnState::Connecting));
        let task = tokio::spawn(run_writer(
            writer,
            outbound_rx,
            shutdown.subscribe(),
            notices_tx,
            Arc::clone(&state),
        ));

        outbound_tx.send(BytesMut::from(&b"\x00\x00\x00\x0249\x00"[..])).await.unwrap();
        let notice = notices_rx.recv().await.unwrap();
        assert_eq!(notice.code(), Some(NOT_CONNECTED.code));
        assert!(matches!(
            error_event(&notice),
            IBEvent::Error { req_id: NO_VALID_ID, code: 504, .. }
        ));

        state.set(ConnState::Connected);
        outbound_tx.send(BytesMut::from(&b"\x00\x00\x00\x0250\x00"[..])).await.unwrap();
        drop(outbound_tx);
        task.await.unwrap();

        assert_eq!(server.await.unwrap(), b"\x00\x00\x00\x0250\x00");
    }
}
