// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Robot session: one link, one inbound task, one outbound path.
//!
//! The dispatcher lives behind a single lock shared with the inbound task.
//! Every link gets an epoch number at connect time; tasks and late connect
//! results holding an older epoch can no longer touch the session. When the
//! robot ends the session or the link drops, the inbound task takes its own
//! link out of the slot so both halves of the stream are closed.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::{watch, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info, warn};

use gridnav_core::{
    ConnectionState, DispatchOutcome, DispatchStats, Dispatcher, LinkStatus, ListenerId, Message,
    NavListener, NavSnapshot, NavigationState, OperatorCommand, SessionPolicy,
};
use gridnav_protocol::{encode, FrameDecoder};

use crate::error::{StationError, StationResult};
use crate::transport::{BoxedReader, BoxedWriter, Transport};

const READ_CHUNK: usize = 512;
const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy)]
pub struct StationOptions {
    pub policy: SessionPolicy,
    pub write_timeout: Duration,
}

impl Default for StationOptions {
    fn default() -> Self {
        Self {
            policy: SessionPolicy::default(),
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

struct Hub {
    dispatcher: Dispatcher,
    epoch: u64,
}

type SharedHub = Arc<Mutex<Hub>>;

fn lock(hub: &SharedHub) -> MutexGuard<'_, Hub> {
    hub.lock().unwrap_or_else(PoisonError::into_inner)
}

struct ActiveLink {
    epoch: u64,
    writer: BoxedWriter,
    cancel: watch::Sender<bool>,
    inbound: JoinHandle<()>,
}

type LinkSlot = Arc<AsyncMutex<Option<ActiveLink>>>;

impl ActiveLink {
    /// Stop the inbound task and wait until its pending read is dropped.
    async fn close(self) {
        let _ = self.cancel.send(true);
        let _ = self.inbound.await;
    }
}

/// Ground-station side of the robot link.
pub struct Station {
    transport: Arc<dyn Transport>,
    hub: SharedHub,
    link: LinkSlot,
    write_timeout: Duration,
}

impl Station {
    pub fn new(transport: Arc<dyn Transport>, options: StationOptions) -> Self {
        Self {
            transport,
            hub: Arc::new(Mutex::new(Hub {
                dispatcher: Dispatcher::new(options.policy),
                epoch: 0,
            })),
            link: Arc::new(AsyncMutex::new(None)),
            write_timeout: options.write_timeout,
        }
    }

    pub fn register_listener(&self, listener: Arc<dyn NavListener>) -> ListenerId {
        lock(&self.hub).dispatcher.register(listener)
    }

    pub fn unregister_listener(&self, id: ListenerId) {
        lock(&self.hub).dispatcher.unregister(id);
    }

    pub fn connection(&self) -> ConnectionState {
        lock(&self.hub).dispatcher.connection()
    }

    pub fn snapshot(&self) -> NavSnapshot {
        lock(&self.hub).dispatcher.snapshot()
    }

    pub fn stats(&self) -> DispatchStats {
        lock(&self.hub).dispatcher.stats()
    }

    pub fn link_status(&self) -> LinkStatus {
        lock(&self.hub).dispatcher.machine().status()
    }

    /// Run `f` against the live navigation state.
    pub fn with_state<R>(&self, f: impl FnOnce(&NavigationState) -> R) -> R {
        f(lock(&self.hub).dispatcher.state())
    }

    /// Open a link to `target`.
    ///
    /// Only valid while disconnected. A [`Station::disconnect`] issued while
    /// the transport is still connecting wins; this call then returns
    /// [`StationError::Cancelled`].
    pub async fn connect(&self, target: &str) -> StationResult<()> {
        let epoch = {
            let mut hub = lock(&self.hub);
            if !hub.dispatcher.request_connect(target) {
                return Err(StationError::AlreadyActive(hub.dispatcher.connection()));
            }
            hub.epoch += 1;
            hub.epoch
        };

        // A link whose session already ended may still be held open.
        let leftover = self.link.lock().await.take();
        if let Some(leftover) = leftover {
            debug!("Closing leftover link {}", leftover.epoch);
            leftover.close().await;
        }

        info!("Connecting to {} over {}", target, self.transport.name());
        let result = self.transport.connect(target).await;

        let mut slot = self.link.lock().await;
        let halves = {
            let mut hub = lock(&self.hub);
            if hub.epoch != epoch {
                info!("Connect to {} cancelled", target);
                return Err(StationError::Cancelled(target.to_string()));
            }
            match result {
                Ok(halves) => {
                    hub.dispatcher.confirm_connected();
                    halves
                }
                Err(e) => {
                    warn!("Connect to {} failed: {}", target, e);
                    hub.dispatcher.connect_failed(&e.to_string());
                    return Err(e.into());
                }
            }
        };

        let (cancel, cancel_rx) = watch::channel(false);
        let inbound = tokio::spawn(run_inbound(
            self.hub.clone(),
            self.link.clone(),
            epoch,
            halves.reader,
            cancel_rx,
        ));
        *slot = Some(ActiveLink {
            epoch,
            writer: halves.writer,
            cancel,
            inbound,
        });
        drop(slot);
        info!("Connected to {}", target);
        Ok(())
    }

    /// Close the link. When connected, a DISCONNECT record is attempted
    /// first so the robot can stop. Disconnecting an idle station is a
    /// no-op.
    pub async fn disconnect(&self) -> StationResult<()> {
        let mut slot = self.link.lock().await;

        let (state, epoch) = {
            let hub = lock(&self.hub);
            (hub.dispatcher.connection(), hub.epoch)
        };
        if state == ConnectionState::Disconnected {
            debug!("Disconnect while already disconnected");
        }

        if state == ConnectionState::Connected {
            if let Some(active) = slot.as_mut().filter(|l| l.epoch == epoch) {
                let frame = encode(&Message::Disconnect);
                if let Err(e) = write_frame(&mut active.writer, &frame, self.write_timeout).await {
                    debug!("DISCONNECT not delivered: {}", e);
                }
            }
        }

        {
            let mut hub = lock(&self.hub);
            hub.epoch += 1;
            if hub.dispatcher.request_disconnect() {
                log_session_end(&hub.dispatcher);
            }
        }

        if let Some(active) = slot.take() {
            active.close().await;
        }
        Ok(())
    }

    /// Encode and write one outbound message.
    ///
    /// Fails with [`StationError::NotConnected`] before touching the
    /// transport unless a session is connected. A failed write ends the
    /// session.
    pub async fn send(&self, msg: Message) -> StationResult<()> {
        let kind = msg.kind();
        if !kind.direction().is_outbound() {
            return Err(StationError::WrongDirection(kind));
        }

        let mut slot = self.link.lock().await;
        let epoch = {
            let hub = lock(&self.hub);
            if !hub.dispatcher.connection().can_send() {
                return Err(StationError::NotConnected);
            }
            hub.epoch
        };
        let Some(active) = slot.as_mut().filter(|l| l.epoch == epoch) else {
            return Err(StationError::NotConnected);
        };

        let Err(e) = write_frame(&mut active.writer, &encode(&msg), self.write_timeout).await else {
            debug!("Sent {}", msg);
            return Ok(());
        };

        warn!("Sending {} failed: {}", msg, e);
        {
            let mut hub = lock(&self.hub);
            if hub.epoch == epoch && hub.dispatcher.link_lost(&e.to_string()) {
                log_session_end(&hub.dispatcher);
            }
        }
        if let Some(active) = slot.take() {
            active.close().await;
        }
        Err(e.into())
    }

    /// Validate operator input and send the resulting message.
    pub async fn issue(&self, cmd: &OperatorCommand) -> StationResult<Message> {
        let msg = cmd.validate()?;
        self.send(msg).await?;
        Ok(msg)
    }
}

async fn write_frame(writer: &mut BoxedWriter, frame: &[u8], limit: Duration) -> io::Result<()> {
    time::timeout(limit, async {
        writer.write_all(frame).await?;
        writer.flush().await
    })
    .await
    .map_err(|_| {
        io::Error::new(
            io::ErrorKind::TimedOut,
            format!("write timed out after {:?}", limit),
        )
    })?
}

fn log_session_end(dispatcher: &Dispatcher) {
    let stats = dispatcher.stats();
    info!(
        "Session ended: {} applied, {} ignored, {} rejected",
        stats.applied, stats.ignored, stats.rejected
    );
}

/// Decode everything buffered. Returns false once the robot ended the
/// session.
fn drain(dispatcher: &mut Dispatcher, decoder: &mut FrameDecoder) -> bool {
    loop {
        match decoder.decode() {
            Ok(msg) => {
                if dispatcher.dispatch(msg) == DispatchOutcome::SessionEnded {
                    decoder.clear();
                    return false;
                }
            }
            Err(e) if e.is_incomplete() => return true,
            Err(e) => {
                warn!("Discarding record: {}", e);
                dispatcher.record_rejected();
            }
        }
    }
}

/// Read and dispatch until the link ends. Returns true when the session
/// ended on its own, false when it was cancelled or superseded.
async fn pump(
    hub: &SharedHub,
    epoch: u64,
    reader: &mut BoxedReader,
    cancel: &mut watch::Receiver<bool>,
) -> bool {
    let mut decoder = FrameDecoder::new();
    let mut buf = [0u8; READ_CHUNK];

    let reason = loop {
        let read = tokio::select! {
            biased;
            changed = cancel.changed() => {
                match changed {
                    Ok(()) if !*cancel.borrow() => continue,
                    _ => {
                        debug!("Inbound task for link {} cancelled", epoch);
                        return false;
                    }
                }
            }
            read = reader.read(&mut buf) => read,
        };

        match read {
            Ok(0) => break "link closed by robot".to_string(),
            Ok(n) => {
                decoder.extend(&buf[..n]);
                let mut hub = lock(hub);
                if hub.epoch != epoch {
                    return false;
                }
                if !drain(&mut hub.dispatcher, &mut decoder) {
                    log_session_end(&hub.dispatcher);
                    return true;
                }
            }
            Err(e) => break e.to_string(),
        }
    };

    let mut hub = lock(hub);
    if hub.epoch != epoch {
        return false;
    }
    if hub.dispatcher.link_lost(&reason) {
        warn!("Link lost: {}", reason);
        log_session_end(&hub.dispatcher);
    }
    true
}

/// Take link `epoch` out of the slot and drop its writer. Gives way to
/// whoever cancels the task, since they already hold the slot.
async fn reap(link: &LinkSlot, epoch: u64, cancel: &mut watch::Receiver<bool>) {
    if *cancel.borrow() {
        return;
    }
    let mut slot = tokio::select! {
        biased;
        _ = cancel.changed() => return,
        slot = link.lock() => slot,
    };
    if slot.as_ref().is_some_and(|l| l.epoch == epoch) {
        drop(slot.take());
        debug!("Closed link {}", epoch);
    }
}

async fn run_inbound(
    hub: SharedHub,
    link: LinkSlot,
    epoch: u64,
    mut reader: BoxedReader,
    mut cancel: watch::Receiver<bool>,
) {
    if pump(&hub, epoch, &mut reader, &mut cancel).await {
        reap(&link, epoch, &mut cancel).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::task::{Context, Poll};

    use gridnav_core::{ChannelListener, Field, MessageType, NavEvent, Obstacle, PointInput, Pose};
    use tokio::io::{AsyncWrite, DuplexStream};
    use tokio::sync::{mpsc, Notify};

    use crate::transport::{ConnectFuture, LinkHalves};

    /// In-memory link. Each connect hands the far end to the test.
    #[derive(Default)]
    struct PipeTransport {
        connects: AtomicUsize,
        robot: Mutex<Option<DuplexStream>>,
        gate: Option<Arc<Notify>>,
        fail: bool,
        broken_writer: bool,
    }

    /// Writer whose every write fails.
    struct BrokenWriter;

    impl AsyncWrite for BrokenWriter {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe")))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    impl PipeTransport {
        fn connects(&self) -> usize {
            self.connects.load(Ordering::SeqCst)
        }

        fn robot(&self) -> DuplexStream {
            self.robot.lock().unwrap().take().unwrap()
        }
    }

    impl Transport for PipeTransport {
        fn name(&self) -> &'static str {
            "pipe"
        }

        fn connect<'a>(&'a self, _target: &'a str) -> ConnectFuture<'a> {
            Box::pin(async move {
                self.connects.fetch_add(1, Ordering::SeqCst);
                if let Some(gate) = &self.gate {
                    gate.notified().await;
                }
                if self.fail {
                    return Err(io::Error::new(io::ErrorKind::NotFound, "no such device"));
                }
                let (station_end, robot_end) = tokio::io::duplex(1024);
                *self.robot.lock().unwrap() = Some(robot_end);
                let (reader, writer) = tokio::io::split(station_end);
                let writer: BoxedWriter = if self.broken_writer {
                    Box::new(BrokenWriter)
                } else {
                    Box::new(writer)
                };
                Ok(LinkHalves {
                    reader: Box::new(reader),
                    writer,
                })
            })
        }
    }

    fn station(transport: PipeTransport) -> (Arc<Station>, Arc<PipeTransport>) {
        let transport = Arc::new(transport);
        let station = Station::new(transport.clone(), StationOptions::default());
        (Arc::new(station), transport)
    }

    async fn connected() -> (
        Arc<Station>,
        Arc<PipeTransport>,
        DuplexStream,
        mpsc::UnboundedReceiver<NavEvent>,
    ) {
        connected_over(PipeTransport::default()).await
    }

    async fn connected_over(
        transport: PipeTransport,
    ) -> (
        Arc<Station>,
        Arc<PipeTransport>,
        DuplexStream,
        mpsc::UnboundedReceiver<NavEvent>,
    ) {
        let (station, transport) = station(transport);
        station.connect("sim").await.unwrap();
        let robot = transport.robot();
        let (listener, rx) = ChannelListener::channel();
        station.register_listener(Arc::new(listener));
        (station, transport, robot, rx)
    }

    async fn next_event(rx: &mut mpsc::UnboundedReceiver<NavEvent>) -> NavEvent {
        time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timed out waiting for event")
            .expect("listener channel closed")
    }

    async fn wait_link_closed(station: &Station) {
        time::timeout(Duration::from_secs(2), async {
            while station.link.lock().await.is_some() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("link still held open");
    }

    async fn assert_robot_sees_eof(robot: &mut DuplexStream) {
        let mut buf = [0u8; 16];
        let read = time::timeout(Duration::from_secs(2), robot.read(&mut buf))
            .await
            .expect("robot end never saw the link close");
        assert_eq!(read.unwrap(), 0);
    }

    async fn read_record(robot: &mut DuplexStream, len: usize) -> Message {
        let mut buf = vec![0u8; len];
        robot.read_exact(&mut buf).await.unwrap();
        let mut decoder = FrameDecoder::new();
        decoder.extend(&buf);
        decoder.decode().unwrap()
    }

    #[tokio::test]
    async fn send_while_disconnected_skips_transport() {
        let (station, transport) = station(PipeTransport::default());

        let err = station.send(Message::Stop).await.unwrap_err();

        assert!(matches!(err, StationError::NotConnected));
        assert_eq!(transport.connects(), 0);
    }

    #[tokio::test]
    async fn outbound_message_reaches_robot() {
        let (station, _transport, mut robot, _rx) = connected().await;

        station.send(Message::Goto { x: 10.5, y: 3.0 }).await.unwrap();

        assert_eq!(
            read_record(&mut robot, 10).await,
            Message::Goto { x: 10.5, y: 3.0 }
        );
    }

    #[tokio::test]
    async fn inbound_only_types_are_not_sent() {
        let (station, _transport, _robot, _rx) = connected().await;

        let err = station
            .send(Message::PosUpdate {
                x: 0.0,
                y: 0.0,
                heading: 0.0,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StationError::WrongDirection(MessageType::PosUpdate)
        ));
    }

    #[tokio::test]
    async fn telemetry_updates_state_and_listeners() {
        let (station, _transport, mut robot, mut rx) = connected().await;

        robot
            .write_all(&encode(&Message::PosUpdate {
                x: 12.5,
                y: 7.0,
                heading: 90.0,
            }))
            .await
            .unwrap();

        assert_eq!(
            next_event(&mut rx).await,
            NavEvent::Pose {
                x: 12.5,
                y: 7.0,
                heading: 90.0
            }
        );
        assert_eq!(
            station.snapshot().pose,
            Pose {
                x: 12.5,
                y: 7.0,
                heading: 90.0
            }
        );
    }

    #[tokio::test]
    async fn unknown_tag_is_skipped_and_decoding_resumes() {
        let (station, _transport, mut robot, mut rx) = connected().await;

        robot.write_all(&[99, 1, 0, 0, 0, 0]).await.unwrap();
        robot
            .write_all(&encode(&Message::Crash { x: 2.0, y: 3.0 }))
            .await
            .unwrap();

        assert_eq!(next_event(&mut rx).await, NavEvent::Obstacle { x: 2, y: 3 });
        assert_eq!(
            station.with_state(|s| s.obstacles().to_vec()),
            vec![Obstacle { x: 2, y: 3 }]
        );
        assert_eq!(station.stats().rejected, 1);
    }

    #[tokio::test]
    async fn remote_disconnect_blocks_further_sends() {
        let (station, transport, mut robot, mut rx) = connected().await;

        robot.write_all(&encode(&Message::Disconnect)).await.unwrap();

        assert_eq!(
            next_event(&mut rx).await,
            NavEvent::Connection {
                state: ConnectionState::Disconnected
            }
        );
        let err = station.send(Message::Stop).await.unwrap_err();
        assert!(matches!(err, StationError::NotConnected));
        assert_eq!(transport.connects(), 1);
    }

    #[tokio::test]
    async fn remote_disconnect_closes_the_link() {
        let (station, _transport, mut robot, mut rx) = connected().await;

        robot.write_all(&encode(&Message::Disconnect)).await.unwrap();

        assert_eq!(
            next_event(&mut rx).await,
            NavEvent::Connection {
                state: ConnectionState::Disconnected
            }
        );
        assert_robot_sees_eof(&mut robot).await;
        wait_link_closed(&station).await;
    }

    #[tokio::test]
    async fn reconnect_after_remote_disconnect() {
        let (station, transport, mut robot, mut rx) = connected().await;
        robot.write_all(&encode(&Message::Disconnect)).await.unwrap();
        next_event(&mut rx).await;
        assert_robot_sees_eof(&mut robot).await;

        station.connect("sim").await.unwrap();
        let mut robot = transport.robot();

        station.send(Message::Stop).await.unwrap();
        assert_eq!(read_record(&mut robot, 2).await, Message::Stop);
        assert_eq!(transport.connects(), 2);
    }

    #[tokio::test]
    async fn eof_is_link_loss() {
        let (station, _transport, robot, mut rx) = connected().await;

        drop(robot);

        assert_eq!(
            next_event(&mut rx).await,
            NavEvent::Connection {
                state: ConnectionState::Disconnected
            }
        );
        assert!(matches!(next_event(&mut rx).await, NavEvent::Status { .. }));
        assert_eq!(station.connection(), ConnectionState::Disconnected);
        wait_link_closed(&station).await;

        let status = station.link_status();
        assert_eq!(status.last_error.as_deref(), Some("link closed by robot"));
        assert_eq!(status.target, None);
    }

    #[tokio::test]
    async fn write_failure_ends_the_session() {
        let (station, _transport, _robot, mut rx) = connected_over(PipeTransport {
            broken_writer: true,
            ..Default::default()
        })
        .await;

        let err = station.send(Message::Stop).await.unwrap_err();

        match err {
            StationError::Transport(e) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            next_event(&mut rx).await,
            NavEvent::Connection {
                state: ConnectionState::Disconnected
            }
        );
        assert!(matches!(next_event(&mut rx).await, NavEvent::Status { .. }));
        assert!(station.link.lock().await.is_none());

        let err = station.send(Message::Stop).await.unwrap_err();
        assert!(matches!(err, StationError::NotConnected));
    }

    #[tokio::test]
    async fn unregistered_listener_hears_nothing_more() {
        let (station, _transport, mut robot, mut kept_rx) = connected().await;
        let (dropped, mut dropped_rx) = ChannelListener::channel();
        let id = station.register_listener(Arc::new(dropped));

        station.unregister_listener(id);
        robot
            .write_all(&encode(&Message::Crash { x: 4.0, y: 5.0 }))
            .await
            .unwrap();

        assert_eq!(
            next_event(&mut kept_rx).await,
            NavEvent::Obstacle { x: 4, y: 5 }
        );
        assert!(dropped_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn explicit_disconnect_tells_robot() {
        let (station, _transport, mut robot, _rx) = connected().await;

        station.disconnect().await.unwrap();

        assert_eq!(read_record(&mut robot, 2).await, Message::Disconnect);
        assert_eq!(station.connection(), ConnectionState::Disconnected);
        let err = station.send(Message::Stop).await.unwrap_err();
        assert!(matches!(err, StationError::NotConnected));
    }

    #[tokio::test]
    async fn invalid_input_sends_nothing() {
        let (station, _transport, mut robot, _rx) = connected().await;
        let before = station.snapshot();

        let err = station
            .issue(&OperatorCommand::Goto(PointInput::new("10.5", "abc")))
            .await
            .unwrap_err();

        match err {
            StationError::Validation(e) => assert_eq!(e.field, Field::Y),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(station.snapshot(), before);

        // The next record on the wire is the following command.
        station.issue(&OperatorCommand::Stop).await.unwrap();
        assert_eq!(read_record(&mut robot, 2).await, Message::Stop);
    }

    #[tokio::test]
    async fn second_connect_is_refused() {
        let (station, transport, _robot, _rx) = connected().await;

        let err = station.connect("sim").await.unwrap_err();

        assert!(matches!(
            err,
            StationError::AlreadyActive(ConnectionState::Connected)
        ));
        assert_eq!(transport.connects(), 1);
    }

    #[tokio::test]
    async fn failed_connect_returns_to_disconnected() {
        let (station, _transport) = station(PipeTransport {
            fail: true,
            ..Default::default()
        });

        let err = station.connect("/dev/rfcomm0").await.unwrap_err();

        assert!(matches!(err, StationError::Transport(_)));
        assert_eq!(station.connection(), ConnectionState::Disconnected);
        assert_eq!(
            station.link_status().last_error.as_deref(),
            Some("no such device")
        );
    }

    #[tokio::test]
    async fn disconnect_during_connect_wins() {
        let gate = Arc::new(Notify::new());
        let (station, _transport) = station(PipeTransport {
            gate: Some(gate.clone()),
            ..Default::default()
        });

        let pending = tokio::spawn({
            let station = station.clone();
            async move { station.connect("sim").await }
        });
        while station.connection() != ConnectionState::Connecting {
            tokio::task::yield_now().await;
        }

        station.disconnect().await.unwrap();
        gate.notify_one();

        let err = pending.await.unwrap().unwrap_err();
        assert!(matches!(err, StationError::Cancelled(_)));
        assert_eq!(station.connection(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn reconnect_after_link_loss() {
        let (station, transport, robot, mut rx) = connected().await;
        robot_crash(&station, robot, &mut rx).await;

        station.connect("sim").await.unwrap();
        let _robot = transport.robot();

        assert_eq!(station.connection(), ConnectionState::Connected);
        assert!(station.with_state(|s| s.obstacles().is_empty()));
    }

    async fn robot_crash(
        station: &Station,
        mut robot: DuplexStream,
        rx: &mut mpsc::UnboundedReceiver<NavEvent>,
    ) {
        robot
            .write_all(&encode(&Message::Crash { x: 1.0, y: 1.0 }))
            .await
            .unwrap();
        assert_eq!(next_event(rx).await, NavEvent::Obstacle { x: 1, y: 1 });
        drop(robot);
        while station.connection() != ConnectionState::Disconnected {
            tokio::task::yield_now().await;
        }
    }
}
