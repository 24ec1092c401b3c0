//! UDP receive loop.
//!
//! One tokio task owns the socket and the only [`Tracker`]. Everything the
//! outside world sees goes through channels: lap records and tracker events
//! on bounded `mpsc` channels, raw packets on per-kind subscriptions, and
//! the latest [`TrackerSnapshot`] on a `watch` channel. Full channels drop
//! the message; the loop never waits on a consumer.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use paddock_tracker::{Ingest, LapRecord, Tracker, TrackerEvent, TrackerSnapshot};
use paddock_wire::{Classified, PacketKind, classify};
use parking_lot::Mutex;
use tokio::net::UdpSocket;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::config::ListenerConfig;
use crate::error::ListenerError;
use crate::packet::RawPacket;

/// Pause after a socket error before receiving again.
const RECV_ERROR_BACKOFF: Duration = Duration::from_millis(100);

type Subscribers = Arc<Mutex<HashMap<PacketKind, Vec<mpsc::Sender<RawPacket>>>>>;

fn add_subscriber(
    subscribers: &Subscribers,
    kind: PacketKind,
    capacity: usize,
) -> mpsc::Receiver<RawPacket> {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    subscribers.lock().entry(kind).or_default().push(tx);
    rx
}

/// A configured, not yet bound, telemetry listener.
#[derive(Debug)]
pub struct TelemetryListener {
    config: ListenerConfig,
    subscribers: Subscribers,
}

impl TelemetryListener {
    pub fn new(config: ListenerConfig) -> Self {
        Self {
            config,
            subscribers: Subscribers::default(),
        }
    }

    pub fn config(&self) -> &ListenerConfig {
        &self.config
    }

    /// Receive a copy of every accepted datagram of `kind`.
    pub fn subscribe(&self, kind: PacketKind) -> mpsc::Receiver<RawPacket> {
        add_subscriber(&self.subscribers, kind, self.config.channel_capacity)
    }

    /// Bind the socket and spawn the receive task.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid config or when the socket cannot be
    /// bound. Nothing is spawned in either case.
    pub async fn start(self) -> Result<ListenerHandle, ListenerError> {
        self.config.validate()?;
        let addr = self.config.bind_addr;
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| ListenerError::Bind { addr, source })?;
        let local_addr = socket
            .local_addr()
            .map_err(|source| ListenerError::Bind { addr, source })?;
        info!(%local_addr, "F1 22 UDP listener bound");

        let capacity = self.config.channel_capacity;
        let (laps_tx, laps_rx) = mpsc::channel(capacity);
        let (events_tx, events_rx) = mpsc::channel(capacity);
        let (snapshot_tx, snapshot_rx) = watch::channel(TrackerSnapshot::default());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let outputs = Outputs {
            laps: laps_tx,
            events: events_tx,
            snapshot: snapshot_tx,
            subscribers: Arc::clone(&self.subscribers),
        };
        let tracker = Tracker::new(self.config.tracker.clone());
        let task = tokio::spawn(receive_loop(
            socket,
            tracker,
            outputs,
            self.config.clone(),
            shutdown_rx,
        ));

        Ok(ListenerHandle {
            local_addr,
            capacity,
            laps: laps_rx,
            events: events_rx,
            snapshot: snapshot_rx,
            subscribers: self.subscribers,
            shutdown: shutdown_tx,
            task,
        })
    }
}

/// A running listener. Dropping the handle stops the receive task.
#[derive(Debug)]
pub struct ListenerHandle {
    local_addr: SocketAddr,
    capacity: usize,
    laps: mpsc::Receiver<LapRecord>,
    events: mpsc::Receiver<TrackerEvent>,
    snapshot: watch::Receiver<TrackerSnapshot>,
    subscribers: Subscribers,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<Tracker>,
}

impl ListenerHandle {
    /// The bound address; useful when the config asked for port 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Live and History lap records, in emission order.
    pub fn laps(&mut self) -> &mut mpsc::Receiver<LapRecord> {
        &mut self.laps
    }

    /// Every [`TrackerEvent`], in emission order.
    pub fn events(&mut self) -> &mut mpsc::Receiver<TrackerEvent> {
        &mut self.events
    }

    /// Tracker state as of the last received datagram.
    pub fn snapshot(&self) -> watch::Receiver<TrackerSnapshot> {
        self.snapshot.clone()
    }

    pub fn subscribe(&self, kind: PacketKind) -> mpsc::Receiver<RawPacket> {
        add_subscriber(&self.subscribers, kind, self.capacity)
    }

    /// Stop the receive task and hand back its tracker.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::Task`] if the receive task panicked.
    pub async fn shutdown(self) -> Result<Tracker, ListenerError> {
        // The task may already have stopped; the join below still succeeds.
        if self.shutdown.send(()).is_err() {
            debug!("receive task already stopped");
        }
        Ok(self.task.await?)
    }
}

/// Everything the receive task publishes to.
struct Outputs {
    laps: mpsc::Sender<LapRecord>,
    events: mpsc::Sender<TrackerEvent>,
    snapshot: watch::Sender<TrackerSnapshot>,
    subscribers: Subscribers,
}

impl Outputs {
    fn publish_raw(&self, classified: &Classified, raw: &[u8], source: SocketAddr) {
        let mut subscribers = self.subscribers.lock();
        let Some(senders) = subscribers.get_mut(&classified.kind) else {
            return;
        };
        senders.retain(|tx| {
            let packet = RawPacket {
                header: classified.header,
                kind: classified.kind,
                source,
                bytes: raw.to_vec(),
            };
            match tx.try_send(packet) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    debug!(kind = ?classified.kind, "subscriber channel full, packet dropped");
                    true
                }
                Err(TrySendError::Closed(_)) => false,
            }
        });
    }

    fn publish_events(&self, events: Vec<TrackerEvent>) {
        for event in events {
            if let Some(record) = event.lap_record() {
                match self.laps.try_send(record.clone()) {
                    Ok(()) | Err(TrySendError::Closed(_)) => {}
                    Err(TrySendError::Full(_)) => {
                        warn!(lap = record.lap_num, "lap channel full, record dropped");
                    }
                }
            }
            match self.events.try_send(event) {
                Ok(()) | Err(TrySendError::Closed(_)) => {}
                Err(TrySendError::Full(_)) => debug!("event channel full, event dropped"),
            }
        }
    }
}

async fn receive_loop(
    socket: UdpSocket,
    mut tracker: Tracker,
    outputs: Outputs,
    config: ListenerConfig,
    mut shutdown: oneshot::Receiver<()>,
) -> Tracker {
    let mut buf = vec![0u8; config.max_datagram_bytes];
    let recv_timeout = config.recv_timeout();
    let packet_format = config.tracker.packet_format;

    loop {
        let received = tokio::select! {
            _ = &mut shutdown => {
                info!("Listener shutdown requested");
                break;
            }
            result = tokio::time::timeout(recv_timeout, socket.recv_from(&mut buf)) => result,
        };

        let (len, source) = match received {
            Ok(Ok(received)) => received,
            Ok(Err(err)) => {
                warn!(error = %err, "F1 22 UDP receive error");
                tokio::time::sleep(RECV_ERROR_BACKOFF).await;
                continue;
            }
            Err(_elapsed) => {
                trace!("F1 22 UDP receive timeout");
                continue;
            }
        };
        let raw = buf.get(..len).unwrap_or_default();

        let ingest = match classify(raw, packet_format) {
            Ok(classified) => {
                outputs.publish_raw(&classified, raw, source);
                tracker.apply(&classified, raw)
            }
            Err(rejection) => tracker.reject(rejection, len),
        };
        if let Ingest::Applied(events) = ingest {
            outputs.publish_events(events);
        }
        outputs.snapshot.send_replace(tracker.snapshot());
    }

    let stats = tracker.stats();
    info!(
        received = stats.received,
        applied = stats.applied,
        rejected = stats.rejected,
        decode_errors = stats.decode_errors,
        out_of_order = stats.out_of_order,
        laps_finalized = stats.laps_finalized,
        "F1 22 UDP listener stopped"
    );
    drop(socket);
    tracker
}
