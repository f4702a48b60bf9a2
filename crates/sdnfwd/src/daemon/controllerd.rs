//! ControllerDaemon implementation.
//!
//! The daemon owns the receiving end of the event channel. Packet-in and
//! topology events are handled on their own tokio tasks so a slow handler
//! never holds up the next packet-in. Configuration events are handled
//! inline, in arrival order, so the last one for a key wins. Stopping closes
//! the channel, handles whatever was already queued and waits for in-flight
//! handlers to finish.

use crate::controller::PacketEventController;
use log::{debug, error, info};
use sdnfwd_common::ControllerEvent;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinSet;

pub type ControllerResult<T> = Result<T, ControllerError>;

#[derive(Debug, Error)]
pub enum ControllerError {
    /// The daemon has stopped and no longer accepts events.
    #[error("Controller event channel is closed")]
    ChannelClosed,

    #[error("Controller event channel is full (capacity {capacity})")]
    ChannelFull { capacity: usize },
}

/// Configuration for the ControllerDaemon.
#[derive(Debug, Clone)]
pub struct ControllerDaemonConfig {
    /// Events buffered before senders wait
    pub channel_capacity: usize,
}

impl Default for ControllerDaemonConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
        }
    }
}

/// Cloneable handle feeding events into a [`ControllerDaemon`].
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::Sender<ControllerEvent>,
    capacity: usize,
}

impl EventSender {
    /// Queues an event, waiting for room in the channel.
    pub async fn send(&self, event: ControllerEvent) -> ControllerResult<()> {
        self.tx
            .send(event)
            .await
            .map_err(|_| ControllerError::ChannelClosed)
    }

    /// Queues an event without waiting.
    pub fn try_send(&self, event: ControllerEvent) -> ControllerResult<()> {
        self.tx.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => ControllerError::ChannelFull {
                capacity: self.capacity,
            },
            mpsc::error::TrySendError::Closed(_) => ControllerError::ChannelClosed,
        })
    }
}

/// Stops a running daemon from another task.
#[derive(Debug, Clone)]
pub struct StopHandle {
    shutdown: Arc<Notify>,
}

impl StopHandle {
    pub fn stop(&self) {
        info!("Stopping ControllerDaemon");
        // A stop issued before run() starts waiting is kept as a permit.
        self.shutdown.notify_one();
    }
}

/// The controller daemon.
pub struct ControllerDaemon {
    config: ControllerDaemonConfig,
    controller: Arc<PacketEventController>,
    tx: mpsc::Sender<ControllerEvent>,
    rx: mpsc::Receiver<ControllerEvent>,
    shutdown: Arc<Notify>,
    running: Arc<AtomicBool>,
    handled: Arc<AtomicU64>,
}

impl ControllerDaemon {
    pub fn new(config: ControllerDaemonConfig, controller: Arc<PacketEventController>) -> Self {
        let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
        Self {
            config,
            controller,
            tx,
            rx,
            shutdown: Arc::new(Notify::new()),
            running: Arc::new(AtomicBool::new(false)),
            handled: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn controller(&self) -> Arc<PacketEventController> {
        Arc::clone(&self.controller)
    }

    pub fn event_sender(&self) -> EventSender {
        EventSender {
            tx: self.tx.clone(),
            capacity: self.config.channel_capacity.max(1),
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            shutdown: Arc::clone(&self.shutdown),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn events_handled(&self) -> u64 {
        self.handled.load(Ordering::Relaxed)
    }

    /// Runs the event loop until [`StopHandle::stop`] is called.
    pub async fn run(&mut self) {
        info!(
            "Starting ControllerDaemon event loop (channel capacity {})",
            self.config.channel_capacity
        );
        self.running.store(true, Ordering::Release);

        let shutdown = Arc::clone(&self.shutdown);
        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                _ = shutdown.notified() => break,
                event = self.rx.recv() => match event {
                    Some(event) => self.dispatch(&mut tasks, event),
                    None => break,
                },
            }
            while let Some(result) = tasks.try_join_next() {
                reap(result);
            }
        }

        self.rx.close();
        let mut drained = 0usize;
        while let Ok(event) = self.rx.try_recv() {
            self.dispatch(&mut tasks, event);
            drained += 1;
        }
        if drained > 0 {
            debug!("Handled {} queued event(s) after stop", drained);
        }
        while let Some(result) = tasks.join_next().await {
            reap(result);
        }

        self.running.store(false, Ordering::Release);
        info!(
            "ControllerDaemon event loop stopped after {} event(s)",
            self.events_handled()
        );
    }

    fn dispatch(&self, tasks: &mut JoinSet<()>, event: ControllerEvent) {
        if let ControllerEvent::ConfigChanged(_) = &event {
            let decision = self.controller.handle(&event);
            debug!("{} event -> {:?}", event.kind(), decision);
            self.handled.fetch_add(1, Ordering::Relaxed);
            return;
        }
        let controller = Arc::clone(&self.controller);
        let handled = Arc::clone(&self.handled);
        tasks.spawn(async move {
            let decision = controller.handle(&event);
            debug!("{} event -> {:?}", event.kind(), decision);
            handled.fetch_add(1, Ordering::Relaxed);
        });
    }

    /// Human-readable state, one line per item.
    pub fn dump(&self) -> Vec<String> {
        let learning = self.controller.learning();
        let mut lines = vec![
            format!("running: {}", self.is_running()),
            format!("mode: {}", self.controller.config().mode),
            format!("events_handled: {}", self.events_handled()),
            format!(
                "learned_macs: {} on {} device(s)",
                learning.total_entries(),
                learning.device_count()
            ),
            format!(
                "segments: {}",
                self.controller.netcfg().snapshot().segments.len()
            ),
        ];
        if let Some(server) = self.controller.dhcp().server_location() {
            lines.push(format!("dhcp_server: {}", server));
        }
        lines.extend(
            self.controller
                .stats()
                .fields()
                .iter()
                .map(|(name, value)| format!("{}: {}", name, value)),
        );
        lines
    }
}

fn reap(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        error!("Event handler task failed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControllerConfig;
    use crate::controller::Collaborators;
    use crate::inventory::InMemoryInventory;
    use crate::testing::{RecordingPacketIo, RecordingRuleInstaller};
    use sdnfwd_common::{EthernetFrame, InboundPacket};
    use sdnfwd_types::{AttachmentPoint, DeviceId, EtherType, MacAddress};

    fn daemon(capacity: usize) -> ControllerDaemon {
        let mut inv = InMemoryInventory::new();
        inv.add_device(DeviceId::from_dpid(1), vec![1u32.into(), 2u32.into()]);
        let inv = Arc::new(inv);
        let controller = PacketEventController::new(
            ControllerConfig::default(),
            Collaborators {
                topology: inv.clone(),
                hosts: inv,
                installer: Arc::new(RecordingRuleInstaller::new()),
                packet_io: Arc::new(RecordingPacketIo::new()),
            },
        );
        ControllerDaemon::new(
            ControllerDaemonConfig {
                channel_capacity: capacity,
            },
            Arc::new(controller),
        )
    }

    fn packet_in(port: u32, src: u8, dst: u8) -> ControllerEvent {
        ControllerEvent::PacketIn(InboundPacket::new(
            AttachmentPoint::new(DeviceId::from_dpid(1), port),
            EthernetFrame {
                src: MacAddress::new([0, 0, 0, 0, 0, src]),
                dst: MacAddress::new([0, 0, 0, 0, 0, dst]),
                ether_type: EtherType::IPV4,
                vlan: None,
            },
        ))
    }

    #[tokio::test]
    async fn test_queued_events_are_handled_before_stop_completes() {
        let mut daemon = daemon(16);
        let sender = daemon.event_sender();

        sender.send(packet_in(1, 1, 2)).await.unwrap();
        sender.send(packet_in(2, 2, 1)).await.unwrap();
        daemon.stop_handle().stop();
        daemon.run().await;

        assert_eq!(daemon.events_handled(), 2);
        assert!(!daemon.is_running());
        let stats = daemon.controller().stats();
        assert_eq!(stats.packets_in, 2);
        assert_eq!(stats.learned, 2);
        assert!(daemon.dump().contains(&"learned_macs: 2 on 1 device(s)".to_string()));
    }

    #[tokio::test]
    async fn test_stop_from_another_task() {
        let mut daemon = daemon(16);
        let sender = daemon.event_sender();
        let stop = daemon.stop_handle();

        let producer = tokio::spawn(async move {
            for i in 0..10u8 {
                sender.send(packet_in(1, i + 1, 0xff)).await.unwrap();
            }
            stop.stop();
        });
        daemon.run().await;
        producer.await.unwrap();

        assert_eq!(daemon.events_handled(), 10);
    }

    #[test]
    fn test_try_send_reports_full_channel() {
        let daemon = daemon(1);
        let sender = daemon.event_sender();

        sender.try_send(packet_in(1, 1, 2)).unwrap();
        let err = sender.try_send(packet_in(1, 3, 4)).unwrap_err();

        assert!(matches!(err, ControllerError::ChannelFull { capacity: 1 }));
    }
}
