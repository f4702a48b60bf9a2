//! Periodic per-port byte counter report.

use crate::config::{ConfigError, ConfigResult};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::{debug, info, warn};
use sdnfwd_common::TopologyAccessor;
use sdnfwd_types::{AttachmentPoint, DeviceId, PortNumber};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

const REPORT_RULE: &str = "=================================================";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PortByteCounters {
    pub bytes_received: u64,
    pub bytes_sent: u64,
}

impl PortByteCounters {
    pub const fn new(bytes_received: u64, bytes_sent: u64) -> Self {
        Self {
            bytes_received,
            bytes_sent,
        }
    }
}

/// Source of port counters. Either value may be unavailable.
pub trait PortStatsSource: Send + Sync {
    /// Cumulative counters.
    fn port_stats(&self, device: &DeviceId, port: PortNumber) -> Option<PortByteCounters>;

    /// Change since the previous sample.
    fn port_delta_stats(&self, device: &DeviceId, port: PortNumber) -> Option<PortByteCounters>;

    /// Takes a new sample. Called once per report.
    fn refresh(&self) {}
}

#[derive(Debug, Clone, Copy)]
struct PortSample {
    current: PortByteCounters,
    delta: Option<PortByteCounters>,
}

/// Counter store fed by samples; the delta is the difference to the
/// previous sample of the same port.
#[derive(Debug, Default)]
pub struct InMemoryPortStats {
    samples: DashMap<AttachmentPoint, PortSample>,
}

impl InMemoryPortStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, point: AttachmentPoint, counters: PortByteCounters) {
        match self.samples.entry(point) {
            Entry::Vacant(slot) => {
                slot.insert(PortSample {
                    current: counters,
                    delta: None,
                });
            }
            Entry::Occupied(mut slot) => {
                let sample = slot.get_mut();
                let previous = sample.current;
                sample.delta = Some(PortByteCounters::new(
                    counters.bytes_received.saturating_sub(previous.bytes_received),
                    counters.bytes_sent.saturating_sub(previous.bytes_sent),
                ));
                sample.current = counters;
            }
        }
    }
}

impl PortStatsSource for InMemoryPortStats {
    fn port_stats(&self, device: &DeviceId, port: PortNumber) -> Option<PortByteCounters> {
        self.samples
            .get(&AttachmentPoint::new(device.clone(), port))
            .map(|s| s.current)
    }

    fn port_delta_stats(&self, device: &DeviceId, port: PortNumber) -> Option<PortByteCounters> {
        self.samples
            .get(&AttachmentPoint::new(device.clone(), port))
            .and_then(|s| s.delta)
    }
}

/// One entry of a counter sample document.
///
/// ```json
/// [{"point": "of:0000000000000001/1", "bytesReceived": 1200, "bytesSent": 800}]
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortCounterSample {
    pub point: AttachmentPoint,
    pub bytes_received: u64,
    pub bytes_sent: u64,
}

/// Counters read from a sample document that an external collector
/// rewrites; every refresh re-reads it.
#[derive(Debug)]
pub struct FilePortStats {
    path: PathBuf,
    stats: InMemoryPortStats,
}

impl FilePortStats {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            stats: InMemoryPortStats::new(),
        }
    }

    /// Reads the document once and records every sample in it.
    pub fn sample(&self) -> ConfigResult<usize> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::io(&self.path, e))?;
        let samples: Vec<PortCounterSample> = serde_json::from_str(&text)?;
        let count = samples.len();
        for sample in samples {
            self.stats.record(
                sample.point,
                PortByteCounters::new(sample.bytes_received, sample.bytes_sent),
            );
        }
        debug!("Read {} port sample(s) from {}", count, self.path.display());
        Ok(count)
    }
}

impl PortStatsSource for FilePortStats {
    fn port_stats(&self, device: &DeviceId, port: PortNumber) -> Option<PortByteCounters> {
        self.stats.port_stats(device, port)
    }

    fn port_delta_stats(&self, device: &DeviceId, port: PortNumber) -> Option<PortByteCounters> {
        self.stats.port_delta_stats(device, port)
    }

    fn refresh(&self) {
        if let Err(e) = self.sample() {
            warn!("Port statistics sample failed: {}", e);
        }
    }
}

fn counter_columns(counters: Option<PortByteCounters>) -> String {
    match counters {
        Some(c) => format!("{:>10}{:>10}", c.bytes_received, c.bytes_sent),
        None => format!("{:>10}{:>10}", "n/a", "n/a"),
    }
}

/// Renders the report for every device, one line per entry.
pub fn render_report(topology: &dyn TopologyAccessor, source: &dyn PortStatsSource) -> Vec<String> {
    let mut lines = Vec::new();
    for device in topology.devices() {
        lines.push(format!("========= DeviceId {} =========", device));
        lines.push(format!(
            "{:<8}{:>10}{:>10}{:>10}{:>10}",
            "port", "rcvBytes", "sntBytes", "deltaRcv", "deltaSnt"
        ));
        for port in topology.ports(&device) {
            lines.push(format!(
                "{:<8}{}{}",
                port.to_string(),
                counter_columns(source.port_stats(&device, port)),
                counter_columns(source.port_delta_stats(&device, port)),
            ));
        }
        lines.push(REPORT_RULE.to_string());
    }
    lines
}

/// Logs the report every `period` until the task is aborted.
pub fn spawn_reporter(
    topology: Arc<dyn TopologyAccessor>,
    source: Arc<dyn PortStatsSource>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            source.refresh();
            for line in render_report(topology.as_ref(), source.as_ref()) {
                info!("{}", line);
            }
        }
    })
}
