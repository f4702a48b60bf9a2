//! Links and paths.

use crate::{AttachmentPoint, DeviceId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A unidirectional infrastructure link between two device ports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Link {
    pub src: AttachmentPoint,
    pub dst: AttachmentPoint,
}

impl Link {
    pub fn new(src: AttachmentPoint, dst: AttachmentPoint) -> Self {
        Self { src, dst }
    }

    /// The same link traversed in the opposite direction.
    pub fn reversed(&self) -> Self {
        Self {
            src: self.dst.clone(),
            dst: self.src.clone(),
        }
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.src, self.dst)
    }
}

/// An ordered sequence of links from a source device to a destination device.
///
/// Consecutive links are expected to chain (`links[i].dst.device ==
/// links[i + 1].src.device`); the topology service is the only producer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path {
    links: Vec<Link>,
}

impl Path {
    pub fn new(links: Vec<Link>) -> Self {
        Self { links }
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Number of links traversed.
    pub fn hop_count(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Egress attachment point on the source device.
    pub fn src(&self) -> Option<&AttachmentPoint> {
        self.links.first().map(|l| &l.src)
    }

    /// Ingress attachment point on the destination device.
    pub fn dst(&self) -> Option<&AttachmentPoint> {
        self.links.last().map(|l| &l.dst)
    }

    /// Devices visited, source first.
    pub fn devices(&self) -> Vec<&DeviceId> {
        let mut devices: Vec<&DeviceId> = self.links.iter().map(|l| &l.src.device).collect();
        if let Some(last) = self.links.last() {
            devices.push(&last.dst.device);
        }
        devices
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hops: Vec<String> = self.devices().iter().map(|d| d.to_string()).collect();
        write!(f, "[{}]", hops.join(" -> "))
    }
}
