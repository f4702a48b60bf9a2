//! Flooding of frames whose destination is unknown.

use clap::ValueEnum;
use log::debug;
use sdnfwd_common::{InboundPacket, PacketIo, TopologyAccessor};
use sdnfwd_types::{AttachmentPoint, PortNumber};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a non-broadcast ingress point is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FloodMode {
    /// Always flood; the broadcast-point check is diagnostic only.
    #[default]
    Compatible,
    /// Flood only from broadcast points, drop everything else.
    Strict,
}

impl fmt::Display for FloodMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FloodMode::Compatible => f.write_str("compatible"),
            FloodMode::Strict => f.write_str("strict"),
        }
    }
}

/// What [`flood`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloodOutcome {
    pub broadcast_point: bool,
    pub blocked: bool,
}

pub fn should_flood(topology: &dyn TopologyAccessor, point: &AttachmentPoint) -> bool {
    topology.is_broadcast_point(point)
}

/// Floods `packet` out of its ingress device according to `mode`.
pub fn flood(
    topology: &dyn TopologyAccessor,
    packet_io: &dyn PacketIo,
    packet: &InboundPacket,
    mode: FloodMode,
) -> FloodOutcome {
    let broadcast_point = should_flood(topology, &packet.received_from);

    debug!(
        "Flooding {} -> {} from {} (broadcast point: {}, mode: {})",
        packet.frame.src, packet.frame.dst, packet.received_from, broadcast_point, mode
    );

    match mode {
        FloodMode::Compatible => {
            packet_io.send_out(packet, PortNumber::Flood);
            FloodOutcome {
                broadcast_point,
                blocked: false,
            }
        }
        FloodMode::Strict if broadcast_point => {
            packet_io.send_out(packet, PortNumber::Flood);
            FloodOutcome {
                broadcast_point,
                blocked: false,
            }
        }
        FloodMode::Strict => {
            packet_io.block(packet);
            FloodOutcome {
                broadcast_point,
                blocked: true,
            }
        }
    }
}
