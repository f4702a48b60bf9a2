//! Interfaces to the services the core depends on.
//!
//! All of them must be `Send + Sync`: handlers run concurrently on a worker
//! pool and share one instance of each collaborator.

use crate::{AppId, InboundPacket, RuleDescriptor};
use sdnfwd_types::{AttachmentPoint, DeviceId, Host, MacAddress, Path, PortNumber};

/// Read-only view of the current topology.
pub trait TopologyAccessor: Send + Sync {
    /// Available devices, in a stable order.
    fn devices(&self) -> Vec<DeviceId>;

    fn ports(&self, device: &DeviceId) -> Vec<PortNumber>;

    /// Candidate paths from `src` to `dst`, in the accessor's preference order.
    fn paths(&self, src: &DeviceId, dst: &DeviceId) -> Vec<Path>;

    /// Whether flooding out of / into this point is loop-free.
    fn is_broadcast_point(&self, point: &AttachmentPoint) -> bool;
}

pub trait HostDirectory: Send + Sync {
    fn locate(&self, mac: &MacAddress) -> Option<Host>;

    fn hosts_on(&self, device: &DeviceId) -> Vec<Host>;
}

/// Rule installation backend.
///
/// Both calls are asynchronous on the backend side; failures are never
/// reported back.
pub trait RuleInstaller: Send + Sync {
    fn install(&self, rule: RuleDescriptor);

    fn remove_all_by_owner(&self, owner: &AppId);
}

pub trait PacketIo: Send + Sync {
    /// Emits the punted frame out of `port` on its ingress device.
    fn send_out(&self, packet: &InboundPacket, port: PortNumber);

    /// Drops the punted frame.
    fn block(&self, packet: &InboundPacket);
}
