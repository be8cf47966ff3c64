//! LAN host discovery — sweeps the local /24 for reachable servers.
//!
//! Each scan probes host suffixes 1–254 of the local network prefix with a
//! bounded pool of concurrent pings, resolves names for the hosts that
//! answer, and produces a snapshot with the local host always first. A
//! probe that times out, is filtered, or cannot even spawn is simply "not
//! found" — the sweep itself never fails.

use futures::stream::{self, StreamExt};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::registry::{ServerRecord, ServerRegistry};

/// Cap on concurrently in-flight probes during a sweep.
const MAX_IN_FLIGHT_PROBES: usize = 50;

/// Upper bound on a single probe, a little above ping's own 1 s wait.
const PROBE_TIMEOUT: Duration = Duration::from_millis(1500);

/// Determine the address this host would use to reach the LAN.
///
/// Connecting a UDP socket sends no packets; it only asks the routing
/// table which local address would be picked. Falls back to loopback when
/// routing gives no answer.
pub fn detect_local_ip() -> Ipv4Addr {
    let detected = UdpSocket::bind(("0.0.0.0", 0)).and_then(|socket| {
        socket.connect(("10.255.255.255", 1))?;
        socket.local_addr()
    });
    match detected {
        Ok(SocketAddr::V4(addr)) => *addr.ip(),
        Ok(SocketAddr::V6(_)) => {
            warn!("Local address detection returned IPv6, falling back to loopback");
            Ipv4Addr::LOCALHOST
        }
        Err(e) => {
            warn!("Local address detection failed ({}), falling back to loopback", e);
            Ipv4Addr::LOCALHOST
        }
    }
}

/// Enumerate the /24 around `local`: host suffixes 1–254, the local
/// address itself excluded.
pub fn scan_candidates(local: Ipv4Addr) -> Vec<Ipv4Addr> {
    let [a, b, c, _] = local.octets();
    (1..=254)
        .map(|d| Ipv4Addr::new(a, b, c, d))
        .filter(|ip| *ip != local)
        .collect()
}

/// Check whether a single address answers an echo request.
///
/// Any failure — non-zero exit, missing ping binary, timeout — counts as
/// unreachable. A slow or filtered host is reported missing rather than
/// allowed to stall the sweep.
pub async fn probe(addr: Ipv4Addr) -> bool {
    let ping = Command::new("ping")
        .args(["-c", "1", "-W", "1"])
        .arg(addr.to_string())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    match timeout(PROBE_TIMEOUT, ping).await {
        Ok(Ok(status)) => status.success(),
        _ => false,
    }
}

/// Best-effort reverse lookup; the dotted-quad string when nothing
/// resolves.
pub async fn resolve_hostname(addr: Ipv4Addr) -> String {
    let ip = IpAddr::V4(addr);
    match tokio::task::spawn_blocking(move || dns_lookup::lookup_addr(&ip)).await {
        Ok(Ok(name)) => name,
        _ => addr.to_string(),
    }
}

fn local_hostname(local_ip: Ipv4Addr) -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| local_ip.to_string())
}

/// Run one full sweep of the local /24 and return the snapshot.
///
/// The local host is always the first record; discovered hosts follow in
/// completion order.
pub async fn scan() -> Vec<ServerRecord> {
    let local_ip = detect_local_ip();
    let [a, b, c, _] = local_ip.octets();
    info!("Scanning {}.{}.{}.1-254 from {}", a, b, c, local_ip);

    let mut servers = vec![ServerRecord {
        ip: local_ip.to_string(),
        hostname: local_hostname(local_ip),
        is_local: true,
    }];

    let found: Vec<ServerRecord> = stream::iter(scan_candidates(local_ip))
        .map(|candidate| async move {
            if !probe(candidate).await {
                return None;
            }
            let hostname = resolve_hostname(candidate).await;
            debug!("Found server {} ({})", candidate, hostname);
            Some(ServerRecord {
                ip: candidate.to_string(),
                hostname,
                is_local: false,
            })
        })
        .buffer_unordered(MAX_IN_FLIGHT_PROBES)
        .filter_map(|record| async move { record })
        .collect()
        .await;

    servers.extend(found);
    servers
}

/// Scan and install the result. Overlapping scans are tolerated: the
/// registry write is the serialization point, last writer wins.
pub async fn run_scan(registry: Arc<ServerRegistry>) {
    let snapshot = scan().await;
    registry.replace_snapshot(snapshot);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_cover_the_range_except_self() {
        let local = Ipv4Addr::new(192, 168, 1, 50);
        let candidates = scan_candidates(local);
        assert_eq!(candidates.len(), 253);
        assert!(!candidates.contains(&local));
        assert!(candidates.contains(&Ipv4Addr::new(192, 168, 1, 1)));
        assert!(candidates.contains(&Ipv4Addr::new(192, 168, 1, 254)));
        assert!(candidates.iter().all(|ip| ip.octets()[..3] == [192, 168, 1]));
    }

    #[test]
    fn candidates_on_loopback_fallback() {
        let candidates = scan_candidates(Ipv4Addr::LOCALHOST);
        assert_eq!(candidates.len(), 253);
        assert!(!candidates.contains(&Ipv4Addr::LOCALHOST));
    }
}
