//! Port connection by geometric coincidence
//!
//! Two ports are connected when their locations are exactly equal. Three
//! interchangeable algorithms are provided; all of them emit every unordered
//! coincident pair exactly once, as `(lower handle, higher handle)`, sorted.

use std::hash::{Hash, Hasher};

use log::info;
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHasher};
use serde::{Deserialize, Serialize};

use crate::core::network::{Location, Network, PortId};

/// Algorithm used to detect coincident ports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStrategy {
    /// O(n²) comparison of every pair
    Pairwise,
    /// Hash ports by location, connect within each group
    #[default]
    Grouped,
    /// Grouped, with location shards processed on the rayon pool
    Parallel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionStats {
    pub ports_found: usize,
    /// Pairs added by this run (pairs already present are not counted)
    pub connections_made: usize,
}

/// Baseline scan: compare every unordered pair once, no boundary ports skipped
pub fn connect_ports_pairwise(network: &Network) -> Vec<(PortId, PortId)> {
    let ports: Vec<PortId> = network.port_ids().collect();
    let mut pairs = Vec::new();

    for (index, &port1) in ports.iter().enumerate() {
        let location1 = &network.port(port1).location;
        for &port2 in &ports[index + 1..] {
            if *location1 == network.port(port2).location {
                pairs.push((port1, port2));
            }
        }
    }

    pairs.sort_unstable();
    pairs
}

/// Group ports by location and emit the full pairwise set of each group
pub fn connect_ports_grouped(network: &Network) -> Vec<(PortId, PortId)> {
    let ports: Vec<PortId> = network.port_ids().collect();
    let mut pairs = pairs_by_location(network, &ports);
    pairs.sort_unstable();
    pairs
}

/// Shard ports by location hash and group each shard in parallel.
/// Coincident ports always land in the same shard.
pub fn connect_ports_parallel(network: &Network) -> Vec<(PortId, PortId)> {
    let n_shards = rayon::current_num_threads().max(1);
    let mut shards: Vec<Vec<PortId>> = vec![Vec::new(); n_shards];
    for port in network.port_ids() {
        let shard = (location_hash(&network.port(port).location) % n_shards as u64) as usize;
        shards[shard].push(port);
    }

    let mut pairs: Vec<(PortId, PortId)> = shards
        .par_iter()
        .flat_map_iter(|shard| pairs_by_location(network, shard))
        .collect();
    pairs.sort_unstable();
    pairs
}

/// Detect coincident ports with the given strategy and store the pairs
pub fn build_connections(network: &mut Network, strategy: ConnectionStrategy) -> ConnectionStats {
    let ports_found = network.port_count();
    info!("Setting the connections between ports");
    info!("    {}", ports_count_message(ports_found));

    let pairs = match strategy {
        ConnectionStrategy::Pairwise => connect_ports_pairwise(network),
        ConnectionStrategy::Grouped => connect_ports_grouped(network),
        ConnectionStrategy::Parallel => connect_ports_parallel(network),
    };

    let mut connections_made = 0;
    for (a, b) in pairs {
        if network.connect(a, b) {
            connections_made += 1;
        }
    }
    info!("    {connections_made} ports connected");

    ConnectionStats {
        ports_found,
        connections_made,
    }
}

/// "no ports found", "1 port found", "12 ports found"
pub fn ports_count_message(count: usize) -> String {
    match count {
        0 => "no ports found".to_string(),
        1 => "1 port found".to_string(),
        n => format!("{n} ports found"),
    }
}

/// Pairs within `ports` sharing a location. `ports` must be in ascending order.
fn pairs_by_location(network: &Network, ports: &[PortId]) -> Vec<(PortId, PortId)> {
    let mut groups: FxHashMap<&Location, Vec<PortId>> = FxHashMap::default();
    for &port in ports {
        groups
            .entry(&network.port(port).location)
            .or_default()
            .push(port);
    }

    let mut pairs = Vec::new();
    for group in groups.values().filter(|g| g.len() > 1) {
        for (i, &a) in group.iter().enumerate() {
            for &b in &group[i + 1..] {
                pairs.push((a, b));
            }
        }
    }
    pairs
}

fn location_hash(location: &Location) -> u64 {
    let mut hasher = FxHasher::default();
    location.hash(&mut hasher);
    hasher.finish()
}
