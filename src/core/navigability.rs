//! Navigability resolution between connected ports
//!
//! Each port is classified by the number of ports connected to it:
//! - 0: dead end, nothing to do
//! - 1: malformed, reported
//! - 2: switch, every pair judged on its own geometry
//! - 3: crossing, double slip (as a switch) or diamond (straightest pair only)
//! - 4+: unsupported
//!
//! Resolution reads the network only, so every port is planned on the rayon
//! pool; plans are then applied one port at a time in handle order.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{error, info};
use rayon::prelude::*;

use crate::core::config::{CrossingMode, FailurePolicy, InferenceConfig};
use crate::core::error::{Error, Result};
use crate::core::geometry::{
    deviation_angle, possible_navigability_within, UNRESOLVED_DEVIATION_DEG,
};
use crate::core::network::{EdgeWrite, Navigability, Network, Opposite, PortId};
use crate::core::report::{dedup_diagnostics, Diagnostic, DiagnosticKind};

/// Local topology of a port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortClass {
    DeadEnd,
    SingleConnection,
    Switch,
    Crossing,
}

/// Edges and diagnostics produced for a single port
#[derive(Debug, Clone)]
pub struct PortPlan {
    pub port: PortId,
    pub class: PortClass,
    pub writes: Vec<(PortId, PortId, Navigability)>,
    pub diagnostics: Vec<Diagnostic>,
}

impl PortPlan {
    fn new(port: PortId, class: PortClass) -> Self {
        Self {
            port,
            class,
            writes: Vec::new(),
            diagnostics: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigabilityStats {
    pub dead_ends: usize,
    pub switches: usize,
    pub crossings: usize,
    pub navigable_edges: usize,
    pub non_navigable_edges: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Index of the navigable candidate at a diamond crossing, if any.
///
/// The straightest candidate wins (first one on ties), but only when its
/// absolute deviation is below the threshold.
pub fn diamond_winner(deviations: &[f64], threshold_deg: f64) -> Option<usize> {
    deviations
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .filter(|(_, deviation)| **deviation < threshold_deg)
        .map(|(index, _)| index)
}

/// Plan the navigability edges around one port
pub fn resolve_port(network: &Network, port: PortId, config: &InferenceConfig) -> Result<PortPlan> {
    let connected = network.connected_ports(port);
    match connected.len() {
        0 => Ok(PortPlan::new(port, PortClass::DeadEnd)),
        1 => {
            let mut plan = PortPlan::new(port, PortClass::SingleConnection);
            let name = &network.port(port).name;
            plan.diagnostics.push(
                Diagnostic::warning(
                    DiagnosticKind::SingleConnection,
                    format!(
                        "Port {name} has exactly 1 other port connected ({}); should be 0 or >= 2.",
                        network.port(connected[0]).name
                    ),
                )
                .with_port(name.clone()),
            );
            Ok(plan)
        }
        2 => resolve_pairs(network, port, &connected, PortClass::Switch, config),
        3 => match config.crossing_mode {
            CrossingMode::DoubleSlip => {
                resolve_pairs(network, port, &connected, PortClass::Crossing, config)
            }
            CrossingMode::Diamond => resolve_diamond(network, port, &connected, config),
        },
        degree => Err(Error::UnsupportedDegree {
            port: network.port(port).name.clone(),
            degree,
        }),
    }
}

/// Switch or double slip crossing: each connected port is judged on its own
fn resolve_pairs(
    network: &Network,
    port: PortId,
    connected: &[PortId],
    class: PortClass,
    config: &InferenceConfig,
) -> Result<PortPlan> {
    let mut plan = PortPlan::new(port, class);
    let own_opposite = lookup_opposite(network, port, &mut plan)?;
    let azimuth = network.port(port).azimuth;
    let mut own_opposite_needed = false;

    for &other in connected {
        let Some(opposite) = neighbour_opposite(network, other, &mut plan) else {
            continue;
        };

        let verdict = verdict_for(possible_navigability_within(
            azimuth,
            network.port(other).azimuth,
            config.threshold_deg,
        ));
        plan.writes.push((port, opposite, verdict));

        // Connections are read symmetrized, so the mirrored edge is written here too
        match own_opposite {
            Some(own) => plan.writes.push((other, own, verdict)),
            None => own_opposite_needed = true,
        }
    }

    if own_opposite_needed {
        plan.diagnostics.push(missing_opposite(network, port));
    }
    Ok(plan)
}

/// Diamond crossing: only the straightest pair can be navigable
fn resolve_diamond(
    network: &Network,
    port: PortId,
    connected: &[PortId],
    config: &InferenceConfig,
) -> Result<PortPlan> {
    let mut plan = PortPlan::new(port, PortClass::Crossing);
    let own_opposite = lookup_opposite(network, port, &mut plan)?;
    let azimuth = network.port(port).azimuth;

    let mut opposites = Vec::with_capacity(connected.len());
    let mut deviations = Vec::with_capacity(connected.len());
    for &other in connected {
        let opposite = neighbour_opposite(network, other, &mut plan);
        let deviation = match opposite {
            Some(_) => deviation_angle(azimuth, network.port(other).azimuth).abs(),
            None => UNRESOLVED_DEVIATION_DEG,
        };
        opposites.push(opposite);
        deviations.push(deviation);
    }

    let winner = diamond_winner(&deviations, config.threshold_deg);
    for (index, (&other, opposite)) in connected.iter().zip(opposites).enumerate() {
        let verdict = verdict_for(winner == Some(index));
        if let Some(opposite) = opposite {
            plan.writes.push((port, opposite, verdict));
        }
        if let Some(own) = own_opposite {
            plan.writes.push((other, own, verdict));
        }
    }

    if own_opposite.is_none() {
        plan.diagnostics.push(missing_opposite(network, port));
    }
    Ok(plan)
}

/// Opposite port, with a warning when the owner is not a linear element.
/// Structural violations propagate.
fn lookup_opposite(network: &Network, port: PortId, plan: &mut PortPlan) -> Result<Option<PortId>> {
    match network.opposite_port(port)? {
        Opposite::Found(opposite) => Ok(Some(opposite)),
        Opposite::NonLinear(element) => {
            let element_name = &network.element(element).name;
            let port_name = &network.port(port).name;
            plan.diagnostics.push(
                Diagnostic::warning(
                    DiagnosticKind::NonLinearOwner,
                    format!(
                        "Looking for an opposite port of {port_name} on non-linear element {element_name}"
                    ),
                )
                .with_port(port_name.clone())
                .with_element(element_name.clone()),
            );
            Ok(None)
        }
    }
}

/// Opposite of a connected port, or `None` with the reason recorded.
/// A structural violation on the neighbour only removes that neighbour from
/// the plan.
fn neighbour_opposite(network: &Network, other: PortId, plan: &mut PortPlan) -> Option<PortId> {
    match lookup_opposite(network, other, plan) {
        Ok(Some(opposite)) => Some(opposite),
        Ok(None) => {
            plan.diagnostics.push(missing_opposite(network, other));
            None
        }
        Err(err) => {
            plan.diagnostics.extend(Diagnostic::from_error(&err));
            None
        }
    }
}

fn missing_opposite(network: &Network, port: PortId) -> Diagnostic {
    let name = &network.port(port).name;
    Diagnostic::error(
        DiagnosticKind::MissingOpposite,
        format!("Port {name} has no opposite port on the linear element it belongs to."),
    )
    .with_port(name.clone())
}

fn verdict_for(navigable: bool) -> Navigability {
    if navigable {
        Navigability::Navigable
    } else {
        Navigability::NonNavigable
    }
}

/// Resolve navigabilities for every port and write them into the network.
///
/// Under [`FailurePolicy::FailFast`] an unsupported topology aborts before
/// anything is written.
pub fn resolve_navigabilities(network: &mut Network, config: &InferenceConfig) -> Result<NavigabilityStats> {
    info!("Setting the navigabilities between ports.");
    info!("All crossings are deemed to be {}.", config.crossing_mode);

    let ports: Vec<PortId> = network.port_ids().collect();
    let total = ports.len() as u64;
    let resolved = AtomicU64::new(0);

    let plans: Vec<Result<PortPlan>> = {
        let network: &Network = network;
        ports
            .par_iter()
            .map(|&port| {
                let plan = resolve_port(network, port, config);
                let done = resolved.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(ref progress) = config.progress {
                    progress(done, total);
                }
                plan
            })
            .collect()
    };

    let mut stats = NavigabilityStats::default();
    let mut accepted = Vec::with_capacity(plans.len());
    for plan in plans {
        match plan {
            Ok(plan) => accepted.push(plan),
            Err(err) if err.is_structural() => {
                stats.diagnostics.extend(Diagnostic::from_error(&err));
            }
            Err(err) => match config.failure_policy {
                FailurePolicy::FailFast => {
                    error!("{err}");
                    return Err(err);
                }
                FailurePolicy::BestEffort => {
                    stats.diagnostics.extend(Diagnostic::from_error(&err));
                }
            },
        }
    }

    let mut touched = BTreeSet::new();
    for plan in accepted {
        match plan.class {
            PortClass::DeadEnd => stats.dead_ends += 1,
            PortClass::Switch => stats.switches += 1,
            PortClass::Crossing => stats.crossings += 1,
            PortClass::SingleConnection => {}
        }
        stats.diagnostics.extend(plan.diagnostics);

        for (from, to, verdict) in plan.writes {
            touched.insert((from, to));
            if network.set_navigability(from, to, verdict) == EdgeWrite::Conflict {
                let from_name = &network.port(from).name;
                let to_name = &network.port(to).name;
                stats.diagnostics.push(
                    Diagnostic::warning(
                        DiagnosticKind::ConflictingNavigability,
                        format!(
                            "Conflicting navigability from {from_name} to {to_name}; kept as non-navigable"
                        ),
                    )
                    .with_port(from_name.clone()),
                );
            }
        }
    }

    for &(from, to) in &touched {
        match network.navigability(from, to) {
            Some(Navigability::Navigable) => stats.navigable_edges += 1,
            Some(Navigability::NonNavigable) => stats.non_navigable_edges += 1,
            None => {}
        }
    }

    // Neighbouring ports meet the same faulty port from every side
    dedup_diagnostics(&mut stats.diagnostics);
    for diagnostic in &stats.diagnostics {
        diagnostic.log();
    }
    info!(
        "Navigabilities were determined: {} navigable, {} non-navigable.",
        stats.navigable_edges, stats.non_navigable_edges
    );

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::network::{ElementKind, Location};

    /// Builder for small hand-drawn networks: tracks with one port at a
    /// shared junction and one at a private far end.
    struct Junction {
        net: Network,
        near: Vec<PortId>,
        far: Vec<PortId>,
    }

    impl Junction {
        /// One track per azimuth, near ports all at the origin, not connected
        fn tracks(azimuths: &[f64]) -> Self {
            let mut net = Network::new();
            let mut near = Vec::new();
            let mut far = Vec::new();
            for (i, &azimuth) in azimuths.iter().enumerate() {
                let e = net.add_element(format!("t{i}"), ElementKind::Linear).unwrap();
                near.push(
                    net.add_port(format!("t{i}_near"), &[e], Location::point(0.0, 0.0), azimuth)
                        .unwrap(),
                );
                far.push(
                    net.add_port(
                        format!("t{i}_far"),
                        &[e],
                        Location::point(i as f64 + 1.0, 1.0),
                        (azimuth + 180.0) % 360.0,
                    )
                    .unwrap(),
                );
            }
            Self { net, near, far }
        }

        /// Same, with every pair of near ports connected
        fn new(azimuths: &[f64]) -> Self {
            let mut junction = Self::tracks(azimuths);
            for i in 0..junction.near.len() {
                for j in i + 1..junction.near.len() {
                    junction.net.connect(junction.near[i], junction.near[j]);
                }
            }
            junction
        }
    }

    fn config(mode: CrossingMode) -> InferenceConfig {
        InferenceConfig {
            crossing_mode: mode,
            ..Default::default()
        }
    }

    #[test]
    fn test_diamond_winner() {
        assert_eq!(diamond_winner(&[5.0, 20.0, 40.0], 30.0), Some(0));
        assert_eq!(diamond_winner(&[20.0, 5.0, 40.0], 30.0), Some(1));
        assert_eq!(diamond_winner(&[35.0, 40.0, 50.0], 30.0), None);
        assert_eq!(diamond_winner(&[30.0, 40.0, 50.0], 30.0), None);
        assert_eq!(diamond_winner(&[10.0, 10.0, 50.0], 30.0), Some(0));
        assert_eq!(diamond_winner(&[], 30.0), None);
    }

    #[test]
    fn test_dead_end_has_no_edges() {
        let j = Junction::new(&[90.0]);
        let plan = resolve_port(&j.net, j.near[0], &InferenceConfig::default()).unwrap();
        assert_eq!(plan.class, PortClass::DeadEnd);
        assert!(plan.writes.is_empty());
        assert!(plan.diagnostics.is_empty());
    }

    #[test]
    fn test_single_connection_is_reported() {
        let j = Junction::new(&[90.0, 270.0]);
        // Each near port sees exactly one other port
        let plan = resolve_port(&j.net, j.near[0], &InferenceConfig::default()).unwrap();
        assert_eq!(plan.class, PortClass::SingleConnection);
        assert!(plan.writes.is_empty());
        assert_eq!(plan.diagnostics.len(), 1);
        assert_eq!(plan.diagnostics[0].kind, DiagnosticKind::SingleConnection);
        assert_eq!(plan.diagnostics[0].port.as_deref(), Some("t0_near"));
    }

    #[test]
    fn test_switch_plans_mirrored_edges() {
        // Seen from t0: straight leg t1, leg t2 diverging by 45°
        let mut j = Junction::tracks(&[90.0, 270.0, 225.0]);
        j.net.connect(j.near[0], j.near[1]);
        j.net.connect(j.near[0], j.near[2]);

        let plan = resolve_port(&j.net, j.near[0], &InferenceConfig::default()).unwrap();
        assert_eq!(plan.class, PortClass::Switch);
        assert_eq!(
            plan.writes,
            vec![
                (j.near[0], j.far[1], Navigability::Navigable),
                (j.near[1], j.far[0], Navigability::Navigable),
                (j.near[0], j.far[2], Navigability::NonNavigable),
                (j.near[2], j.far[0], Navigability::NonNavigable),
            ]
        );
        assert!(plan.diagnostics.is_empty());
    }

    #[test]
    fn test_double_slip_judges_each_pair() {
        // Two straight lines crossing at 10°: 90/270 and 100/280
        let j = Junction::new(&[90.0, 270.0, 100.0, 280.0]);
        let plan = resolve_port(&j.net, j.near[0], &config(CrossingMode::DoubleSlip)).unwrap();
        assert_eq!(plan.class, PortClass::Crossing);

        let from_port: Vec<_> = plan
            .writes
            .iter()
            .filter(|(from, _, _)| *from == j.near[0])
            .map(|(_, to, verdict)| (*to, *verdict))
            .collect();
        assert_eq!(
            from_port,
            vec![
                (j.far[1], Navigability::Navigable),
                (j.far[2], Navigability::NonNavigable),
                (j.far[3], Navigability::Navigable),
            ]
        );
    }

    #[test]
    fn test_diamond_keeps_only_straightest_pair() {
        let j = Junction::new(&[90.0, 270.0, 100.0, 280.0]);
        let plan = resolve_port(&j.net, j.near[0], &config(CrossingMode::Diamond)).unwrap();
        assert_eq!(plan.class, PortClass::Crossing);
        assert_eq!(
            plan.writes,
            vec![
                (j.near[0], j.far[1], Navigability::Navigable),
                (j.near[1], j.far[0], Navigability::Navigable),
                (j.near[0], j.far[2], Navigability::NonNavigable),
                (j.near[2], j.far[0], Navigability::NonNavigable),
                (j.near[0], j.far[3], Navigability::NonNavigable),
                (j.near[3], j.far[0], Navigability::NonNavigable),
            ]
        );
    }

    #[test]
    fn test_diamond_deviations_5_20_40() {
        // Deviations from port 0 (azimuth 90): 5°, 20°, 40°
        let j = Junction::new(&[90.0, 275.0, 290.0, 310.0]);
        let plan = resolve_port(&j.net, j.near[0], &config(CrossingMode::Diamond)).unwrap();
        let navigable: Vec<_> = plan
            .writes
            .iter()
            .filter(|(_, _, v)| *v == Navigability::Navigable)
            .collect();
        assert_eq!(
            navigable,
            vec![
                &(j.near[0], j.far[1], Navigability::Navigable),
                &(j.near[1], j.far[0], Navigability::Navigable),
            ]
        );
        assert_eq!(plan.writes.len(), 6);
    }

    #[test]
    fn test_diamond_deviations_all_above_threshold() {
        // Deviations 35°, 40°, 50°
        let j = Junction::new(&[90.0, 305.0, 310.0, 320.0]);
        let plan = resolve_port(&j.net, j.near[0], &config(CrossingMode::Diamond)).unwrap();
        assert_eq!(plan.writes.len(), 6);
        assert!(plan
            .writes
            .iter()
            .all(|(_, _, v)| *v == Navigability::NonNavigable));
    }

    #[test]
    fn test_unsupported_degree() {
        let j = Junction::new(&[0.0, 90.0, 180.0, 270.0, 45.0]);
        match resolve_port(&j.net, j.near[0], &InferenceConfig::default()) {
            Err(Error::UnsupportedDegree { port, degree }) => {
                assert_eq!(port, "t0_near");
                assert_eq!(degree, 4);
            }
            other => panic!("expected UnsupportedDegree, got {other:?}"),
        }
    }

    #[test]
    fn test_non_linear_neighbour_is_reported() {
        let mut net = Network::new();
        let t0 = net.add_element("t0", ElementKind::Linear).unwrap();
        let t1 = net.add_element("t1", ElementKind::Linear).unwrap();
        let marker = net.add_element("buffer", ElementKind::NonLinear).unwrap();
        let p0 = net.add_port("t0_near", &[t0], Location::point(0.0, 0.0), 90.0).unwrap();
        net.add_port("t0_far", &[t0], Location::point(-1.0, 0.0), 270.0).unwrap();
        let p1 = net.add_port("t1_near", &[t1], Location::point(0.0, 0.0), 270.0).unwrap();
        let t1_far = net.add_port("t1_far", &[t1], Location::point(1.0, 0.0), 90.0).unwrap();
        let m = net.add_port("buffer_0", &[marker], Location::point(0.0, 0.0), 270.0).unwrap();
        net.connect(p0, p1);
        net.connect(p0, m);

        let plan = resolve_port(&net, p0, &InferenceConfig::default()).unwrap();
        assert_eq!(plan.class, PortClass::Switch);
        assert_eq!(plan.writes.len(), 2);
        assert_eq!(plan.writes[0], (p0, t1_far, Navigability::Navigable));

        let kinds: Vec<_> = plan.diagnostics.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![DiagnosticKind::NonLinearOwner, DiagnosticKind::MissingOpposite]
        );
        assert_eq!(plan.diagnostics[1].port.as_deref(), Some("buffer_0"));
        assert_eq!(plan.diagnostics[0].element.as_deref(), Some("buffer"));
    }

    #[test]
    fn test_structural_violation_aborts_only_the_faulty_port() {
        // t2_near is claimed by two elements
        let mut net = Network::new();
        let t0 = net.add_element("t0", ElementKind::Linear).unwrap();
        let t1 = net.add_element("t1", ElementKind::Linear).unwrap();
        let t2 = net.add_element("t2", ElementKind::Linear).unwrap();
        let t3 = net.add_element("t3", ElementKind::Linear).unwrap();
        let origin = Location::point(0.0, 0.0);
        let p0 = net.add_port("t0_near", &[t0], origin.clone(), 90.0).unwrap();
        let t0_far = net.add_port("t0_far", &[t0], Location::point(-1.0, 0.0), 270.0).unwrap();
        let p1 = net.add_port("t1_near", &[t1], origin.clone(), 270.0).unwrap();
        let t1_far = net.add_port("t1_far", &[t1], Location::point(1.0, 0.0), 90.0).unwrap();
        let p2 = net.add_port("t2_near", &[t2, t3], origin, 255.0).unwrap();
        net.add_port("t2_far", &[t2], Location::point(1.0, 0.3), 75.0).unwrap();
        net.connect(p0, p1);
        net.connect(p0, p2);
        net.connect(p1, p2);

        let plan = resolve_port(&net, p0, &InferenceConfig::default()).unwrap();
        assert_eq!(plan.class, PortClass::Switch);
        assert_eq!(
            plan.writes,
            vec![
                (p0, t1_far, Navigability::Navigable),
                (p1, t0_far, Navigability::Navigable),
            ]
        );
        assert_eq!(plan.diagnostics.len(), 1);
        assert_eq!(plan.diagnostics[0].kind, DiagnosticKind::OwnerCount);
        assert_eq!(plan.diagnostics[0].port.as_deref(), Some("t2_near"));

        match resolve_port(&net, p2, &InferenceConfig::default()) {
            Err(err @ Error::OwnerCount { .. }) => assert!(err.is_structural()),
            other => panic!("expected OwnerCount, got {other:?}"),
        }

        let stats = resolve_navigabilities(&mut net, &InferenceConfig::default()).unwrap();
        assert_eq!(net.navigability(p0, t1_far), Some(Navigability::Navigable));
        assert_eq!(net.navigability(p1, t0_far), Some(Navigability::Navigable));
        assert_eq!(stats.switches, 2);
        assert_eq!(
            stats
                .diagnostics
                .iter()
                .filter(|d| d.kind == DiagnosticKind::OwnerCount)
                .count(),
            1
        );
    }

    #[test]
    fn test_diamond_unresolved_neighbour_never_wins() {
        // The buffer stop sits straight ahead (0°) but has no opposite port;
        // t1 at 10° must win instead
        let mut net = Network::new();
        let t0 = net.add_element("t0", ElementKind::Linear).unwrap();
        let t1 = net.add_element("t1", ElementKind::Linear).unwrap();
        let t2 = net.add_element("t2", ElementKind::Linear).unwrap();
        let marker = net.add_element("buffer", ElementKind::NonLinear).unwrap();
        let origin = Location::point(0.0, 0.0);
        let p0 = net.add_port("t0_near", &[t0], origin.clone(), 90.0).unwrap();
        let t0_far = net.add_port("t0_far", &[t0], Location::point(-1.0, 0.0), 270.0).unwrap();
        let m = net.add_port("buffer_0", &[marker], origin.clone(), 270.0).unwrap();
        let p1 = net.add_port("t1_near", &[t1], origin.clone(), 280.0).unwrap();
        let t1_far = net.add_port("t1_far", &[t1], Location::point(1.0, -0.2), 100.0).unwrap();
        let p2 = net.add_port("t2_near", &[t2], origin, 150.0).unwrap();
        let t2_far = net.add_port("t2_far", &[t2], Location::point(0.5, -1.0), 330.0).unwrap();
        for (a, b) in [(p0, m), (p0, p1), (p0, p2), (m, p1), (m, p2), (p1, p2)] {
            net.connect(a, b);
        }

        let plan = resolve_port(&net, p0, &config(CrossingMode::Diamond)).unwrap();
        assert_eq!(plan.class, PortClass::Crossing);
        assert_eq!(
            plan.writes,
            vec![
                (m, t0_far, Navigability::NonNavigable),
                (p0, t1_far, Navigability::Navigable),
                (p1, t0_far, Navigability::Navigable),
                (p0, t2_far, Navigability::NonNavigable),
                (p2, t0_far, Navigability::NonNavigable),
            ]
        );
        let missing: Vec<_> = plan
            .diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::MissingOpposite)
            .collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].port.as_deref(), Some("buffer_0"));
        assert_eq!(missing[0].severity, crate::core::report::Severity::Error);
    }

    #[test]
    fn test_repeated_diagnostics_are_reported_once() {
        let mut net = Network::new();
        let t0 = net.add_element("t0", ElementKind::Linear).unwrap();
        let t1 = net.add_element("t1", ElementKind::Linear).unwrap();
        let marker = net.add_element("buffer", ElementKind::NonLinear).unwrap();
        let origin = Location::point(0.0, 0.0);
        let p0 = net.add_port("t0_near", &[t0], origin.clone(), 90.0).unwrap();
        net.add_port("t0_far", &[t0], Location::point(-1.0, 0.0), 270.0).unwrap();
        let p1 = net.add_port("t1_near", &[t1], origin.clone(), 270.0).unwrap();
        net.add_port("t1_far", &[t1], Location::point(1.0, 0.0), 90.0).unwrap();
        let m = net.add_port("buffer_0", &[marker], origin, 270.0).unwrap();
        net.connect(p0, p1);
        net.connect(p0, m);
        net.connect(p1, m);

        // Both p0 and p1 meet the buffer stop as a neighbour
        let stats = resolve_navigabilities(&mut net, &InferenceConfig::default()).unwrap();
        let count = |kind| stats.diagnostics.iter().filter(|d| d.kind == kind).count();
        assert_eq!(count(DiagnosticKind::NonLinearOwner), 1);
        assert_eq!(count(DiagnosticKind::MissingOpposite), 1);
    }

    #[test]
    fn test_resolve_all_writes_symmetric_switch() {
        // A proper switch: toe t0, straight t1, diverging t2 (15° off)
        let j = Junction::new(&[90.0, 270.0, 255.0]);
        let mut net = j.net;
        let stats = resolve_navigabilities(&mut net, &InferenceConfig::default()).unwrap();
        assert_eq!(stats.crossings, 0);
        assert_eq!(stats.switches, 3);
        assert_eq!(stats.dead_ends, 3);

        for (from, to, verdict) in net.navigabilities().collect::<Vec<_>>() {
            // from -> to is mirrored by opposite(to) -> opposite(from)
            let Opposite::Found(mirror_from) = net.opposite_port(to).unwrap() else {
                panic!("{to:?} is on a linear element");
            };
            let Opposite::Found(mirror_to) = net.opposite_port(from).unwrap() else {
                panic!("{from:?} is on a linear element");
            };
            assert_eq!(net.navigability(mirror_from, mirror_to), Some(verdict));
        }

        assert_eq!(
            net.navigability(j.near[0], j.far[1]),
            Some(Navigability::Navigable)
        );
        assert_eq!(
            net.navigability(j.near[1], j.far[0]),
            Some(Navigability::Navigable)
        );
        assert_eq!(
            net.navigability(j.near[0], j.far[2]),
            Some(Navigability::Navigable)
        );
        // Between the two branches: 15° apart in the same direction, a reversal
        assert_eq!(
            net.navigability(j.near[1], j.far[2]),
            Some(Navigability::NonNavigable)
        );
        assert_eq!(
            net.navigability(j.near[2], j.far[1]),
            Some(Navigability::NonNavigable)
        );
        assert!(stats
            .diagnostics
            .iter()
            .all(|d| d.kind != DiagnosticKind::ConflictingNavigability));
    }

    #[test]
    fn test_fail_fast_writes_nothing() {
        let j = Junction::new(&[0.0, 90.0, 180.0, 270.0, 45.0]);
        let mut net = j.net;
        let err = resolve_navigabilities(&mut net, &InferenceConfig::default()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedDegree { degree: 4, .. }));
        assert_eq!(net.navigabilities().count(), 0);
    }

    #[test]
    fn test_best_effort_skips_unsupported_ports() {
        let j = Junction::new(&[0.0, 90.0, 180.0, 270.0, 45.0]);
        let mut net = j.net;
        let config = InferenceConfig {
            failure_policy: FailurePolicy::BestEffort,
            ..Default::default()
        };
        let stats = resolve_navigabilities(&mut net, &config).unwrap();
        assert_eq!(stats.dead_ends, 5);
        assert_eq!(
            stats
                .diagnostics
                .iter()
                .filter(|d| d.kind == DiagnosticKind::UnsupportedDegree)
                .count(),
            5
        );
        assert_eq!(net.navigabilities().count(), 0);
    }

    #[test]
    fn test_progress_reaches_total() {
        use std::sync::Arc;
        use std::sync::atomic::AtomicU64;

        let j = Junction::new(&[90.0, 270.0, 255.0]);
        let mut net = j.net;
        let max_seen = Arc::new(AtomicU64::new(0));
        let seen = Arc::clone(&max_seen);
        let config = InferenceConfig {
            progress: Some(Arc::new(move |done: u64, total: u64| {
                assert_eq!(total, 6);
                seen.fetch_max(done, Ordering::Relaxed);
            })),
            ..Default::default()
        };
        resolve_navigabilities(&mut net, &config).unwrap();
        assert_eq!(max_seen.load(Ordering::Relaxed), 6);
    }
}
