//! In-memory railway topology graph
//!
//! Elements and ports live in arenas addressed by compact `u32` handles.
//! The connection relation is stored one way (first port -> second port) but
//! is only ever read back through [`Network::connected_ports`], which returns
//! the symmetrized set.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};

/// Handle of an element in a [`Network`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(pub u32);

/// Handle of a port in a [`Network`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortId(pub u32);

impl PortId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl ElementId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// Track segment with exactly two ports
    Linear,
    /// Markers and other elements the inference treats opaquely
    NonLinear,
}

#[derive(Debug, Clone)]
pub struct Element {
    pub name: String,
    pub kind: ElementKind,
}

/// Coincident-point value of a port, compared for exact equality
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Location(String);

impl Location {
    pub fn new(wkt: impl Into<String>) -> Self {
        Self(wkt.into())
    }

    /// WKT point literal, as written by the importers
    pub fn point(x: f64, y: f64) -> Self {
        Self(format!("POINT ({x} {y})"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Port {
    pub name: String,
    /// Owning elements; exactly one is expected
    pub on_element: Vec<ElementId>,
    pub location: Location,
    /// Bearing in degrees when leaving the owning element through this port
    pub azimuth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Navigability {
    Navigable,
    NonNavigable,
}

/// Outcome of writing a navigability edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeWrite {
    Inserted,
    /// Same verdict already present
    Unchanged,
    /// Disagreeing verdict already present; the edge is now non-navigable
    Conflict,
}

/// Outcome of looking up the opposite port of a port's owning element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opposite {
    Found(PortId),
    /// The owning element is not a linear element
    NonLinear(ElementId),
}

#[derive(Debug, Default)]
pub struct Network {
    elements: Vec<Element>,
    ports: Vec<Port>,
    element_names: HashMap<String, ElementId>,
    port_names: HashMap<String, PortId>,
    ports_by_element: Vec<Vec<PortId>>,
    connections: BTreeSet<(PortId, PortId)>,
    adjacency: Vec<BTreeSet<PortId>>,
    navigabilities: BTreeMap<(PortId, PortId), Navigability>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_element(&mut self, name: impl Into<String>, kind: ElementKind) -> Result<ElementId> {
        let name = name.into();
        if self.element_names.contains_key(&name) {
            return Err(Error::DuplicateName(name));
        }
        let id = ElementId(self.elements.len() as u32);
        self.element_names.insert(name.clone(), id);
        self.elements.push(Element { name, kind });
        self.ports_by_element.push(Vec::new());
        Ok(id)
    }

    /// Add a port owned by the given elements (normally exactly one)
    pub fn add_port(
        &mut self,
        name: impl Into<String>,
        on_element: &[ElementId],
        location: Location,
        azimuth: f64,
    ) -> Result<PortId> {
        let name = name.into();
        if self.port_names.contains_key(&name) {
            return Err(Error::DuplicateName(name));
        }
        if let Some(bad) = on_element.iter().find(|e| e.index() >= self.elements.len()) {
            return Err(Error::UnknownElement {
                port: name,
                element: format!("#{}", bad.0),
            });
        }

        let id = PortId(self.ports.len() as u32);
        for element in on_element {
            self.ports_by_element[element.index()].push(id);
        }
        self.port_names.insert(name.clone(), id);
        self.ports.push(Port {
            name,
            on_element: on_element.to_vec(),
            location,
            azimuth,
        });
        self.adjacency.push(BTreeSet::new());
        Ok(id)
    }

    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.index()]
    }

    pub fn port(&self, id: PortId) -> &Port {
        &self.ports[id.index()]
    }

    pub fn element_by_name(&self, name: &str) -> Option<ElementId> {
        self.element_names.get(name).copied()
    }

    pub fn port_by_name(&self, name: &str) -> Option<PortId> {
        self.port_names.get(name).copied()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn port_count(&self) -> usize {
        self.ports.len()
    }

    pub fn element_ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        (0..self.elements.len() as u32).map(ElementId)
    }

    pub fn port_ids(&self) -> impl Iterator<Item = PortId> + '_ {
        (0..self.ports.len() as u32).map(PortId)
    }

    pub fn ports_of(&self, element: ElementId) -> &[PortId] {
        &self.ports_by_element[element.index()]
    }

    /// The single owning element of a port
    pub fn owner(&self, port: PortId) -> Result<ElementId> {
        match self.port(port).on_element.as_slice() {
            [element] => Ok(*element),
            owners => Err(Error::OwnerCount {
                port: self.port(port).name.clone(),
                owners: owners
                    .iter()
                    .map(|e| self.element(*e).name.clone())
                    .collect(),
            }),
        }
    }

    /// The other endpoint of the linear element owning `port`
    pub fn opposite_port(&self, port: PortId) -> Result<Opposite> {
        let element = self.owner(port)?;
        if self.element(element).kind != ElementKind::Linear {
            return Ok(Opposite::NonLinear(element));
        }

        match self.ports_of(element) {
            [a, b] if *a == port => Ok(Opposite::Found(*b)),
            [a, b] if *b == port => Ok(Opposite::Found(*a)),
            ports => Err(Error::LinearElementPortCount {
                element: self.element(element).name.clone(),
                ports: ports.iter().map(|p| self.port(*p).name.clone()).collect(),
            }),
        }
    }

    /// Record that two ports share a location. Returns false if the pair
    /// (in either direction) was already known or is a self-pair.
    pub fn connect(&mut self, a: PortId, b: PortId) -> bool {
        if a == b || self.adjacency[a.index()].contains(&b) {
            return false;
        }
        self.connections.insert((a, b));
        self.adjacency[a.index()].insert(b);
        self.adjacency[b.index()].insert(a);
        true
    }

    /// Ports connected to `port` in either direction, sorted by handle
    pub fn connected_ports(&self, port: PortId) -> Vec<PortId> {
        self.adjacency[port.index()].iter().copied().collect()
    }

    pub fn are_connected(&self, a: PortId, b: PortId) -> bool {
        self.adjacency[a.index()].contains(&b)
    }

    /// Number of stored (unordered) connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Stored connections, one entry per unordered pair
    pub fn connections(&self) -> impl Iterator<Item = (PortId, PortId)> + '_ {
        self.connections.iter().copied()
    }

    /// Write a directed navigability edge
    pub fn set_navigability(&mut self, from: PortId, to: PortId, verdict: Navigability) -> EdgeWrite {
        match self.navigabilities.get(&(from, to)).copied() {
            None => {
                self.navigabilities.insert((from, to), verdict);
                EdgeWrite::Inserted
            }
            Some(existing) if existing == verdict => EdgeWrite::Unchanged,
            Some(_) => {
                self.navigabilities
                    .insert((from, to), Navigability::NonNavigable);
                EdgeWrite::Conflict
            }
        }
    }

    pub fn navigability(&self, from: PortId, to: PortId) -> Option<Navigability> {
        self.navigabilities.get(&(from, to)).copied()
    }

    pub fn navigabilities(&self) -> impl Iterator<Item = (PortId, PortId, Navigability)> + '_ {
        self.navigabilities
            .iter()
            .map(|(&(from, to), &verdict)| (from, to, verdict))
    }
}
