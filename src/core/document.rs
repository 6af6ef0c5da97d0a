//! JSON interop document
//!
//! Carries the minimal schema the inference needs (element kinds, port
//! ownership, locations, azimuths) and the relations it produces. Importers
//! for railML, OSM and friends write this shape; the CLI reads it.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};
use crate::core::network::{ElementKind, Location, Navigability, Network, PortId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub id: String,
    pub kind: ElementKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortRecord {
    pub id: String,
    pub on_element: Vec<String>,
    pub location: Location,
    pub azimuth: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkDocument {
    pub elements: Vec<ElementRecord>,
    pub ports: Vec<PortRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connected_with: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub navigable_to: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub non_navigable_to: Vec<(String, String)>,
}

impl NetworkDocument {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.to_writer(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Snapshot of a network, including every relation it holds
    pub fn from_network(network: &Network) -> Self {
        let name = |port: PortId| network.port(port).name.clone();

        let elements = network
            .element_ids()
            .map(|id| {
                let element = network.element(id);
                ElementRecord {
                    id: element.name.clone(),
                    kind: element.kind,
                }
            })
            .collect();

        let ports = network
            .port_ids()
            .map(|id| {
                let port = network.port(id);
                PortRecord {
                    id: port.name.clone(),
                    on_element: port
                        .on_element
                        .iter()
                        .map(|e| network.element(*e).name.clone())
                        .collect(),
                    location: port.location.clone(),
                    azimuth: port.azimuth,
                }
            })
            .collect();

        let connected_with = network
            .connections()
            .map(|(a, b)| (name(a), name(b)))
            .collect();

        let mut navigable_to = Vec::new();
        let mut non_navigable_to = Vec::new();
        for (from, to, verdict) in network.navigabilities() {
            match verdict {
                Navigability::Navigable => navigable_to.push((name(from), name(to))),
                Navigability::NonNavigable => non_navigable_to.push((name(from), name(to))),
            }
        }

        Self {
            elements,
            ports,
            connected_with,
            navigable_to,
            non_navigable_to,
        }
    }
}

impl Network {
    /// Build a network from an interop document, keeping any relation it
    /// already carries
    pub fn from_document(document: &NetworkDocument) -> Result<Self> {
        let mut network = Network::new();

        for element in &document.elements {
            network.add_element(element.id.clone(), element.kind)?;
        }

        for port in &document.ports {
            let owners = port
                .on_element
                .iter()
                .map(|name| {
                    network
                        .element_by_name(name)
                        .ok_or_else(|| Error::UnknownElement {
                            port: port.id.clone(),
                            element: name.clone(),
                        })
                })
                .collect::<Result<Vec<_>>>()?;
            network.add_port(port.id.clone(), &owners, port.location.clone(), port.azimuth)?;
        }

        let lookup = |network: &Network, name: &str| {
            network
                .port_by_name(name)
                .ok_or_else(|| Error::UnknownPort(name.to_string()))
        };

        for (a, b) in &document.connected_with {
            let (a, b) = (lookup(&network, a)?, lookup(&network, b)?);
            network.connect(a, b);
        }
        for (relation, verdict) in [
            (&document.navigable_to, Navigability::Navigable),
            (&document.non_navigable_to, Navigability::NonNavigable),
        ] {
            for (from, to) in relation {
                let (from, to) = (lookup(&network, from)?, lookup(&network, to)?);
                network.set_navigability(from, to, verdict);
            }
        }

        Ok(network)
    }
}
