//! Bus connectivity graph
//!
//! Nodes are bus ids, edges say "these two buses are electrically joined".
//! Holes sharing a bus collapse into a single node before any edge is
//! added, so same-bus reachability never needs a traversal.
//!
//! Two construction rules feed the graph:
//! - a component body bridges every pair of its placed pins that sit on
//!   different buses
//! - a wire joins the buses of its two endpoints
//!
//! Self-loops are dropped and parallel edges are merged, so the graph is a
//! plain undirected adjacency set.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::Bfs;
use std::collections::{HashMap, HashSet};

use super::schema::{Circuit, Endpoint, WireInstance};
use crate::breadboard::BusIndex;

#[derive(Debug, Clone, Default)]
pub struct BusGraph {
    graph: UnGraph<String, ()>,
    bus_indices: HashMap<String, NodeIndex>,
}

impl BusGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full circuit graph: component bodies plus wires.
    pub fn from_circuit(circuit: &Circuit, index: &BusIndex) -> Self {
        let mut graph = Self::new();
        graph.add_component_bodies(circuit, index);
        graph.add_wires(circuit, index, |_| true);
        tracing::debug!(
            "Built bus graph: {} buses, {} links",
            graph.bus_count(),
            graph.link_count()
        );
        graph
    }

    /// Wire-only graph, ignoring what component bodies bridge.
    pub fn from_wires(circuit: &Circuit, index: &BusIndex) -> Self {
        Self::from_wires_where(circuit, index, |_| true)
    }

    /// Wire-only graph over the wires `keep` accepts.
    pub fn from_wires_where<F>(circuit: &Circuit, index: &BusIndex, keep: F) -> Self
    where
        F: FnMut(&WireInstance) -> bool,
    {
        let mut graph = Self::new();
        graph.add_wires(circuit, index, keep);
        graph
    }

    fn add_component_bodies(&mut self, circuit: &Circuit, index: &BusIndex) {
        for component in &circuit.components {
            let buses: Vec<&str> = component
                .placement
                .values()
                .filter_map(|hole| index.bus_of(hole))
                .collect();

            for bus in &buses {
                self.add_bus(bus);
            }
            for (i, a) in buses.iter().enumerate() {
                for b in &buses[i + 1..] {
                    self.connect(a, b);
                }
            }
        }
    }

    fn add_wires<F>(&mut self, circuit: &Circuit, index: &BusIndex, mut keep: F)
    where
        F: FnMut(&WireInstance) -> bool,
    {
        for wire in circuit.wires.iter().filter(|w| keep(w)) {
            let [(_, from), (_, to)] = wire.endpoints();
            let from_bus = resolve_bus(circuit, index, &from);
            let to_bus = resolve_bus(circuit, index, &to);

            // a wire with an unresolved end contributes nothing
            if let (Some(a), Some(b)) = (from_bus, to_bus) {
                self.add_bus(a);
                self.add_bus(b);
                self.connect(a, b);
            }
        }
    }

    /// Insert a bus node if it is not present yet.
    pub fn add_bus(&mut self, bus: &str) -> NodeIndex {
        if let Some(&idx) = self.bus_indices.get(bus) {
            return idx;
        }
        let idx = self.graph.add_node(bus.to_string());
        self.bus_indices.insert(bus.to_string(), idx);
        idx
    }

    /// Join two buses. Returns false for a self-loop, which is dropped.
    pub fn connect(&mut self, a: &str, b: &str) -> bool {
        if a == b {
            return false;
        }
        let a = self.add_bus(a);
        let b = self.add_bus(b);
        self.graph.update_edge(a, b, ());
        true
    }

    pub fn contains(&self, bus: &str) -> bool {
        self.bus_indices.contains_key(bus)
    }

    pub fn bus_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Breadth-first reachability. Identical buses are always connected.
    pub fn path_exists(&self, start: &str, target: &str) -> bool {
        if start == target {
            return true;
        }
        let (Some(&from), Some(&to)) = (self.bus_indices.get(start), self.bus_indices.get(target))
        else {
            return false;
        };

        let mut bfs = Bfs::new(&self.graph, from);
        while let Some(node) = bfs.next(&self.graph) {
            if node == to {
                return true;
            }
        }
        false
    }

    /// Breadth-first search from `start` for the first bus matching `predicate`.
    /// The start bus itself is tested first.
    pub fn find_reachable<F>(&self, start: &str, mut predicate: F) -> Option<&str>
    where
        F: FnMut(&str) -> bool,
    {
        let &from = self.bus_indices.get(start)?;
        let mut bfs = Bfs::new(&self.graph, from);
        while let Some(node) = bfs.next(&self.graph) {
            let bus = self.graph[node].as_str();
            if predicate(bus) {
                return Some(bus);
            }
        }
        None
    }

    /// Partition into connected groups, each listed in discovery order.
    /// Groups come out in the order their first bus was inserted.
    pub fn connected_groups(&self) -> Vec<Vec<String>> {
        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut groups = Vec::new();

        for start in self.graph.node_indices() {
            if visited.contains(&start) {
                continue;
            }
            let mut group = Vec::new();
            let mut bfs = Bfs::new(&self.graph, start);
            while let Some(node) = bfs.next(&self.graph) {
                visited.insert(node);
                group.push(self.graph[node].clone());
            }
            groups.push(group);
        }

        groups
    }
}

/// Bus an endpoint resolves to, directly for hole ids or through the
/// referenced component's placement for `componentId.pinName`.
pub fn resolve_bus<'a>(circuit: &'a Circuit, index: &'a BusIndex, endpoint: &Endpoint<'a>) -> Option<&'a str> {
    circuit
        .endpoint_hole(endpoint)
        .and_then(|hole| index.bus_of(hole))
}
