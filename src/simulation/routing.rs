//! Routing graph for parking assignment
//!
//! Built once from the street directions and the parking-spot placements.
//! Parking occupancy never changes which edges exist; it only narrows the set
//! of targets a car searches for. Off-street spot nodes have no outgoing
//! edges. A spot on a drivable cell shares the lane cell's node, so it may lie
//! inside a path.

use petgraph::algo::{astar, dijkstra};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

use super::street_map::StreetDirectionMap;
use super::types::Cell;

/// How an edge was derived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Follows a lane direction between two drivable cells
    Lane,
    /// Pulls off a drivable cell into an adjacent parking spot
    ParkingAccess,
}

/// Edge data for the routing graph
#[derive(Debug, Clone, Copy)]
pub struct RouteEdge {
    pub kind: EdgeKind,
    pub weight: u32,
}

impl RouteEdge {
    fn lane() -> Self {
        Self {
            kind: EdgeKind::Lane,
            weight: 1,
        }
    }

    fn parking_access() -> Self {
        Self {
            kind: EdgeKind::ParkingAccess,
            weight: 1,
        }
    }
}

/// A shortest path to the nearest reachable target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParkingRoute {
    /// Cells from the start (inclusive) to the chosen target (inclusive)
    pub path: Vec<Cell>,
    /// Number of edges travelled
    pub length: u32,
}

impl ParkingRoute {
    pub fn target(&self) -> Option<Cell> {
        self.path.last().copied()
    }
}

/// Directed graph over drivable cells and parking spots
#[derive(Debug, Default)]
pub struct RoutingGraph {
    graph: DiGraph<Cell, RouteEdge>,
    cell_to_node: HashMap<Cell, NodeIndex>,
}

impl RoutingGraph {
    /// Derive the graph from lane directions and spot cells
    pub fn build(streets: &StreetDirectionMap, parking_cells: &[Cell]) -> Self {
        let mut routing = Self::default();

        let drivable = streets.drivable_cells();
        for cell in &drivable {
            routing.add_node(*cell);
        }
        for cell in parking_cells {
            routing.add_node(*cell);
        }

        for cell in &drivable {
            for next in streets.candidate_next_cells(*cell) {
                routing.connect(*cell, next, RouteEdge::lane());
            }
        }

        for spot in parking_cells {
            for (_, neighbor) in spot.neighbors() {
                if streets.is_drivable(neighbor) {
                    routing.connect(neighbor, *spot, RouteEdge::parking_access());
                }
            }
        }

        routing
    }

    fn add_node(&mut self, cell: Cell) -> NodeIndex {
        if let Some(node) = self.cell_to_node.get(&cell) {
            return *node;
        }
        let node = self.graph.add_node(cell);
        self.cell_to_node.insert(cell, node);
        node
    }

    fn connect(&mut self, from: Cell, to: Cell, edge: RouteEdge) {
        let (Some(&a), Some(&b)) = (self.cell_to_node.get(&from), self.cell_to_node.get(&to)) else {
            return;
        };
        // A spot sitting on a drivable cell can be reached by both edge kinds
        if self.graph.find_edge(a, b).is_none() {
            self.graph.add_edge(a, b, edge);
        }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.cell_to_node.contains_key(&cell)
    }

    /// Cells directly reachable from `cell`
    pub fn successors(&self, cell: Cell) -> Vec<Cell> {
        let Some(node) = self.cell_to_node.get(&cell) else {
            return Vec::new();
        };
        self.graph
            .edges(*node)
            .map(|edge| self.graph[edge.target()])
            .collect()
    }

    /// Shortest path from `start` to whichever target is closest
    ///
    /// Ties go to the target listed first. Returns `None` when no target is
    /// reachable or `start` is not part of the graph.
    pub fn shortest_path_to_any(&self, start: Cell, targets: &[Cell]) -> Option<ParkingRoute> {
        let start_node = *self.cell_to_node.get(&start)?;

        let distances = dijkstra(&self.graph, start_node, None, |edge| edge.weight().weight);

        let mut best: Option<(NodeIndex, u32)> = None;
        for target in targets {
            let Some(node) = self.cell_to_node.get(target) else {
                continue;
            };
            if let Some(&distance) = distances.get(node) {
                if best.map_or(true, |(_, best_distance)| distance < best_distance) {
                    best = Some((*node, distance));
                }
            }
        }
        let (goal, _) = best?;

        let (length, node_path) = astar(
            &self.graph,
            start_node,
            |node| node == goal,
            |edge| edge.weight().weight,
            |_| 0, // Null heuristic = Dijkstra
        )?;

        Some(ParkingRoute {
            path: node_path.into_iter().map(|node| self.graph[node]).collect(),
            length,
        })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
