//! Relation graph algorithms: cycle detection, chain walking, degree ranking.
//!
//! Operates on the edge list of one user's graph, loaded by the relations
//! repository. The graph is finite and owned-scoped, so breadth-first
//! traversal is bounded by the user's entry count.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use crate::models::RelationType;

/// A directed edge in one user's relation graph.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub id: i64,
    pub from: i64,
    pub to: i64,
    pub relation_type: RelationType,
}

/// Traversal direction for chain walking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Outgoing edges only
    Forward,
    /// Incoming edges only
    Backward,
    /// Either direction
    Both,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forward" => Ok(Direction::Forward),
            "backward" => Ok(Direction::Backward),
            "both" => Ok(Direction::Both),
            other => Err(format!(
                "unknown direction: {other} (expected forward, backward or both)"
            )),
        }
    }
}

/// A node discovered during chain walking, annotated with its hop distance.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ChainNode {
    pub entry_id: i64,
    pub depth: usize,
}

/// Result of a chain walk: nodes in discovery order plus summary counts.
#[derive(Debug, Clone, Serialize)]
pub struct Chain {
    pub nodes: Vec<ChainNode>,
    pub total_depth: usize,
    pub entry_count: usize,
}

/// Would inserting edge `from -> to` close a cycle?
///
/// Breadth-first reachability search starting at `to`, following outgoing
/// edges; if `from` is reachable the new edge would complete a loop back to
/// its source. Advisory only - callers create the relation regardless and
/// surface the flag as a warning.
pub fn would_create_cycle(edges: &[Edge], from: i64, to: i64) -> bool {
    if from == to {
        return true;
    }

    let mut outgoing: HashMap<i64, Vec<i64>> = HashMap::new();
    for edge in edges {
        outgoing.entry(edge.from).or_default().push(edge.to);
    }

    let mut visited = HashSet::new();
    let mut frontier = vec![to];
    visited.insert(to);

    while let Some(node) = frontier.pop() {
        if node == from {
            return true;
        }
        if let Some(next) = outgoing.get(&node) {
            for &target in next {
                if visited.insert(target) {
                    frontier.push(target);
                }
            }
        }
    }

    false
}

/// Walk the chain reachable from `start` up to `max_depth` hops.
//
// Level-by-level traversal with a visited set: a node already included is
// never revisited, so termination holds even when the graph contains
// cycles. Nodes are returned in discovery order.
pub fn walk_chain(edges: &[Edge], start: i64, max_depth: usize, direction: Direction) -> Chain {
    let mut visited = HashSet::new();
    let mut nodes = vec![ChainNode {
        entry_id: start,
        depth: 0,
    }];
    let mut current_level = vec![start];
    let mut total_depth = 0;

    visited.insert(start);

    for depth in 0..max_depth {
        let mut next_level = Vec::new();

        for &entry_id in &current_level {
            for edge in edges {
                let neighbor = match direction {
                    Direction::Forward if edge.from == entry_id => edge.to,
                    Direction::Backward if edge.to == entry_id => edge.from,
                    Direction::Both if edge.from == entry_id => edge.to,
                    Direction::Both if edge.to == entry_id => edge.from,
                    _ => continue,
                };

                if visited.insert(neighbor) {
                    nodes.push(ChainNode {
                        entry_id: neighbor,
                        depth: depth + 1,
                    });
                    next_level.push(neighbor);
                }
            }
        }

        if next_level.is_empty() {
            break;
        }

        total_depth = depth + 1;
        current_level = next_level;
    }

    Chain {
        entry_count: nodes.len(),
        nodes,
        total_depth,
    }
}

/// Rank entries by total edge degree (incoming + outgoing), descending.
///
/// Ties break toward the lower entry id for stable output.
pub fn rank_by_degree(edges: &[Edge], limit: usize) -> Vec<(i64, usize)> {
    let mut degrees: HashMap<i64, usize> = HashMap::new();
    for edge in edges {
        *degrees.entry(edge.from).or_default() += 1;
        *degrees.entry(edge.to).or_default() += 1;
    }

    let mut ranked: Vec<(i64, usize)> = degrees.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(id: i64, from: i64, to: i64) -> Edge {
        Edge {
            id,
            from,
            to,
            relation_type: RelationType::LedTo,
        }
    }

    #[test]
    fn test_cycle_detected_through_chain() {
        // A -> B -> C; adding C -> A closes the loop
        let edges = [edge(1, 1, 2), edge(2, 2, 3)];
        assert!(would_create_cycle(&edges, 3, 1));
    }

    #[test]
    fn test_no_cycle_for_unconnected_target() {
        let edges = [edge(1, 1, 2), edge(2, 2, 3)];
        assert!(!would_create_cycle(&edges, 1, 4));
    }

    #[test]
    fn test_reverse_edge_is_a_cycle() {
        let edges = [edge(1, 1, 2)];
        assert!(would_create_cycle(&edges, 2, 1));
        assert!(!would_create_cycle(&edges, 1, 3));
    }

    #[test]
    fn test_chain_respects_depth() {
        // A -> B -> C
        let edges = [edge(1, 1, 2), edge(2, 2, 3)];

        let one_hop = walk_chain(&edges, 1, 1, Direction::Forward);
        let ids: Vec<i64> = one_hop.nodes.iter().map(|n| n.entry_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(one_hop.total_depth, 1);

        let two_hops = walk_chain(&edges, 1, 2, Direction::Forward);
        let ids: Vec<i64> = two_hops.nodes.iter().map(|n| n.entry_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(two_hops.entry_count, 3);
        assert_eq!(two_hops.total_depth, 2);
    }

    #[test]
    fn test_chain_directions() {
        let edges = [edge(1, 1, 2), edge(2, 3, 1)];

        let forward = walk_chain(&edges, 1, 5, Direction::Forward);
        assert_eq!(forward.entry_count, 2); // 1, 2

        let backward = walk_chain(&edges, 1, 5, Direction::Backward);
        assert_eq!(backward.entry_count, 2); // 1, 3

        let both = walk_chain(&edges, 1, 5, Direction::Both);
        assert_eq!(both.entry_count, 3);
    }

    #[test]
    fn test_chain_terminates_on_cyclic_graph() {
        // 1 -> 2 -> 3 -> 1
        let edges = [edge(1, 1, 2), edge(2, 2, 3), edge(3, 3, 1)];
        let chain = walk_chain(&edges, 1, 10, Direction::Forward);

        assert_eq!(chain.entry_count, 3);
        let depths: Vec<usize> = chain.nodes.iter().map(|n| n.depth).collect();
        assert_eq!(depths, vec![0, 1, 2]);
    }

    #[test]
    fn test_degree_ranking() {
        // entry 1: 3 edges, entry 4: 1 edge
        let edges = [edge(1, 1, 2), edge(2, 1, 3), edge(3, 5, 1), edge(4, 4, 6)];
        let ranked = rank_by_degree(&edges, 10);

        assert_eq!(ranked[0], (1, 3));
        assert!(ranked.iter().any(|&(id, degree)| id == 4 && degree == 1));
    }

    #[test]
    fn test_degree_ranking_limit() {
        let edges = [edge(1, 1, 2), edge(2, 3, 4)];
        assert_eq!(rank_by_degree(&edges, 2).len(), 2);
    }
}
