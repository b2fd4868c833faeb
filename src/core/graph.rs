//! Static pipeline topology.
//!
//! The graph is built once at startup and never changes afterwards: an
//! ordered set of nodes, fixed forward edges, one conditional branch with a
//! bounded retry cycle, and a terminal marker.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// The engine nodes, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeId {
    LeadArchitect,
    VisualArchitect,
    DiagramValidator,
    BackendEngineer,
    InfraSecurityDevops,
    GovernanceLead,
}

impl NodeId {
    pub const ALL: [NodeId; 6] = [
        NodeId::LeadArchitect,
        NodeId::VisualArchitect,
        NodeId::DiagramValidator,
        NodeId::BackendEngineer,
        NodeId::InfraSecurityDevops,
        NodeId::GovernanceLead,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeId::LeadArchitect => "lead_architect",
            NodeId::VisualArchitect => "visual_architect",
            NodeId::DiagramValidator => "diagram_validator",
            NodeId::BackendEngineer => "backend_engineer",
            NodeId::InfraSecurityDevops => "infra_security_devops",
            NodeId::GovernanceLead => "governance_lead",
        }
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decision produced at the branch node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Accept the candidate content and continue downstream.
    Forward,
    /// Loop back to the producing step.
    Retry,
}

/// The bounded-retry decision at the validation branch.
///
/// Pure function of a narrowed view of state: the latest defect batch and
/// the attempt counter. Forwarding at the cap is deliberate policy: the
/// pipeline accepts degraded content rather than blocking, and termination
/// depends only on the counter, never on eventual success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationRouter {
    max_attempts: u32,
}

impl ValidationRouter {
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn decide(&self, latest_defects: &[String], attempts: u32) -> Route {
        if latest_defects.is_empty() || attempts >= self.max_attempts {
            Route::Forward
        } else {
            Route::Retry
        }
    }
}

/// Outgoing edge of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Unconditional successor.
    Next(NodeId),

    /// The single conditional fan-out: the router picks between the
    /// forward successor and the retry successor.
    Branch {
        router: ValidationRouter,
        forward: NodeId,
        retry: NodeId,
    },

    /// Terminal marker.
    End,
}

/// The static topology the executor walks.
#[derive(Debug, Clone)]
pub struct Graph {
    start: NodeId,
    edges: BTreeMap<NodeId, Edge>,
}

impl Graph {
    /// Build a graph from explicit wiring. `validate` should be called
    /// before handing the graph to an executor.
    pub fn new(start: NodeId, edges: BTreeMap<NodeId, Edge>) -> Self {
        Self { start, edges }
    }

    /// The documentation pipeline: architect, visuals, validation with a
    /// bounded retry loop, then the three writer nodes.
    pub fn standard(max_attempts: u32) -> Self {
        let mut edges = BTreeMap::new();
        edges.insert(NodeId::LeadArchitect, Edge::Next(NodeId::VisualArchitect));
        edges.insert(NodeId::VisualArchitect, Edge::Next(NodeId::DiagramValidator));
        edges.insert(
            NodeId::DiagramValidator,
            Edge::Branch {
                router: ValidationRouter::new(max_attempts),
                forward: NodeId::BackendEngineer,
                retry: NodeId::VisualArchitect,
            },
        );
        edges.insert(NodeId::BackendEngineer, Edge::Next(NodeId::InfraSecurityDevops));
        edges.insert(NodeId::InfraSecurityDevops, Edge::Next(NodeId::GovernanceLead));
        edges.insert(NodeId::GovernanceLead, Edge::End);

        Self::new(NodeId::LeadArchitect, edges)
    }

    pub fn start(&self) -> NodeId {
        self.start
    }

    pub fn edge(&self, node: NodeId) -> Option<&Edge> {
        self.edges.get(&node)
    }

    pub fn node_count(&self) -> usize {
        self.edges.len()
    }

    /// Upper bound on node invocations for one run: every node once, plus
    /// the retry cycle repeated up to the router's cap. Used by the
    /// executor as a backstop against wiring mistakes.
    pub fn visit_budget(&self) -> u32 {
        let mut budget = self.edges.len() as u32;
        for (node, edge) in &self.edges {
            if let Edge::Branch { router, retry, .. } = edge {
                budget += self.cycle_len(*retry, *node).unwrap_or(1) * router.max_attempts();
            }
        }
        budget
    }

    /// Number of nodes on the retry path from `from` back to the branch
    /// node `to`, following fixed edges only. `None` if the path never
    /// returns (caught separately by `validate`).
    fn cycle_len(&self, from: NodeId, to: NodeId) -> Option<u32> {
        let mut len = 1;
        let mut current = from;
        while current != to {
            match self.edges.get(&current) {
                Some(Edge::Next(next)) => current = *next,
                _ => return None,
            }
            len += 1;
            if len > self.edges.len() as u32 {
                return None;
            }
        }
        Some(len)
    }

    /// Check the wiring: every node has an edge, everything is reachable
    /// from the start, there is a terminal, at most one branch exists, and
    /// the branch's retry path leads back to the branch node.
    pub fn validate(&self) -> Result<()> {
        for node in NodeId::ALL {
            if !self.edges.contains_key(&node) {
                anyhow::bail!("node '{}' has no outgoing edge", node);
            }
        }

        let mut reachable = BTreeSet::new();
        let mut frontier = vec![self.start];
        while let Some(node) = frontier.pop() {
            if !reachable.insert(node) {
                continue;
            }
            match self.edges.get(&node) {
                Some(Edge::Next(next)) => frontier.push(*next),
                Some(Edge::Branch { forward, retry, .. }) => {
                    frontier.push(*forward);
                    frontier.push(*retry);
                }
                Some(Edge::End) => {}
                None => anyhow::bail!("edge of '{}' points at unwired node", node),
            }
        }
        for node in self.edges.keys() {
            if !reachable.contains(node) {
                anyhow::bail!("node '{}' is unreachable from the start node", node);
            }
        }

        if !self.edges.values().any(|e| matches!(e, Edge::End)) {
            anyhow::bail!("graph has no terminal node");
        }

        let branches: Vec<NodeId> = self
            .edges
            .iter()
            .filter(|(_, e)| matches!(e, Edge::Branch { .. }))
            .map(|(n, _)| *n)
            .collect();
        if branches.len() > 1 {
            anyhow::bail!("graph has more than one branch node: {:?}", branches);
        }
        for node in branches {
            if let Some(Edge::Branch { retry, .. }) = self.edges.get(&node) {
                if self.cycle_len(*retry, node).is_none() {
                    anyhow::bail!(
                        "retry edge of '{}' never returns to the branch node",
                        node
                    );
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_graph_validates() {
        let graph = Graph::standard(3);
        assert!(graph.validate().is_ok());
        assert_eq!(graph.start(), NodeId::LeadArchitect);
        assert_eq!(graph.node_count(), 6);
    }

    #[test]
    fn test_visit_budget_covers_retry_cycles() {
        let graph = Graph::standard(3);
        // 6 nodes + (visual + validator) * 3 retries
        assert_eq!(graph.visit_budget(), 12);
    }

    #[test]
    fn test_router_forwards_on_clean_batch() {
        let router = ValidationRouter::new(3);
        assert_eq!(router.decide(&[], 1), Route::Forward);
    }

    #[test]
    fn test_router_retries_below_cap() {
        let router = ValidationRouter::new(3);
        let defects = vec!["bad arrow".to_string()];
        assert_eq!(router.decide(&defects, 1), Route::Retry);
        assert_eq!(router.decide(&defects, 2), Route::Retry);
    }

    #[test]
    fn test_router_forwards_at_cap_despite_defects() {
        let router = ValidationRouter::new(3);
        let defects = vec!["bad arrow".to_string()];
        assert_eq!(router.decide(&defects, 3), Route::Forward);
        assert_eq!(router.decide(&defects, 4), Route::Forward);
    }

    #[test]
    fn test_missing_edge_fails_validation() {
        let mut edges = BTreeMap::new();
        edges.insert(NodeId::LeadArchitect, Edge::End);
        let graph = Graph::new(NodeId::LeadArchitect, edges);

        assert!(graph.validate().is_err());
    }

    #[test]
    fn test_retry_edge_must_cycle_back() {
        // Retry target escapes downstream instead of returning to the branch.
        let mut edges = BTreeMap::new();
        edges.insert(NodeId::LeadArchitect, Edge::Next(NodeId::VisualArchitect));
        edges.insert(NodeId::VisualArchitect, Edge::Next(NodeId::DiagramValidator));
        edges.insert(
            NodeId::DiagramValidator,
            Edge::Branch {
                router: ValidationRouter::new(3),
                forward: NodeId::BackendEngineer,
                retry: NodeId::BackendEngineer,
            },
        );
        edges.insert(NodeId::BackendEngineer, Edge::Next(NodeId::InfraSecurityDevops));
        edges.insert(NodeId::InfraSecurityDevops, Edge::Next(NodeId::GovernanceLead));
        edges.insert(NodeId::GovernanceLead, Edge::End);
        let graph = Graph::new(NodeId::LeadArchitect, edges);

        assert!(graph.validate().is_err());
    }
}
