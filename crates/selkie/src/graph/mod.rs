use crate::error::{Error, Result};

/// Input graph: externally owned nodes and directed edges.
///
/// The layout pass reads sizes and adjacency from here and never mutates it;
/// final positions are handed back through [`LayoutResult`].
#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn validate(&self) -> Result<()> {
        let mut node_exists: std::collections::BTreeSet<&str> = std::collections::BTreeSet::new();
        for n in &self.nodes {
            if !(n.width.is_finite() && n.height.is_finite() && n.width >= 0.0 && n.height >= 0.0)
            {
                return Err(Error::InvalidNodeSize {
                    id: n.id.clone(),
                    width: n.width,
                    height: n.height,
                });
            }
            if !node_exists.insert(n.id.as_str()) {
                return Err(Error::DuplicateNodeId { id: n.id.clone() });
            }
        }
        for e in &self.edges {
            if !node_exists.contains(e.source.as_str()) || !node_exists.contains(e.target.as_str())
            {
                return Err(Error::MissingEndpoint {
                    source_id: e.source.clone(),
                    target_id: e.target.clone(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub width: f64,
    pub height: f64,
}

/// Directed edge; direction only matters for cost bookkeeping (each
/// connection is counted once, on its source side).
#[derive(Debug, Clone)]
pub struct Edge {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Final node positions (centers), keyed by node id, with the whole layout
/// centered on the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    pub positions: std::collections::BTreeMap<String, Point>,
}
