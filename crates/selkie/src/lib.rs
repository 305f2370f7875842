#![forbid(unsafe_code)]

//! Headless mind-map grid layout via simulated annealing.
//!
//! `selkie` places the nodes of a small sparse directed graph on a grid so
//! that connected nodes end up close together, by minimizing total connection
//! length with a simulated-annealing search over cell swaps. It is
//! runtime-agnostic and does no rendering; callers feed in node sizes and
//! adjacency and get back origin-centered positions.
//!
//! A layout pass is three phases, run in order, once:
//! [`GridLayout::initialize`] -> [`GridLayout::optimize`] ->
//! [`GridLayout::extract`]. [`layout`] runs all three.

mod anneal;
pub mod error;
pub mod graph;
mod grid;

pub use error::{Error, Result};
pub use graph::{Edge, Graph, LayoutResult, Node, Point};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone)]
pub struct LayoutOptions {
    /// Target width/height ratio of the produced layout. Must be positive and
    /// finite.
    pub aspect_ratio: f64,
    /// Minimum gap between adjacent grid cells. Must be non-negative and
    /// finite; `0.0` makes cells abut.
    pub min_edge_length: f64,
    /// Grid cell width, i.e. the minimum node width of the embedding editor.
    pub cell_width: f64,
    /// Grid cell height, i.e. the minimum node height of the embedding
    /// editor.
    pub cell_height: f64,
    /// Seed for the annealer's generator. A fixed seed makes the whole pass
    /// reproducible; there is no ambient entropy fallback.
    pub random_seed: u64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            aspect_ratio: 1.0,
            min_edge_length: 0.0,
            cell_width: 200.0,
            cell_height: 150.0,
            random_seed: 0,
        }
    }
}

impl LayoutOptions {
    fn validate(&self) -> Result<()> {
        if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
            return Err(Error::InvalidAspectRatio {
                value: self.aspect_ratio,
            });
        }
        if !(self.min_edge_length.is_finite() && self.min_edge_length >= 0.0) {
            return Err(Error::InvalidMinEdgeLength {
                value: self.min_edge_length,
            });
        }
        if !(self.cell_width.is_finite()
            && self.cell_width > 0.0
            && self.cell_height.is_finite()
            && self.cell_height > 0.0)
        {
            return Err(Error::InvalidCellSize {
                width: self.cell_width,
                height: self.cell_height,
            });
        }
        Ok(())
    }
}

/// One layout pass over a borrowed graph.
///
/// The grid built by `initialize` is exclusively owned by this value, mutated
/// in place by `optimize`, and consumed by `extract`; it never outlives the
/// pass.
#[derive(Debug)]
pub struct GridLayout<'g> {
    graph: &'g Graph,
    grid: grid::Grid,
    random_seed: u64,
}

impl<'g> GridLayout<'g> {
    /// Builds the initial grid placement and wires cell adjacency from the
    /// graph's edges.
    pub fn initialize(graph: &'g Graph, options: &LayoutOptions) -> Result<Self> {
        options.validate()?;
        graph.validate()?;
        tracing::debug!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            aspect_ratio = options.aspect_ratio,
            min_edge_length = options.min_edge_length,
            "initializing grid layout"
        );
        let grid = grid::Grid::build(graph, options)?;
        Ok(Self {
            graph,
            grid,
            random_seed: options.random_seed,
        })
    }

    /// Runs the annealing search to convergence. CPU-bound and synchronous;
    /// callers needing responsiveness should run the pass on a worker thread.
    pub fn optimize(&mut self) {
        anneal::Annealer::new(&mut self.grid, self.random_seed).run();
    }

    /// Converts the optimized grid into final node positions, centered on the
    /// origin.
    pub fn extract(self) -> LayoutResult {
        self.grid.into_positions(self.graph)
    }
}

/// Headless layout entry point: initialize, optimize, extract.
pub fn layout(graph: &Graph, options: &LayoutOptions) -> Result<LayoutResult> {
    let mut pass = GridLayout::initialize(graph, options)?;
    pass.optimize();
    Ok(pass.extract())
}
