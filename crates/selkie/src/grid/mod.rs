//! Grid model for the annealed placement.
//!
//! All cells live in one contiguous arena and are referenced by index
//! everywhere else; `slots` holds the mutable placement binding (row-major),
//! so a trial move is two index writes plus a rect update per cell.

use rustc_hash::FxHashMap;

use crate::LayoutOptions;
use crate::error::{Error, Result};
use crate::graph::{Graph, LayoutResult, Point};

pub(crate) type CellId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    fn center_x(&self) -> f64 {
        self.x + self.w / 2.0
    }

    fn center_y(&self) -> f64 {
        self.y + self.h / 2.0
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Cell {
    /// Index into `graph.nodes`, or `None` for an empty placeholder.
    pub node: Option<usize>,
    pub rect: Rect,
    /// Rect as of the last `push_rect`; restoring it is the O(1) undo of a
    /// rejected trial move.
    stash: Rect,
    pub incoming: Vec<CellId>,
    pub outgoing: Vec<CellId>,
}

impl Cell {
    fn push_rect(&mut self) {
        self.stash = self.rect;
    }

    fn pop_rect(&mut self) {
        self.rect = self.stash;
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Grid {
    /// Cell arena. Adjacency is wired once at build time and never mutated
    /// afterwards; only placements (`slots`) and rects change.
    cells: Vec<Cell>,
    /// `slots[slot] = cell`, row-major. A swap exchanges two entries here.
    slots: Vec<CellId>,
    pub rows: usize,
    pub cols: usize,
    /// Cells bound to a node, in binding order.
    pub occupied: Vec<CellId>,
    cell_width: f64,
    cell_height: f64,
    min_edge_length: f64,
}

impl Grid {
    /// Builds the initial placement: a rows x cols grid sized from total node
    /// area and the target aspect ratio, nodes bound to successive cells.
    pub(crate) fn build(graph: &Graph, options: &LayoutOptions) -> Result<Grid> {
        let min_edge_length = options.min_edge_length;
        let cell_width = options.cell_width;
        let cell_height = options.cell_height;

        // A node smaller than a grid cell still occupies a full cell, so its
        // footprint is clamped to the cell size; otherwise small nodes could
        // produce a grid with fewer cells than nodes.
        let mut area = 0.0;
        for node in &graph.nodes {
            let w = node.width.max(cell_width);
            let h = node.height.max(cell_height);
            area += (w + min_edge_length) * (h + min_edge_length);
        }

        let height = (area / options.aspect_ratio).sqrt();
        let width = if height > 0.0 { area / height } else { 0.0 };

        let rows = (height / (cell_height + min_edge_length)) as usize + 1;
        let cols = (width / (cell_width + min_edge_length)) as usize + 1;

        let mut cells = Vec::with_capacity(rows * cols);
        let mut slots = Vec::with_capacity(rows * cols);
        let mut occupied = Vec::with_capacity(graph.nodes.len());
        let mut cell_of_node: FxHashMap<&str, CellId> = FxHashMap::default();

        // Nodes are consumed back-to-front: the last node lands in slot 0.
        let mut pending: Vec<usize> = (0..graph.nodes.len()).collect();

        for row in 0..rows {
            for col in 0..cols {
                let id = cells.len();
                let node = pending.pop();
                cells.push(Cell {
                    node,
                    rect: Rect {
                        x: col as f64 * cell_width,
                        y: row as f64 * cell_height,
                        w: cell_width,
                        h: cell_height,
                    },
                    stash: Rect::default(),
                    incoming: Vec::new(),
                    outgoing: Vec::new(),
                });
                slots.push(id);
                if let Some(node) = node {
                    occupied.push(id);
                    cell_of_node.insert(graph.nodes[node].id.as_str(), id);
                }
            }
        }

        for edge in &graph.edges {
            let (Some(&source), Some(&target)) = (
                cell_of_node.get(edge.source.as_str()),
                cell_of_node.get(edge.target.as_str()),
            ) else {
                return Err(Error::MissingEndpoint {
                    source_id: edge.source.clone(),
                    target_id: edge.target.clone(),
                });
            };
            cells[source].outgoing.push(target);
            cells[target].incoming.push(source);
        }

        Ok(Grid {
            cells,
            slots,
            rows,
            cols,
            occupied,
            cell_width,
            cell_height,
            min_edge_length,
        })
    }

    pub(crate) fn cell_at_slot(&self, slot: usize) -> CellId {
        self.slots[slot]
    }

    fn slot_origin(&self, slot: usize) -> (f64, f64) {
        let row = slot / self.cols;
        let col = slot % self.cols;
        (col as f64 * self.cell_width, row as f64 * self.cell_height)
    }

    /// Manhattan distance between cell centers.
    fn center_distance(&self, a: CellId, b: CellId) -> f64 {
        let (a, b) = (&self.cells[a].rect, &self.cells[b].rect);
        (a.center_x() - b.center_x()).abs() + (a.center_y() - b.center_y()).abs()
    }

    /// Outgoing connection length only; summing this over all occupied cells
    /// counts each connection exactly once.
    pub(crate) fn out_cost(&self, id: CellId) -> f64 {
        self.cells[id]
            .outgoing
            .iter()
            .map(|&n| self.center_distance(id, n))
            .sum()
    }

    /// Incoming plus outgoing connection length. Trial moves are scored with
    /// this, since relocating a cell also stretches the edges of which it is
    /// the target.
    pub(crate) fn compound_cost(&self, id: CellId) -> f64 {
        let cell = &self.cells[id];
        cell.incoming
            .iter()
            .chain(cell.outgoing.iter())
            .map(|&n| self.center_distance(id, n))
            .sum()
    }

    pub(crate) fn total_cost(&self) -> f64 {
        self.occupied.iter().map(|&id| self.out_cost(id)).sum()
    }

    /// Exchanges the cells bound to two slots, moving each cell's rect to its
    /// new slot origin. The previous rects are stashed so `revert_swap` can
    /// restore them exactly.
    pub(crate) fn apply_swap(&mut self, source_slot: usize, target_slot: usize) {
        let a = self.slots[source_slot];
        let b = self.slots[target_slot];
        self.slots.swap(source_slot, target_slot);

        self.cells[a].push_rect();
        let (x, y) = self.slot_origin(target_slot);
        self.cells[a].rect.x = x;
        self.cells[a].rect.y = y;

        self.cells[b].push_rect();
        let (x, y) = self.slot_origin(source_slot);
        self.cells[b].rect.x = x;
        self.cells[b].rect.y = y;
    }

    /// Undoes a swap applied with `apply_swap` and not followed by another
    /// move of either cell.
    pub(crate) fn revert_swap(&mut self, source_slot: usize, target_slot: usize) {
        let a = self.slots[target_slot];
        let b = self.slots[source_slot];
        self.slots.swap(source_slot, target_slot);
        self.cells[a].pop_rect();
        self.cells[b].pop_rect();
    }

    /// Spreads rows and columns apart by the configured margin and converts
    /// the grid into final node positions, centered on the origin.
    ///
    /// The bounding box is taken over every cell, empty placeholders
    /// included, so the whole grid (not just its occupied corner) is what
    /// gets centered.
    pub(crate) fn into_positions(mut self, graph: &Graph) -> LayoutResult {
        let mut max_width = 0.0_f64;
        let mut max_height = 0.0_f64;
        for slot in 0..self.slots.len() {
            let row = slot / self.cols;
            let col = slot % self.cols;
            let cell = &mut self.cells[self.slots[slot]];
            cell.rect.x += col as f64 * self.min_edge_length;
            cell.rect.y += row as f64 * self.min_edge_length;
            max_width = max_width.max(cell.rect.x + cell.rect.w);
            max_height = max_height.max(cell.rect.y + cell.rect.h);
        }

        let mut positions = std::collections::BTreeMap::new();
        for &id in &self.occupied {
            let cell = &self.cells[id];
            if let Some(node) = cell.node {
                positions.insert(
                    graph.nodes[node].id.clone(),
                    Point {
                        x: self.cell_width / 2.0 + cell.rect.x - max_width / 2.0,
                        y: self.cell_height / 2.0 + cell.rect.y - max_height / 2.0,
                    },
                );
            }
        }
        LayoutResult { positions }
    }
}
