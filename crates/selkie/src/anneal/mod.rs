//! Simulated-annealing search over grid placements.
//!
//! The search repeatedly proposes exchanging two random grid slots, accepts
//! per the Metropolis criterion, and halves the temperature whenever a level
//! stops producing meaningful improvement.

use tracing::{debug, trace};

use crate::grid::Grid;

/// A prospective exchange of the cells bound to two slots.
#[derive(Debug, Clone, Copy)]
struct Change {
    source_slot: usize,
    target_slot: usize,
}

pub(crate) struct Annealer<'a> {
    grid: &'a mut Grid,
    rng: XorShift64Star,
}

impl<'a> Annealer<'a> {
    const INITIAL_TEMPERATURE: f64 = 200.0;
    const FINAL_TEMPERATURE: f64 = 0.05;
    const COOLING_FACTOR: f64 = 0.5;
    /// Proposals per occupied cell in one batch.
    const TRIALS_PER_CELL: usize = 100;
    /// A batch improving the cost by less than this fraction counts as
    /// stalled.
    const STALL_THRESHOLD: f64 = 0.1;
    /// Consecutive stalled batches before the level cools.
    const STALL_LIMIT: u32 = 5;

    pub(crate) fn new(grid: &'a mut Grid, random_seed: u64) -> Self {
        Self {
            grid,
            rng: XorShift64Star::new(random_seed),
        }
    }

    pub(crate) fn run(&mut self) {
        if self.grid.occupied.len() < 2 {
            return;
        }

        let mut cost = self.grid.total_cost();
        let initial_cost = cost;
        debug!(initial_cost, "starting annealing pass");

        let trials = self.grid.occupied.len() * Self::TRIALS_PER_CELL;
        let mut temperature = Self::INITIAL_TEMPERATURE;
        while temperature > Self::FINAL_TEMPERATURE {
            let mut stuck = 0u32;
            while stuck < Self::STALL_LIMIT {
                let batch_start = cost;
                let mut accepts = 0usize;
                let mut rejects = 0usize;

                for _ in 0..trials {
                    let change = self.plan_change();
                    let a = self.grid.cell_at_slot(change.source_slot);
                    let b = self.grid.cell_at_slot(change.target_slot);

                    let mut new_cost =
                        cost - self.grid.compound_cost(a) - self.grid.compound_cost(b);
                    self.grid.apply_swap(change.source_slot, change.target_slot);
                    new_cost += self.grid.compound_cost(a) + self.grid.compound_cost(b);

                    let delta = new_cost - cost;
                    if delta <= 0.0 || self.rng.next_f64_unit() < (-delta / temperature).exp() {
                        cost = new_cost;
                        accepts += 1;
                    } else {
                        self.grid
                            .revert_swap(change.source_slot, change.target_slot);
                        rejects += 1;
                    }
                }

                // A zero-cost placement cannot improve; count the batch as
                // stalled rather than dividing by zero.
                let improvement = if batch_start > 0.0 {
                    (batch_start - cost) / batch_start
                } else {
                    0.0
                };
                trace!(cost, improvement, accepts, rejects, temperature, "batch finished");
                if improvement < Self::STALL_THRESHOLD {
                    stuck += 1;
                } else {
                    stuck = 0;
                }
            }
            temperature *= Self::COOLING_FACTOR;
        }

        let gain = if initial_cost > 0.0 {
            (initial_cost - cost) / initial_cost
        } else {
            0.0
        };
        debug!(final_cost = cost, gain, "annealing pass finished");
    }

    /// Picks two distinct slots, each by drawing a row and then a column
    /// within it. Every row holds `cols` cells (empty placeholders included),
    /// so a row pick never needs a retry; swapping with an empty cell simply
    /// relocates a node.
    fn plan_change(&mut self) -> Change {
        loop {
            let source_slot = self.random_slot();
            let target_slot = self.random_slot();
            if source_slot != target_slot {
                return Change {
                    source_slot,
                    target_slot,
                };
            }
        }
    }

    fn random_slot(&mut self) -> usize {
        let row = self.rng.next_usize(self.grid.rows);
        let col = self.rng.next_usize(self.grid.cols);
        row * self.grid.cols + col
    }
}

/// Explicitly seeded generator owned by the annealer for the whole pass, so a
/// fixed seed reproduces the layout bit for bit.
#[derive(Debug, Clone)]
struct XorShift64Star {
    state: u64,
}

impl XorShift64Star {
    fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D_u64)
    }

    /// Uniform in [0, 1) with 53 bits of precision.
    fn next_f64_unit(&mut self) -> f64 {
        let u = self.next_u64() >> 11;
        (u as f64) / ((1u64 << 53) as f64)
    }

    fn next_usize(&mut self, upper: usize) -> usize {
        if upper <= 1 {
            return 0;
        }
        let v = self.next_f64_unit();
        let idx = (v * (upper as f64)).floor() as usize;
        idx.min(upper - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LayoutOptions;
    use crate::graph::{Edge, Graph, Node};

    fn node(id: &str) -> Node {
        Node {
            id: id.to_string(),
            width: 200.0,
            height: 150.0,
        }
    }

    fn edge(source: &str, target: &str) -> Edge {
        Edge {
            source: source.to_string(),
            target: target.to_string(),
        }
    }

    fn path_graph(ids: &[&str]) -> Graph {
        Graph {
            nodes: ids.iter().map(|id| node(id)).collect(),
            edges: ids
                .windows(2)
                .map(|pair| edge(pair[0], pair[1]))
                .collect(),
        }
    }

    #[test]
    fn rng_is_deterministic_for_a_fixed_seed() {
        let mut a = XorShift64Star::new(42);
        let mut b = XorShift64Star::new(42);
        for _ in 0..1000 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn rng_unit_draws_stay_in_range() {
        let mut rng = XorShift64Star::new(7);
        for _ in 0..10_000 {
            let v = rng.next_f64_unit();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn rng_bounded_draws_stay_below_the_bound() {
        let mut rng = XorShift64Star::new(7);
        for upper in [1usize, 2, 3, 7, 100] {
            for _ in 0..1000 {
                assert!(rng.next_usize(upper) < upper);
            }
        }
    }

    #[test]
    fn zero_seed_is_usable() {
        let mut rng = XorShift64Star::new(0);
        assert!(rng.next_u64() != 0);
    }

    #[test]
    fn fewer_than_two_occupied_cells_is_a_no_op() {
        for n in [0usize, 1] {
            let graph = Graph {
                nodes: (0..n).map(|i| node(&format!("n{i}"))).collect(),
                edges: Vec::new(),
            };
            let mut grid = Grid::build(&graph, &LayoutOptions::default()).unwrap();
            Annealer::new(&mut grid, 0).run();
            assert_eq!(grid.total_cost(), 0.0);
        }
    }

    #[test]
    fn annealing_terminates_on_a_zero_cost_placement() {
        // Two unconnected nodes: every placement costs 0, so every batch must
        // count as stalled and the pass must still finish.
        let graph = Graph {
            nodes: vec![node("a"), node("b")],
            edges: Vec::new(),
        };
        let mut grid = Grid::build(&graph, &LayoutOptions::default()).unwrap();
        Annealer::new(&mut grid, 0).run();
        assert_eq!(grid.total_cost(), 0.0);
    }

    #[test]
    fn annealing_does_not_worsen_a_small_path() {
        let graph = path_graph(&["a", "b", "c", "d"]);
        let mut grid = Grid::build(&graph, &LayoutOptions::default()).unwrap();
        let initial = grid.total_cost();
        Annealer::new(&mut grid, 1).run();
        assert!(grid.total_cost() <= initial);
    }

    #[test]
    fn total_cost_stays_non_negative_throughout() {
        let graph = path_graph(&["a", "b", "c", "d", "e", "f"]);
        let mut grid = Grid::build(&graph, &LayoutOptions::default()).unwrap();
        Annealer::new(&mut grid, 3).run();
        assert!(grid.total_cost() >= 0.0);
    }
}
