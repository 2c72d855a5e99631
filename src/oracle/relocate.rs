//! Relocate neighborhood: move one node into another vehicle.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use super::search::SearchState;
use super::utils::{find_node, insertion_delta, removal_delta};

impl SearchState<'_> {
    /// Apply the best relocation of the first node that has an improving one.
    pub fn relocate_neighborhood(&mut self, rng: &mut ChaCha8Rng) -> bool {
        let mut route_indices: Vec<usize> = (0..self.routes.len()).collect();
        route_indices.shuffle(rng);

        for &r1 in &route_indices {
            for pos in 0..self.routes[r1].len() {
                if let Some((r2, insert_pos)) = self.best_relocation(r1, pos) {
                    self.apply_relocate(r1, pos, r2, insert_pos);
                    return true;
                }
            }
        }

        false
    }

    /// Best improving destination of the node at `routes[r1][pos]`.
    fn best_relocation(&self, r1: usize, pos: usize) -> Option<(usize, usize)> {
        let problem = self.problem;
        let node = self.routes[r1][pos];
        let demand = problem.demands[node];
        let removal = removal_delta(problem, &self.routes[r1], pos);

        let mut best_delta = 0;
        let mut best = None;

        // Next to one of the node's close neighbours
        for &neighbor in &self.neighbors[node] {
            let (r2, neighbor_pos) = match find_node(&self.routes, neighbor) {
                Some(found) => found,
                None => continue,
            };
            if r2 == r1 || self.spare(r2) < demand {
                continue;
            }

            for insert_pos in [neighbor_pos, neighbor_pos + 1] {
                let delta = removal + insertion_delta(problem, &self.routes[r2], node, insert_pos);
                if delta < best_delta {
                    best_delta = delta;
                    best = Some((r2, insert_pos));
                }
            }
        }

        // Into an idle vehicle
        for r2 in 0..self.routes.len() {
            if r2 == r1 || !self.routes[r2].is_empty() || self.spare(r2) < demand {
                continue;
            }
            let delta = removal + insertion_delta(problem, &self.routes[r2], node, 0);
            if delta < best_delta {
                best_delta = delta;
                best = Some((r2, 0));
            }
        }

        best
    }

    fn apply_relocate(&mut self, r1: usize, pos: usize, r2: usize, insert_pos: usize) {
        let node = self.routes[r1].remove(pos);
        self.routes[r2].insert(insert_pos, node);

        let demand = self.problem.demands[node];
        self.loads[r1] -= demand;
        self.loads[r2] += demand;
    }
}
