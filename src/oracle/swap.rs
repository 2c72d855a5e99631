//! Swap neighborhood: exchange two nodes between vehicles.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use super::search::SearchState;
use super::utils::{find_node, replacement_delta};

impl SearchState<'_> {
    /// Apply the first improving inter-route exchange found.
    pub fn swap_neighborhood(&mut self, rng: &mut ChaCha8Rng) -> bool {
        let mut route_indices: Vec<usize> = (0..self.routes.len()).collect();
        route_indices.shuffle(rng);

        for &r1 in &route_indices {
            for pos1 in 0..self.routes[r1].len() {
                let node1 = self.routes[r1][pos1];
                let neighbors = self.neighbors[node1].clone();

                for node2 in neighbors {
                    let (r2, pos2) = match find_node(&self.routes, node2) {
                        Some(found) => found,
                        None => continue,
                    };
                    if r2 == r1 || !self.swap_fits(r1, node1, r2, node2) {
                        continue;
                    }

                    let delta = replacement_delta(self.problem, &self.routes[r1], pos1, node2)
                        + replacement_delta(self.problem, &self.routes[r2], pos2, node1);

                    if delta < 0 {
                        self.apply_swap(r1, pos1, r2, pos2);
                        return true;
                    }
                }
            }
        }

        false
    }

    /// Whether both vehicles stay within capacity after the exchange.
    fn swap_fits(&self, r1: usize, node1: usize, r2: usize, node2: usize) -> bool {
        let d1 = self.problem.demands[node1];
        let d2 = self.problem.demands[node2];
        d2 - d1 <= self.spare(r1) && d1 - d2 <= self.spare(r2)
    }

    fn apply_swap(&mut self, r1: usize, pos1: usize, r2: usize, pos2: usize) {
        let node1 = self.routes[r1][pos1];
        let node2 = self.routes[r2][pos2];
        self.routes[r1][pos1] = node2;
        self.routes[r2][pos2] = node1;

        let shift = self.problem.demands[node2] - self.problem.demands[node1];
        self.loads[r1] += shift;
        self.loads[r2] -= shift;
    }
}
