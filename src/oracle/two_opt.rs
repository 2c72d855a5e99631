//! 2-Opt neighborhood (intra-route).

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use super::search::SearchState;

impl SearchState<'_> {
    /// Reverse the first segment whose reversal shortens its route.
    pub fn two_opt_neighborhood(&mut self, rng: &mut ChaCha8Rng) -> bool {
        let mut route_indices: Vec<usize> = (0..self.routes.len()).collect();
        route_indices.shuffle(rng);

        for &r_idx in &route_indices {
            if let Some((i, j)) = self.first_two_opt(r_idx) {
                // Path positions i+1..=j are route positions i..j
                self.routes[r_idx][i..j].reverse();
                return true;
            }
        }

        false
    }

    /// First improving pair of edges `(i, j)` of the depot-closed path.
    fn first_two_opt(&self, r_idx: usize) -> Option<(usize, usize)> {
        let route = &self.routes[r_idx];
        let len = route.len();
        if len < 2 {
            return None;
        }

        let mut path = Vec::with_capacity(len + 2);
        path.push(0);
        path.extend_from_slice(route);
        path.push(0);

        let d = |a: usize, b: usize| self.problem.distance(a, b);

        for i in 0..len - 1 {
            for j in i + 2..=len {
                let old_cost = d(path[i], path[i + 1]) + d(path[j], path[j + 1]);
                let new_cost = d(path[i], path[j]) + d(path[i + 1], path[j + 1]);

                if new_cost < old_cost {
                    return Some((i, j));
                }
            }
        }

        None
    }
}
