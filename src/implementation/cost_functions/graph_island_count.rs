// Copyright 2020 Xavier Gillard
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Connected-component (island) counting over the current-state interaction
//! graph, via an iterative (explicit-stack) flood fill (§4.2,
//! "GraphIslandCount"). Fixed (one-choice) nodes are out of scope for this
//! cost function: only interactions between two variable nodes shape the
//! graph, since a fixed node's single choice never changes the graph's
//! shape across a trajectory.

use std::any::Any;

use bit_set::BitSet;
use fxhash::FxHashMap;

use crate::{Candidate, CfnError, CfnResult, CostFunction, Scratch};

/// Reusable flood-fill working buffers, handed out once per trajectory via
/// `make_scratch` and reused across every `delta` call to avoid repeated
/// allocation.
struct IslandScratch {
    visited: BitSet,
    stack: Vec<usize>,
}

impl Scratch for IslandScratch {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub struct GraphIslandCount {
    weight: f64,
    min_island_size: usize,
    edges: FxHashMap<(usize, usize), Vec<Vec<bool>>>,
    adjacency: Vec<Vec<(usize, Vec<Vec<bool>>)>>, // var index -> (other var index, self x other matrix)
}

fn transpose_bool(m: &[Vec<bool>]) -> Vec<Vec<bool>> {
    if m.is_empty() {
        return Vec::new();
    }
    let rows = m.len();
    let cols = m[0].len();
    let mut t = vec![vec![false; rows]; cols];
    for (r, row) in m.iter().enumerate() {
        for (c, &v) in row.iter().enumerate() {
            t[c][r] = v;
        }
    }
    t
}

impl GraphIslandCount {
    pub fn new(weight: f64, min_island_size: usize) -> CfnResult<Self> {
        if weight < 0.0 {
            return Err(CfnError::InvalidConfig("weight must be non-negative".to_string()));
        }
        if min_island_size == 0 {
            return Err(CfnError::InvalidConfig("min_island_size must be at least 1".to_string()));
        }
        Ok(GraphIslandCount {
            weight,
            min_island_size,
            edges: FxHashMap::default(),
            adjacency: Vec::new(),
        })
    }

    /// Declares that choices `choice_a` of node `a` and `choice_b` of node
    /// `b` interact (or not), filling the `K_a x K_b` boolean matrix on
    /// demand. Requires `a < b`.
    pub fn set_interaction(
        &mut self,
        a: usize,
        b: usize,
        choice_a: usize,
        choice_b: usize,
        interacts: bool,
    ) -> CfnResult<()> {
        if a >= b {
            return Err(CfnError::InvalidKey { a, b });
        }
        let m = self.edges.entry((a, b)).or_insert_with(Vec::new);
        if m.len() <= choice_a {
            let cols = m.first().map(|r| r.len()).unwrap_or(0).max(choice_b + 1);
            m.resize(choice_a + 1, vec![false; cols]);
        }
        if m[choice_a].len() <= choice_b {
            let new_cols = choice_b + 1;
            for row in m.iter_mut() {
                row.resize(new_cols, false);
            }
        }
        m[choice_a][choice_b] = interacts;
        Ok(())
    }

    fn raw_into(&self, sol: &Candidate, visited: &mut BitSet, stack: &mut Vec<usize>) -> f64 {
        visited.clear();
        let mut accumulator = 0.0f64;
        for start in 0..sol.len() {
            if visited.contains(start) {
                continue;
            }
            stack.clear();
            stack.push(start);
            visited.insert(start);
            let mut size = 0usize;
            while let Some(u) = stack.pop() {
                size += 1;
                for (other, matrix) in &self.adjacency[u] {
                    if !visited.contains(*other) && matrix[sol[u]][sol[*other]] {
                        visited.insert(*other);
                        stack.push(*other);
                    }
                }
            }
            if size >= self.min_island_size {
                accumulator += (size - self.min_island_size + 1) as f64;
            }
        }
        -self.weight * accumulator
    }
}

impl CostFunction for GraphIslandCount {
    fn weight(&self) -> f64 {
        self.weight
    }

    fn finalize(&mut self, absolute_variable_nodes: &[usize]) {
        let var_index_of: FxHashMap<usize, usize> =
            absolute_variable_nodes.iter().enumerate().map(|(v, &n)| (n, v)).collect();
        let mut adjacency = vec![Vec::new(); absolute_variable_nodes.len()];
        for ((a, b), m) in self.edges.drain() {
            if let (Some(&va), Some(&vb)) = (var_index_of.get(&a), var_index_of.get(&b)) {
                adjacency[va].push((vb, m.clone()));
                adjacency[vb].push((va, transpose_bool(&m)));
            }
        }
        self.adjacency = adjacency;
    }

    fn absolute(&self, sol: &Candidate) -> f64 {
        let mut visited = BitSet::with_capacity(sol.len());
        let mut stack = Vec::new();
        self.raw_into(sol, &mut visited, &mut stack)
    }

    fn delta(&self, old: &Candidate, new: &Candidate, scratch: Option<&mut dyn Scratch>) -> f64 {
        match scratch.and_then(|s| s.as_any_mut().downcast_mut::<IslandScratch>()) {
            Some(buf) => {
                let old_v = self.raw_into(old, &mut buf.visited, &mut buf.stack);
                let new_v = self.raw_into(new, &mut buf.visited, &mut buf.stack);
                new_v - old_v
            }
            None => {
                let mut visited = BitSet::with_capacity(old.len());
                let mut stack = Vec::new();
                let old_v = self.raw_into(old, &mut visited, &mut stack);
                let new_v = self.raw_into(new, &mut visited, &mut stack);
                new_v - old_v
            }
        }
    }

    fn make_scratch(&self) -> Option<Box<dyn Scratch>> {
        Some(Box::new(IslandScratch {
            visited: BitSet::new(),
            stack: Vec::new(),
        }))
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_graph_island_count {
    use super::*;

    /// A 4-node chain 0-1-2-3 where interaction depends on both endpoints
    /// picking choice 0.
    fn chain_of_four() -> GraphIslandCount {
        let mut cf = GraphIslandCount::new(1.0, 2).unwrap();
        for (a, b) in [(0, 1), (1, 2), (2, 3)] {
            cf.set_interaction(a, b, 0, 0, true).unwrap();
        }
        cf.finalize(&[0, 1, 2, 3]);
        cf
    }

    #[test]
    fn all_choosing_zero_forms_one_big_island() {
        let cf = chain_of_four();
        // one island of size 4 >= min(2): contributes 4-2+1=3 -> -weight*3
        assert_eq!(-3.0, cf.absolute(&vec![0, 0, 0, 0]));
    }

    #[test]
    fn breaking_the_chain_splits_the_island() {
        let cf = chain_of_four();
        // node 2 picks something else: edges (1,2) and (2,3) both break.
        // islands: {0,1} size 2 -> contributes 1; {2} size 1 < min(2) -> 0; {3} size 1 -> 0.
        assert_eq!(-1.0, cf.absolute(&vec![0, 0, 1, 0]));
    }

    #[test]
    fn no_interactions_means_every_node_is_its_own_singleton() {
        let cf = chain_of_four();
        assert_eq!(0.0, cf.absolute(&vec![1, 1, 1, 1]));
    }

    #[test]
    fn delta_matches_the_absolute_difference_with_and_without_scratch() {
        let cf = chain_of_four();
        let old = vec![0, 0, 0, 0];
        let new = vec![0, 0, 1, 0];
        let expect = cf.absolute(&new) - cf.absolute(&old);

        assert_eq!(expect, cf.delta(&old, &new, None));

        let mut scratch = cf.make_scratch();
        assert_eq!(expect, cf.delta(&old, &new, scratch.as_deref_mut()));
    }

    #[test]
    fn rejects_zero_min_island_size() {
        assert!(matches!(GraphIslandCount::new(1.0, 0), Err(CfnError::InvalidConfig(_))));
    }
}
