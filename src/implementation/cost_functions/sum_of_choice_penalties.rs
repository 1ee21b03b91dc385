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

//! `raw(sol) = (Σ penalty(v, sol[v]) + constant_offset)²`, the simplest of
//! the non-pairwise cost functions (§4.2).

use fxhash::FxHashMap;

use crate::{Candidate, CfnError, CfnResult, CostFunction, Scratch};

pub struct SumOfChoicePenalties {
    weight: f64,
    penalty: FxHashMap<usize, Vec<f64>>,
    constant_offset: f64,
    per_var: Vec<Vec<f64>>,
}

impl SumOfChoicePenalties {
    pub fn new(weight: f64) -> CfnResult<Self> {
        if weight < 0.0 {
            return Err(CfnError::InvalidConfig("weight must be non-negative".to_string()));
        }
        Ok(SumOfChoicePenalties {
            weight,
            penalty: FxHashMap::default(),
            constant_offset: 0.0,
            per_var: Vec::new(),
        })
    }

    pub fn set_penalty(&mut self, node: usize, choice: usize, value: f64) {
        let row = self.penalty.entry(node).or_default();
        if row.len() <= choice {
            row.resize(choice + 1, 0.0);
        }
        row[choice] += value;
    }

    pub fn add_constant_offset(&mut self, value: f64) {
        self.constant_offset += value;
    }

    fn penalty_at(&self, v: usize, choice: usize) -> f64 {
        self.per_var.get(v).and_then(|row| row.get(choice)).copied().unwrap_or(0.0)
    }

    fn raw_sum(&self, sol: &Candidate) -> f64 {
        self.constant_offset + sol.iter().enumerate().map(|(v, &c)| self.penalty_at(v, c)).sum::<f64>()
    }
}

impl CostFunction for SumOfChoicePenalties {
    fn weight(&self) -> f64 {
        self.weight
    }

    fn finalize(&mut self, absolute_variable_nodes: &[usize]) {
        let var_index_of: FxHashMap<usize, usize> =
            absolute_variable_nodes.iter().enumerate().map(|(v, &n)| (n, v)).collect();
        self.per_var = vec![Vec::new(); absolute_variable_nodes.len()];
        for (node, row) in self.penalty.drain() {
            if let Some(&v) = var_index_of.get(&node) {
                self.per_var[v] = row;
            } else {
                // One-choice (fixed) node: always at choice 0.
                self.constant_offset += row.first().copied().unwrap_or(0.0);
            }
        }
    }

    fn absolute(&self, sol: &Candidate) -> f64 {
        let s = self.raw_sum(sol);
        self.weight * s * s
    }

    fn delta(&self, old: &Candidate, new: &Candidate, _scratch: Option<&mut dyn Scratch>) -> f64 {
        self.absolute(new) - self.absolute(old)
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
