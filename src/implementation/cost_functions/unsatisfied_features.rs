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

//! `raw(sol) = (number of ChoiceFeatures outside their satisfied interval)²`
//! (§4.2, "SquareOfSumOfUnsatisfiedFeatures").

use fxhash::FxHashMap;

use crate::{Candidate, CfnError, CfnResult, CostFunction, Scratch};

/// A single feature: offset plus contributors indexed by variable-node index
/// after `finalize`. Contributions from fixed (one-choice) nodes are folded
/// into `offset` at `finalize` time.
struct Feature {
    offset: f64,
    min: f64,
    max: f64,
    contributors: Vec<(usize, usize, f64)>, // (var index, choice, count), post-finalize
}

impl Feature {
    fn live_connection_count(&self, sol: &Candidate) -> f64 {
        self.offset
            + self
                .contributors
                .iter()
                .filter(|&&(v, c, _)| sol[v] == c)
                .map(|&(_, _, count)| count)
                .sum::<f64>()
    }

    fn is_unsatisfied(&self, sol: &Candidate) -> bool {
        let count = self.live_connection_count(sol);
        count < self.min || count > self.max
    }
}

pub struct SquareOfSumOfUnsatisfiedFeatures {
    weight: f64,
    building: Vec<FeatureBuilder>,
    features: Vec<Feature>,
}

struct FeatureBuilder {
    offset: f64,
    min: f64,
    max: f64,
    contributors: Vec<(usize, usize, f64)>, // (absolute node, choice, count)
}

/// Identifies a feature within one `SquareOfSumOfUnsatisfiedFeatures`, handed
/// back by `add_feature` so contributors can be attached afterwards.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FeatureId(usize);

impl SquareOfSumOfUnsatisfiedFeatures {
    pub fn new(weight: f64) -> CfnResult<Self> {
        if weight < 0.0 {
            return Err(CfnError::InvalidConfig("weight must be non-negative".to_string()));
        }
        Ok(SquareOfSumOfUnsatisfiedFeatures {
            weight,
            building: Vec::new(),
            features: Vec::new(),
        })
    }

    pub fn add_feature(&mut self, offset: f64, min: f64, max: f64) -> FeatureId {
        self.building.push(FeatureBuilder {
            offset,
            min,
            max,
            contributors: Vec::new(),
        });
        FeatureId(self.building.len() - 1)
    }

    pub fn add_contributor(&mut self, feature: FeatureId, node: usize, choice: usize, count: f64) {
        self.building[feature.0].contributors.push((node, choice, count));
    }
}

impl CostFunction for SquareOfSumOfUnsatisfiedFeatures {
    fn weight(&self) -> f64 {
        self.weight
    }

    fn finalize(&mut self, absolute_variable_nodes: &[usize]) {
        let var_index_of: FxHashMap<usize, usize> =
            absolute_variable_nodes.iter().enumerate().map(|(v, &n)| (n, v)).collect();
        self.features = self
            .building
            .drain(..)
            .map(|b| {
                let mut offset = b.offset;
                let mut contributors = Vec::new();
                for (node, choice, count) in b.contributors {
                    match var_index_of.get(&node) {
                        Some(&v) => contributors.push((v, choice, count)),
                        // One-choice node, always selecting its only choice (0).
                        None if choice == 0 => offset += count,
                        None => {}
                    }
                }
                Feature {
                    offset,
                    min: b.min,
                    max: b.max,
                    contributors,
                }
            })
            .collect();
    }

    fn absolute(&self, sol: &Candidate) -> f64 {
        let unsatisfied = self.features.iter().filter(|f| f.is_unsatisfied(sol)).count() as f64;
        self.weight * unsatisfied * unsatisfied
    }

    fn delta(&self, old: &Candidate, new: &Candidate, _scratch: Option<&mut dyn Scratch>) -> f64 {
        self.absolute(new) - self.absolute(old)
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_unsatisfied_features {
    use super::*;

    #[test]
    fn counts_features_outside_their_interval() {
        let mut cf = SquareOfSumOfUnsatisfiedFeatures::new(1.0).unwrap();
        let f0 = cf.add_feature(0.0, 1.0, 1.0); // satisfied iff exactly one contributor selected
        cf.add_contributor(f0, 0, 0, 1.0);
        cf.add_contributor(f0, 1, 0, 1.0);
        cf.finalize(&[0, 1]);

        // Neither chooses 0: count = 0, outside [1,1] -> unsatisfied.
        assert_eq!(1.0, cf.absolute(&vec![1, 1]));
        // Exactly one chooses 0: count = 1, inside [1,1] -> satisfied.
        assert_eq!(0.0, cf.absolute(&vec![0, 1]));
        // Both choose 0: count = 2, outside [1,1] -> unsatisfied.
        assert_eq!(1.0, cf.absolute(&vec![0, 0]));
    }

    #[test]
    fn fixed_node_contributor_folds_into_offset() {
        let mut cf = SquareOfSumOfUnsatisfiedFeatures::new(1.0).unwrap();
        let f0 = cf.add_feature(0.0, 2.0, 2.0);
        cf.add_contributor(f0, 0, 0, 1.0); // node 0 is fixed, contributes unconditionally
        cf.add_contributor(f0, 1, 0, 1.0);
        cf.finalize(&[1]);

        // var 0 (absolute node 1) chooses 0: live count = folded(1) + 1 = 2, satisfied.
        assert_eq!(0.0, cf.absolute(&vec![0]));
        // var 0 chooses elsewhere: live count = 1, unsatisfied -> squared count = 1.
        assert_eq!(1.0, cf.absolute(&vec![1]));
    }

    #[test]
    fn squares_the_unsatisfied_count() {
        let mut cf = SquareOfSumOfUnsatisfiedFeatures::new(3.0).unwrap();
        let f0 = cf.add_feature(0.0, 5.0, 5.0);
        let f1 = cf.add_feature(0.0, 5.0, 5.0);
        cf.add_contributor(f0, 0, 0, 1.0);
        cf.add_contributor(f1, 0, 1, 1.0);
        cf.finalize(&[0]);

        // Neither feature's interval [5,5] can ever be hit -> both unsatisfied always.
        assert_eq!(3.0 * 4.0, cf.absolute(&vec![0]));
    }
}
