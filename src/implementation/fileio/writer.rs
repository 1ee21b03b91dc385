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

//! The solution writer (§4.8): the symmetrical counterpart to §4.6's reader.

use std::fmt::Write as _;

use crate::{Candidate, PairwiseProblem};

/// Serializes `choices` as `variable_node_absolute_index \t chosen_choice_index`
/// lines, one per variable node, in variable-index order. One-choice (fixed)
/// nodes were folded away at `finalize()` and have no variable index, so they
/// are never written.
pub fn write_solution(problem: &PairwiseProblem, choices: &Candidate) -> String {
    let mut out = String::new();
    for (v, &choice) in choices.iter().enumerate() {
        let node = problem.absolute_node_of(crate::Variable(v));
        let _ = writeln!(out, "{}\t{}", node.id(), choice);
    }
    out
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_writer {
    use super::*;

    #[test]
    fn writes_one_tab_separated_line_per_variable_node() {
        let mut problem = PairwiseProblem::new();
        problem.set_onebody(0, 0, 1.0).unwrap();
        problem.set_onebody(0, 1, 2.0).unwrap();
        problem.set_onebody(2, 0, 3.0).unwrap();
        problem.set_onebody(2, 1, 4.0).unwrap();
        problem.finalize().unwrap();

        let out = write_solution(&problem, &vec![1, 0]);
        assert_eq!("0\t1\n2\t0\n", out);
    }

    #[test]
    fn omits_folded_away_fixed_nodes() {
        let mut problem = PairwiseProblem::new();
        problem.set_onebody(0, 0, 1.0).unwrap(); // fixed: single choice
        problem.set_onebody(1, 0, 2.0).unwrap();
        problem.set_onebody(1, 1, 3.0).unwrap();
        problem.finalize().unwrap();

        let out = write_solution(&problem, &vec![1]);
        assert_eq!("1\t1\n", out);
    }
}
