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

//! This module defines the most basic data types that are used throughout all
//! the code of our library (both at the abstraction and implementation levels).
//! These are also the types your client library is likely to work with.

// ----------------------------------------------------------------------------
// --- NODE / VARIABLE ---------------------------------------------------------
// ----------------------------------------------------------------------------

/// The absolute index of a node in `[0, n_nodes)`. Every node (fixed or
/// variable) has one of these; it is the index used by the file interpreter
/// and by solution output.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(pub usize);
impl NodeId {
    #[inline]
    pub fn id(self) -> usize {
        self.0
    }
}

/// This type denotes a variable node from the optimization problem at hand:
/// its dense index in `[0, n_vars)`, preserving the absolute ordering of the
/// nodes (of choice-count ≥ 2) it was carved out of.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Variable(pub usize);
impl Variable {
    #[inline]
    /// This function returns the id (numeric value) of the variable.
    ///
    /// # Examples:
    /// ```
    /// # use cfn_solve::Variable;
    /// assert_eq!(0, Variable(0).id());
    /// assert_eq!(1, Variable(1).id());
    /// assert_eq!(2, Variable(2).id());
    /// assert_eq!(3, Variable(3).id());
    /// ```
    pub fn id(self) -> usize {
        self.0
    }
}

// ----------------------------------------------------------------------------
// --- CANDIDATE / MOVE ---------------------------------------------------------
// ----------------------------------------------------------------------------

/// A candidate solution: one choice index per variable node, in variable-index
/// order. This is the type every scoring contract (`absolute`, `delta`) and
/// every solver move operates on.
pub type Candidate = Vec<usize>;

/// A single-site change to a candidate: flip `variable` to `choice`. Used by
/// the greedy optimizer to remember the best move of a sweep before committing
/// it.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Move {
    pub variable: Variable,
    pub choice: usize,
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_var {
    use crate::{NodeId, Variable};

    #[test]
    fn test_var_id() {
        assert_eq!(0, Variable(0).id());
        assert_eq!(1, Variable(1).id());
        assert_eq!(2, Variable(2).id());
        assert_eq!(3, Variable(3).id());
    }

    #[test]
    fn test_node_id() {
        assert_eq!(0, NodeId(0).id());
        assert_eq!(5, NodeId(5).id());
    }
}
