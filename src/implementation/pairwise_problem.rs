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

//! The pairwise-precomputed problem store (component A): one- and two-body
//! penalty tables, the finalize algebra that folds fixed (one-choice) nodes
//! away, and the `absolute`/`delta` scoring contract every solver relies on.

use fxhash::FxHashMap;

use crate::{Candidate, CfnError, CfnResult, CostFunction, NodeId, Scratch, Variable};

/// A dense row-major matrix used for a two-body penalty block.
type Matrix = Vec<Vec<f64>>;

fn zero_matrix(rows: usize, cols: usize) -> Matrix {
    vec![vec![0.0; cols]; rows]
}

fn grow_matrix(m: &mut Matrix, rows: usize, cols: usize) {
    if m.is_empty() {
        *m = zero_matrix(rows, cols);
        return;
    }
    let cur_cols = m[0].len();
    if cols > cur_cols {
        for row in m.iter_mut() {
            row.resize(cols, 0.0);
        }
    }
    if rows > m.len() {
        let width = cols.max(cur_cols);
        m.resize(rows, vec![0.0; width]);
    }
}

fn transpose(m: &Matrix) -> Matrix {
    if m.is_empty() {
        return Vec::new();
    }
    let rows = m.len();
    let cols = m[0].len();
    let mut t = zero_matrix(cols, rows);
    for (r, row) in m.iter().enumerate() {
        for (c, &v) in row.iter().enumerate() {
            t[c][r] = v;
        }
    }
    t
}

/// One interacting neighbor of a variable node, as materialized at finalize
/// time: the other variable's index and the penalty matrix oriented with
/// `self` as the row and `other` as the column.
struct Interaction {
    other: usize,
    matrix: Matrix,
}

/// The pairwise-decomposable discrete optimization problem store (§3-§4.1).
///
/// Construct, call `set_onebody`/`set_twobody`/`add_cost_function` /
/// `add_starting_solution` any number of times, then call `finalize()` once.
/// After that every mutator returns `AlreadyFinalized` and `absolute`/`delta`
/// become available.
pub struct PairwiseProblem {
    // -- pre-finalize state, keyed by absolute node id --------------------
    n_choices: FxHashMap<usize, usize>,
    onebody: FxHashMap<usize, Vec<f64>>,
    twobody: FxHashMap<(usize, usize), Matrix>,
    candidate_starting_solutions: Vec<Candidate>,
    background_offset: f64,
    cost_functions: Vec<Box<dyn CostFunction>>,
    finalized: bool,

    // -- post-finalize state, keyed by variable index ---------------------
    variable_nodes: Vec<usize>,         // var index -> absolute node id
    var_index_of: FxHashMap<usize, usize>, // absolute node id -> var index
    n_choices_var: Vec<usize>,          // var index -> choice count
    onebody_var: Vec<Vec<f64>>,         // var index -> one-body row
    interacting: Vec<Vec<Interaction>>, // var index -> neighbors
    one_choice_offset: f64,
}

impl Default for PairwiseProblem {
    fn default() -> Self {
        Self::new()
    }
}

impl PairwiseProblem {
    pub fn new() -> Self {
        PairwiseProblem {
            n_choices: FxHashMap::default(),
            onebody: FxHashMap::default(),
            twobody: FxHashMap::default(),
            candidate_starting_solutions: Vec::new(),
            background_offset: 0.0,
            cost_functions: Vec::new(),
            finalized: false,
            variable_nodes: Vec::new(),
            var_index_of: FxHashMap::default(),
            n_choices_var: Vec::new(),
            onebody_var: Vec::new(),
            interacting: Vec::new(),
            one_choice_offset: 0.0,
        }
    }

    fn require_not_finalized(&self) -> CfnResult<()> {
        if self.finalized {
            Err(CfnError::AlreadyFinalized)
        } else {
            Ok(())
        }
    }

    fn require_finalized(&self) -> CfnResult<()> {
        if self.finalized {
            Ok(())
        } else {
            Err(CfnError::NotFinalized)
        }
    }

    fn note_choice(&mut self, node: usize, choice: usize) {
        let entry = self.n_choices.entry(node).or_insert(0);
        if choice + 1 > *entry {
            *entry = choice + 1;
        }
    }

    /// Adds `value` to the one-body penalty of `(node, choice)`, growing the
    /// backing vector with zero padding as needed.
    pub fn set_onebody(&mut self, node: usize, choice: usize, value: f64) -> CfnResult<()> {
        self.require_not_finalized()?;
        self.note_choice(node, choice);
        let row = self.onebody.entry(node).or_default();
        if row.len() <= choice {
            row.resize(choice + 1, 0.0);
        }
        row[choice] += value;
        Ok(())
    }

    /// Adds `value` to the two-body penalty of `((a, choice_a), (b, choice_b))`.
    /// Requires `a < b`.
    pub fn set_twobody(
        &mut self,
        a: usize,
        b: usize,
        choice_a: usize,
        choice_b: usize,
        value: f64,
    ) -> CfnResult<()> {
        self.require_not_finalized()?;
        if a >= b {
            return Err(CfnError::InvalidKey { a, b });
        }
        self.note_choice(a, choice_a);
        self.note_choice(b, choice_b);
        let rows = self.n_choices[&a];
        let cols = self.n_choices[&b];
        let m = self.twobody.entry((a, b)).or_insert_with(Vec::new);
        grow_matrix(m, rows, cols);
        m[choice_a][choice_b] += value;
        Ok(())
    }

    /// Sets the constant added to every score (user-supplied background
    /// energy, independent of the candidate).
    pub fn set_background_offset(&mut self, value: f64) -> CfnResult<()> {
        self.require_not_finalized()?;
        self.background_offset = value;
        Ok(())
    }

    /// Attaches a non-pairwise cost-function plug-in (§4.2). Its `finalize`
    /// is invoked when the problem itself finalizes.
    pub fn add_cost_function(&mut self, cost_function: Box<dyn CostFunction>) -> CfnResult<()> {
        self.require_not_finalized()?;
        if cost_function.weight() < 0.0 {
            return Err(CfnError::InvalidConfig(
                "cost function weight must be non-negative".to_string(),
            ));
        }
        self.cost_functions.push(cost_function);
        Ok(())
    }

    /// Registers a candidate starting vector for solvers that prefer
    /// problem-supplied starting points over random ones.
    pub fn add_starting_solution(&mut self, sol: Candidate) -> CfnResult<()> {
        self.require_not_finalized()?;
        self.candidate_starting_solutions.push(sol);
        Ok(())
    }

    pub fn starting_solutions(&self) -> &[Candidate] {
        &self.candidate_starting_solutions
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Folds one-choice (fixed) nodes away and builds the fast lookup tables
    /// used by `absolute`/`delta`. Idempotent-in-result but callable at most
    /// once; see §4.1 and §9.
    pub fn finalize(&mut self) -> CfnResult<()> {
        self.require_not_finalized()?;

        // Pass 1: fold every two-body block touching a one-choice node into
        // the multi-choice side's one-body row (or into one_choice_offset if
        // both sides are fixed).
        let keys: Vec<(usize, usize)> = self.twobody.keys().copied().collect();
        let mut retained: FxHashMap<(usize, usize), Matrix> = FxHashMap::default();
        for key in keys {
            let (a, b) = key;
            let ka = *self.n_choices.get(&a).unwrap_or(&1);
            let kb = *self.n_choices.get(&b).unwrap_or(&1);
            let m = self.twobody.remove(&key).unwrap();

            if ka == 1 && kb == 1 {
                self.one_choice_offset += m.first().and_then(|r| r.first()).copied().unwrap_or(0.0);
            } else if ka == 1 {
                if m.len() != 1 {
                    return Err(CfnError::InvalidConfig(format!(
                        "one-choice node {a} folds into a two-body block with {} rows (expected 1)",
                        m.len()
                    )));
                }
                let row = self.onebody.entry(b).or_default();
                if row.len() < m[0].len() {
                    row.resize(m[0].len(), 0.0);
                }
                for (c, &v) in m[0].iter().enumerate() {
                    row[c] += v;
                }
            } else if kb == 1 {
                let cols = m.first().map(|r| r.len()).unwrap_or(0);
                if cols != 1 {
                    return Err(CfnError::InvalidConfig(format!(
                        "one-choice node {b} folds into a two-body block with {cols} columns (expected 1)"
                    )));
                }
                let row = self.onebody.entry(a).or_default();
                if row.len() < m.len() {
                    row.resize(m.len(), 0.0);
                }
                for (r, line) in m.iter().enumerate() {
                    row[r] += line[0];
                }
            } else {
                retained.insert(key, m);
            }
        }
        self.twobody = retained;

        // Pass 2: accumulate one-body rows of every one-choice node into the
        // constant offset.
        let mut variable_nodes: Vec<usize> = Vec::new();
        for (&node, &k) in self.n_choices.iter() {
            if k == 1 {
                if let Some(row) = self.onebody.get(&node) {
                    self.one_choice_offset += row.first().copied().unwrap_or(0.0);
                }
            } else {
                variable_nodes.push(node);
            }
        }
        variable_nodes.sort_unstable();

        // Pass 3: dense variable-index layout, preserving absolute order.
        self.var_index_of.clear();
        for (v, &node) in variable_nodes.iter().enumerate() {
            self.var_index_of.insert(node, v);
        }
        self.n_choices_var = variable_nodes.iter().map(|n| self.n_choices[n]).collect();
        self.onebody_var = variable_nodes
            .iter()
            .zip(self.n_choices_var.iter())
            .map(|(node, &k)| {
                let mut row = self.onebody.get(node).cloned().unwrap_or_default();
                row.resize(k, 0.0);
                row
            })
            .collect();

        let mut interacting: Vec<Vec<Interaction>> = (0..variable_nodes.len()).map(|_| Vec::new()).collect();
        for (&(a, b), m) in self.twobody.iter() {
            let va = self.var_index_of[&a];
            let vb = self.var_index_of[&b];
            interacting[va].push(Interaction {
                other: vb,
                matrix: m.clone(),
            });
            interacting[vb].push(Interaction {
                other: va,
                matrix: transpose(m),
            });
        }
        self.interacting = interacting;
        self.variable_nodes = variable_nodes;

        for cf in self.cost_functions.iter_mut() {
            cf.finalize(&self.variable_nodes);
        }

        self.finalized = true;
        Ok(())
    }

    pub fn n_variables(&self) -> usize {
        self.variable_nodes.len()
    }

    pub fn n_choices_of(&self, v: Variable) -> usize {
        self.n_choices_var[v.id()]
    }

    pub fn absolute_node_of(&self, v: Variable) -> NodeId {
        NodeId(self.variable_nodes[v.id()])
    }

    pub fn variable_of_absolute(&self, node: NodeId) -> Option<Variable> {
        self.var_index_of.get(&node.0).map(|&v| Variable(v))
    }

    fn check_shape(&self, sol: &Candidate) -> CfnResult<()> {
        if sol.len() != self.n_variables() {
            return Err(CfnError::ShapeMismatch(format!(
                "candidate has length {} but problem has {} variable nodes",
                sol.len(),
                self.n_variables()
            )));
        }
        for (v, &c) in sol.iter().enumerate() {
            if c >= self.n_choices_var[v] {
                return Err(CfnError::ShapeMismatch(format!(
                    "choice {c} out of range at variable {v} (K={})",
                    self.n_choices_var[v]
                )));
            }
        }
        Ok(())
    }

    /// One fresh scratch slot per attached cost function, to be reused across
    /// every `delta` call of a single trajectory (§4.2, §5).
    pub fn make_scratch(&self) -> Vec<Option<Box<dyn Scratch>>> {
        self.cost_functions.iter().map(|cf| cf.make_scratch()).collect()
    }

    /// `bg_offset + one_choice_offset + Σ onebody + Σ twobody + Σ costfunc.absolute(sol)`.
    pub fn absolute(&self, sol: &Candidate) -> CfnResult<f64> {
        self.require_finalized()?;
        self.check_shape(sol)?;

        let mut total = self.background_offset + self.one_choice_offset;
        for (v, &c) in sol.iter().enumerate() {
            total += self.onebody_var[v][c];
        }
        for (v, neighbors) in self.interacting.iter().enumerate() {
            for edge in neighbors {
                if edge.other > v {
                    total += edge.matrix[sol[v]][sol[edge.other]];
                }
            }
        }
        for cf in self.cost_functions.iter() {
            total += cf.absolute(sol);
        }
        Ok(total)
    }

    /// `Σ costfunc.delta + Σ_{i changed} [Δonebody_i + Σ_{j in interacting(i), j<i or old[j]=new[j]} Δtwobody_ij]`.
    pub fn delta(
        &self,
        old: &Candidate,
        new: &Candidate,
        scratch: &mut [Option<Box<dyn Scratch>>],
    ) -> CfnResult<f64> {
        self.require_finalized()?;
        self.check_shape(old)?;
        self.check_shape(new)?;

        let mut total = 0.0;
        for (cf, slot) in self.cost_functions.iter().zip(scratch.iter_mut()) {
            total += cf.delta(old, new, slot.as_deref_mut());
        }

        for i in 0..old.len() {
            if old[i] == new[i] {
                continue;
            }
            total += self.onebody_var[i][new[i]] - self.onebody_var[i][old[i]];
            for edge in &self.interacting[i] {
                let j = edge.other;
                if j < i || old[j] == new[j] {
                    total += edge.matrix[new[i]][new[j]] - edge.matrix[old[i]][old[j]];
                }
            }
        }
        Ok(total)
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
