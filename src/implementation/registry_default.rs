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

//! The default `PluginRegistry`: an in-memory, concurrent map from problem
//! class name to a constructor closure, plus a solver-name to
//! compatible-problem-names index. Mirrors the `DashMap`-backed lookup tables
//! used elsewhere in the reference crate for fast keyed concurrent reads.

use std::sync::Arc;

use dashmap::DashMap;

use crate::{CfnError, CfnResult, PairwiseProblem, PluginRegistry};

type Constructor = Arc<dyn Fn() -> PairwiseProblem + Send + Sync>;

#[derive(Default)]
pub struct InMemoryRegistry {
    problems: DashMap<String, Constructor>,
    solver_compat: DashMap<String, Vec<String>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a problem class under `name`.
    pub fn register_problem<F>(&self, name: impl Into<String>, constructor: F)
    where
        F: Fn() -> PairwiseProblem + Send + Sync + 'static,
    {
        self.problems.insert(name.into(), Arc::new(constructor));
    }

    /// Declares that `problem_name` is usable with `solver_name`, in
    /// preference order (first registered, first tried).
    pub fn register_solver_compat(&self, solver_name: impl Into<String>, problem_name: impl Into<String>) {
        self.solver_compat
            .entry(solver_name.into())
            .or_default()
            .push(problem_name.into());
    }
}

impl PluginRegistry for InMemoryRegistry {
    fn problem_by_name(&self, name: &str) -> CfnResult<PairwiseProblem> {
        self.problems
            .get(name)
            .map(|ctor| ctor())
            .ok_or_else(|| CfnError::NotFound(format!("no problem class registered under {name:?}")))
    }

    fn problem_for_solver(&self, solver_name: &str) -> CfnResult<PairwiseProblem> {
        let candidates = self
            .solver_compat
            .get(solver_name)
            .ok_or_else(|| CfnError::NotFound(format!("no problem classes registered for solver {solver_name:?}")))?;
        for name in candidates.iter() {
            if let Some(ctor) = self.problems.get(name) {
                return Ok(ctor());
            }
        }
        Err(CfnError::NotFound(format!(
            "solver {solver_name:?} has registered compatible problem classes, but none of them are registered"
        )))
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_in_memory_registry {
    use super::*;

    #[test]
    fn looks_up_a_problem_by_name() {
        let registry = InMemoryRegistry::new();
        registry.register_problem("empty", PairwiseProblem::new);
        assert!(registry.problem_by_name("empty").is_ok());
    }

    #[test]
    fn unknown_name_is_not_found() {
        let registry = InMemoryRegistry::new();
        assert!(matches!(registry.problem_by_name("nope"), Err(CfnError::NotFound(_))));
    }

    #[test]
    fn resolves_the_first_compatible_problem_for_a_solver() {
        let registry = InMemoryRegistry::new();
        registry.register_problem("a", PairwiseProblem::new);
        registry.register_problem("b", PairwiseProblem::new);
        registry.register_solver_compat("monte-carlo", "a");
        registry.register_solver_compat("monte-carlo", "b");
        assert!(registry.problem_for_solver("monte-carlo").is_ok());
    }

    #[test]
    fn unknown_solver_is_not_found() {
        let registry = InMemoryRegistry::new();
        assert!(matches!(registry.problem_for_solver("nope"), Err(CfnError::NotFound(_))));
    }
}
