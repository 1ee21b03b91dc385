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

//! Problem-file interpreters (component F, §4.6): an ASCII tab-delimited
//! format and a packed-binary format, sharing a common bracketed-block state
//! machine, plus the symmetric solution writer (§4.8).

mod ascii;
mod binary;
mod writer;

pub use ascii::*;
pub use binary::*;
pub use writer::*;

use crate::{CfnResult, PairwiseProblem, PluginRegistry, Tracer};

/// Chooses the problem container to populate for a freshly parsed record
/// (§4.7): exactly one of `problem_class`/`solver_class` must be given.
pub(crate) fn instantiate_problem(
    registry: &dyn PluginRegistry,
    problem_class: Option<&str>,
    solver_class: Option<&str>,
) -> CfnResult<PairwiseProblem> {
    match (problem_class, solver_class) {
        (Some(name), None) => registry.problem_by_name(name),
        (None, Some(name)) => registry.problem_for_solver(name),
        (Some(_), Some(_)) => Err(crate::CfnError::InvalidConfig(
            "provide a problem-class name or a solver-class name, not both".to_string(),
        )),
        (None, None) => Err(crate::CfnError::InvalidConfig(
            "provide either a problem-class name or a solver-class name".to_string(),
        )),
    }
}

/// The file extensions both interpreters advertise. The source format's
/// vestigial `"pdb"` entry is dropped: PDB is unrelated to this numeric
/// format.
pub fn get_file_extensions() -> &'static [&'static str] {
    &["txt"]
}

pub(crate) fn warn_bad_record(tracer: &dyn Tracer, line: usize, message: &str, raw: &str) {
    tracer.warn(&format!("parse error at line {line}: {message} (raw: {raw:?})"));
}
