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

//! The error taxonomy every fallible operation in this crate returns.

use thiserror::Error;

/// One crate-wide error type. Every public fallible function returns
/// `Result<T, CfnError>` so callers can match on a single type regardless of
/// which component raised it.
#[derive(Debug, Error)]
pub enum CfnError {
    /// A malformed file record. Recoverable: the caller skips the record and
    /// continues parsing the rest of the stream.
    #[error("parse error at line {line}: {message} (raw: {raw:?})")]
    ParseError {
        line: usize,
        message: String,
        raw: String,
    },

    /// A configuration value is missing or invalid (no annealing schedule,
    /// unknown tail mode, negative weight, and so on).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// `set_twobody` was called with `a >= b`.
    #[error("invalid two-body key ({a}, {b}): require a < b")]
    InvalidKey { a: usize, b: usize },

    /// A mutator was called on a problem that has already been finalized.
    #[error("problem is already finalized")]
    AlreadyFinalized,

    /// A scoring or finalized-state query was made before `finalize()`.
    #[error("problem has not been finalized yet")]
    NotFinalized,

    /// A candidate or starting vector has the wrong length, or contains an
    /// out-of-range choice index.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Reserved for the out-of-scope gradient optimizer; never raised by this
    /// crate's solvers, kept so the error taxonomy matches the source system's.
    #[error("missing objective: {0}")]
    MissingObjective(String),

    /// A plugin registry lookup (by category/name) failed.
    #[error("not found: {0}")]
    NotFound(String),

    /// An invariant was violated in a way the caller cannot recover from.
    #[error("internal error: {0}")]
    Internal(String),
}

pub type CfnResult<T> = Result<T, CfnError>;
