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

//! The thread pool collaborator (out of scope per the core spec): "submit a
//! vector of closures; wait; return a summary". One concrete, minimal
//! implementation (`ScopedThreadPool`) is provided in `implementation`.

/// Runs a batch of independent closures to completion and returns their
/// results in submission order.
pub trait ThreadPool {
    /// How many workers this pool will use at most for one `run_all` call.
    fn worker_count(&self) -> usize;

    /// Runs every job to completion, using at most `worker_count()` workers
    /// concurrently, and returns one result per job in submission order.
    fn run_all<T: Send>(&self, jobs: Vec<Box<dyn FnOnce() -> T + Send>>) -> Vec<T>;
}
