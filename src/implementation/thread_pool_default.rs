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

//! The default `ThreadPool`: a thin wrapper over `std::thread::scope`, sized
//! by `num_cpus::get()` unless told otherwise.

use crate::ThreadPool;

pub struct ScopedThreadPool {
    workers: usize,
}

impl ScopedThreadPool {
    /// `workers == 0` means "use all available cores".
    pub fn new(workers: usize) -> Self {
        ScopedThreadPool {
            workers: if workers == 0 { num_cpus::get() } else { workers },
        }
    }
}

impl Default for ScopedThreadPool {
    fn default() -> Self {
        Self::new(0)
    }
}

impl ThreadPool for ScopedThreadPool {
    fn worker_count(&self) -> usize {
        self.workers
    }

    fn run_all<T: Send>(&self, jobs: Vec<Box<dyn FnOnce() -> T + Send>>) -> Vec<T> {
        if jobs.is_empty() {
            return Vec::new();
        }
        let chunk_size = (jobs.len() + self.workers - 1) / self.workers.max(1);
        let chunk_size = chunk_size.max(1);

        std::thread::scope(|scope| {
            let mut handles = Vec::new();
            for chunk in chunk_iter(jobs, chunk_size) {
                handles.push(scope.spawn(move || chunk.into_iter().map(|job| job()).collect::<Vec<T>>()));
            }
            handles.into_iter().flat_map(|h| h.join().expect("worker thread panicked")).collect()
        })
    }
}

/// Splits `items` into chunks of at most `size`, preserving order.
fn chunk_iter<T>(mut items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let mut chunks = Vec::new();
    while !items.is_empty() {
        let at = size.min(items.len());
        let rest = items.split_off(at);
        chunks.push(items);
        items = rest;
    }
    chunks
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_scoped_thread_pool {
    use super::*;

    #[test]
    fn runs_every_job_and_preserves_submission_order() {
        let pool = ScopedThreadPool::new(4);
        let jobs: Vec<Box<dyn FnOnce() -> usize + Send>> =
            (0..37).map(|i| Box::new(move || i * i) as Box<dyn FnOnce() -> usize + Send>).collect();
        let results = pool.run_all(jobs);
        let expected: Vec<usize> = (0..37).map(|i| i * i).collect();
        assert_eq!(expected, results);
    }

    #[test]
    fn empty_job_list_yields_empty_results() {
        let pool = ScopedThreadPool::new(2);
        let jobs: Vec<Box<dyn FnOnce() -> usize + Send>> = Vec::new();
        assert!(pool.run_all(jobs).is_empty());
    }

    #[test]
    fn zero_workers_defaults_to_all_available_cores() {
        let pool = ScopedThreadPool::new(0);
        assert_eq!(num_cpus::get(), pool.worker_count());
    }
}
