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

//! The pluggable annealing schedule the Monte-Carlo solver requires.

/// A function `step -> temperature` driving Metropolis acceptance, plus a
/// `reset` hook so the same schedule instance can be reused across
/// trajectories without carrying state between them.
pub trait AnnealingSchedule: Send + Sync {
    /// The temperature to use at the given zero-based step index.
    fn temperature(&self, step: usize) -> f64;

    /// Called once at the start of every trajectory.
    fn reset(&self) {}

    /// Some schedules (e.g. linear) need to know the total step count ahead
    /// of time; the solver calls this once before running if it is set.
    fn set_final_step(&mut self, _final_step: usize) {}
}
