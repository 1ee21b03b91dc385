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

//! Two ready-made `AnnealingSchedule` implementations.

use crate::AnnealingSchedule;

/// A fixed temperature at every step.
#[derive(Copy, Clone, Debug)]
pub struct ConstantSchedule {
    pub temperature: f64,
}

impl ConstantSchedule {
    pub fn new(temperature: f64) -> Self {
        ConstantSchedule { temperature }
    }
}

impl AnnealingSchedule for ConstantSchedule {
    fn temperature(&self, _step: usize) -> f64 {
        self.temperature
    }
}

/// Linearly interpolates from `start` to `end` over `final_step` steps.
/// `final_step` is usually supplied by the solver via `set_final_step`
/// rather than at construction.
#[derive(Copy, Clone, Debug)]
pub struct LinearSchedule {
    pub start: f64,
    pub end: f64,
    final_step: usize,
}

impl LinearSchedule {
    pub fn new(start: f64, end: f64) -> Self {
        LinearSchedule { start, end, final_step: 0 }
    }
}

impl AnnealingSchedule for LinearSchedule {
    fn temperature(&self, step: usize) -> f64 {
        if self.final_step == 0 {
            return self.start;
        }
        let t = (step as f64 / self.final_step as f64).clamp(0.0, 1.0);
        self.start + (self.end - self.start) * t
    }

    fn set_final_step(&mut self, final_step: usize) {
        self.final_step = final_step;
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_annealing_schedules {
    use super::*;

    #[test]
    fn constant_schedule_never_changes() {
        let s = ConstantSchedule::new(3.5);
        assert_eq!(3.5, s.temperature(0));
        assert_eq!(3.5, s.temperature(1_000_000));
    }

    #[test]
    fn linear_schedule_interpolates_between_endpoints() {
        let mut s = LinearSchedule::new(10.0, 0.0);
        s.set_final_step(100);
        assert_eq!(10.0, s.temperature(0));
        assert_eq!(5.0, s.temperature(50));
        assert_eq!(0.0, s.temperature(100));
    }

    #[test]
    fn linear_schedule_without_a_final_step_holds_start() {
        let s = LinearSchedule::new(10.0, 0.0);
        assert_eq!(10.0, s.temperature(50));
    }
}
