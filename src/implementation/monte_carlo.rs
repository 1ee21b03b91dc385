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

//! Component E: the Monte-Carlo / simulated-annealing solver (§4.5).

use std::sync::Arc;

use derive_builder::Builder;
use parking_lot::Mutex;

use crate::{
    refine_one, AnnealingSchedule, Candidate, CfnError, CfnResult, PairwiseProblem, RandomProvider, Solution,
    SolutionSet, ThreadPool, Variable,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StorageMode {
    CheckAtEveryStep,
    CheckOnAcceptance,
}

impl Default for StorageMode {
    fn default() -> Self {
        StorageMode::CheckAtEveryStep
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum GreedyRefinementMode {
    RefineTop,
    RefineTopKeepingOriginal,
    RefineAll,
}

impl Default for GreedyRefinementMode {
    fn default() -> Self {
        GreedyRefinementMode::RefineTopKeepingOriginal
    }
}

#[derive(Builder)]
#[builder(pattern = "owned")]
pub struct MonteCarloConfig {
    /// Worker count handed to the thread pool; `0` defers to the pool's own default.
    #[builder(default = "0")]
    pub threads: usize,
    #[builder(default = "1")]
    pub attempts_per_problem: usize,
    #[builder(default = "1")]
    pub solutions_per_problem: usize,
    #[builder(default = "100_000")]
    pub steps_per_attempt: usize,
    #[builder(default = "None")]
    pub annealing_schedule: Option<Box<dyn AnnealingSchedule>>,
    #[builder(default = "true")]
    pub use_multimutation: bool,
    #[builder(default = "0.75")]
    pub p_one_mutation: f64,
    #[builder(default = "StorageMode::CheckAtEveryStep")]
    pub storage_mode: StorageMode,
    #[builder(default = "false")]
    pub do_greedy_refinement: bool,
    #[builder(default = "GreedyRefinementMode::RefineTopKeepingOriginal")]
    pub greedy_refinement_mode: GreedyRefinementMode,
    #[builder(default = "100")]
    pub recompute_from_scratch_every_n_steps: usize,
}

impl MonteCarloConfig {
    pub fn builder() -> MonteCarloConfigBuilder {
        MonteCarloConfigBuilder::default()
    }
}

/// One trajectory: uniform-random (or problem-supplied) start, `steps`
/// Metropolis-annealed moves, re-anchored against numerical drift every
/// `recompute_from_scratch_every_n_steps` steps.
fn run_trajectory<R: RandomProvider>(
    problem: &PairwiseProblem,
    schedule: &dyn AnnealingSchedule,
    config: &MonteCarloConfig,
    rng: &mut R,
    starting: Option<&Candidate>,
) -> CfnResult<SolutionSet> {
    schedule.reset();
    let v = problem.n_variables();

    let mut last = match starting {
        Some(s) => s.clone(),
        None => (0..v).map(|i| rng.uniform_below(problem.n_choices_of(Variable(i)))).collect(),
    };
    if last.len() != v {
        return Err(CfnError::ShapeMismatch(format!(
            "starting state has length {} but problem has {v} variable nodes",
            last.len()
        )));
    }

    let mut last_score = problem.absolute(&last)?;
    let mut scratch = problem.make_scratch();
    let mut local = SolutionSet::new(config.solutions_per_problem);
    local.merge_one(last.clone(), last_score);

    let lambda = -config.p_one_mutation.ln();

    for step in 0..config.steps_per_attempt {
        let flips = if config.use_multimutation {
            (1 + rng.poisson(lambda)).min(v)
        } else {
            1
        };
        let sites = rng.sample_without_replacement(v, flips);

        let mut cand = last.clone();
        for &site in &sites {
            let k = problem.n_choices_of(Variable(site));
            let mut choice = rng.uniform_below(k - 1);
            if choice >= cand[site] {
                choice += 1;
            }
            cand[site] = choice;
        }

        let delta = problem.delta(&last, &cand, &mut scratch)?;
        let cand_score = last_score + delta;

        if config.storage_mode == StorageMode::CheckAtEveryStep {
            local.merge_one(cand.clone(), cand_score);
        }

        let temperature = schedule.temperature(step);
        let accept = if temperature <= 0.0 {
            delta < 0.0
        } else {
            delta <= 0.0 || rng.bernoulli((-delta / temperature).exp())
        };

        if accept {
            last = cand;
            last_score = cand_score;
            if config.storage_mode == StorageMode::CheckOnAcceptance {
                local.merge_one(last.clone(), last_score);
            }
        }

        if config.recompute_from_scratch_every_n_steps > 0
            && (step + 1) % config.recompute_from_scratch_every_n_steps == 0
        {
            last_score = problem.absolute(&last)?;
        }
    }

    if config.do_greedy_refinement && config.greedy_refinement_mode == GreedyRefinementMode::RefineAll {
        let originals = local.into_sorted_vec();
        let mut merged = SolutionSet::new(config.solutions_per_problem);
        for s in originals {
            let refined = refine_one(problem, &s)?;
            merged.merge_one_with_count(refined.choices, refined.score, refined.times_seen);
        }
        local = merged;
    }

    Ok(local)
}

/// Runs `config.attempts_per_problem` independent trajectories in parallel,
/// one RNG per trajectory (`rngs.len()` must equal `attempts_per_problem`),
/// and merges them into one per-problem `SolutionSet`.
pub fn run_monte_carlo<P: ThreadPool, R: RandomProvider + Send + 'static>(
    problem: &Arc<PairwiseProblem>,
    pool: &P,
    mut config: MonteCarloConfig,
    rngs: Vec<R>,
) -> CfnResult<SolutionSet> {
    if rngs.len() != config.attempts_per_problem {
        return Err(CfnError::InvalidConfig(format!(
            "expected {} RNGs (one per trajectory), got {}",
            config.attempts_per_problem,
            rngs.len()
        )));
    }

    let mut schedule = config
        .annealing_schedule
        .take()
        .ok_or_else(|| CfnError::InvalidConfig("no annealing schedule configured".to_string()))?;
    schedule.set_final_step(config.steps_per_attempt);
    let schedule: Arc<dyn AnnealingSchedule> = Arc::from(schedule);

    let provided = problem.starting_solutions();
    let starting: Vec<Option<Candidate>> = if provided.is_empty() {
        vec![None; rngs.len()]
    } else {
        for sv in provided {
            if sv.len() != problem.n_variables() {
                return Err(CfnError::ShapeMismatch(format!(
                    "problem-supplied starting state has length {} but problem has {} variable nodes",
                    sv.len(),
                    problem.n_variables()
                )));
            }
        }
        (0..rngs.len()).map(|i| Some(provided[i % provided.len()].clone())).collect()
    };

    let config = Arc::new(config);
    let solutions = Arc::new(Mutex::new(SolutionSet::new(config.solutions_per_problem)));

    let jobs: Vec<Box<dyn FnOnce() -> CfnResult<()> + Send>> = rngs
        .into_iter()
        .zip(starting)
        .map(|(mut rng, start)| {
            let problem = Arc::clone(problem);
            let schedule = Arc::clone(&schedule);
            let config = Arc::clone(&config);
            let solutions = Arc::clone(&solutions);
            let job: Box<dyn FnOnce() -> CfnResult<()> + Send> = Box::new(move || {
                let local = run_trajectory(&problem, schedule.as_ref(), &config, &mut rng, start.as_ref())?;
                solutions.lock().merge_many(&local);
                Ok(())
            });
            job
        })
        .collect();

    for result in pool.run_all(jobs) {
        result?;
    }

    let mut solutions =
        Arc::try_unwrap(solutions).map(|m| m.into_inner()).unwrap_or_else(|arc| arc.lock().clone());

    if config.do_greedy_refinement
        && matches!(
            config.greedy_refinement_mode,
            GreedyRefinementMode::RefineTop | GreedyRefinementMode::RefineTopKeepingOriginal
        )
    {
        let originals = solutions.clone().into_sorted_vec();
        let refined: Vec<Solution> =
            originals.iter().map(|s| refine_one(problem, s)).collect::<CfnResult<_>>()?;

        match config.greedy_refinement_mode {
            GreedyRefinementMode::RefineTop => {
                let mut merged = SolutionSet::new(config.solutions_per_problem);
                for r in refined {
                    merged.merge_one_with_count(r.choices, r.score, r.times_seen);
                }
                solutions = merged;
            }
            GreedyRefinementMode::RefineTopKeepingOriginal => {
                for r in refined {
                    solutions.merge_one_with_count(r.choices, r.score, r.times_seen);
                }
            }
            GreedyRefinementMode::RefineAll => unreachable!("filtered out by the match guard above"),
        }
    }

    Ok(solutions)
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_monte_carlo {
    use super::*;
    use crate::implementation::rng_default::SplitMix64;
    use crate::implementation::thread_pool_default::ScopedThreadPool;

    fn canonical_3_node() -> Arc<PairwiseProblem> {
        let mut p = PairwiseProblem::new();
        p.set_onebody(0, 0, 25.0).unwrap();
        p.set_onebody(0, 1, 32.0).unwrap();
        p.set_onebody(1, 0, 15.0).unwrap();
        p.set_onebody(1, 1, 43.0).unwrap();
        p.set_onebody(2, 0, 14.0).unwrap();
        p.set_onebody(2, 1, 5.0).unwrap();
        let tb01 = [[5.0, 3.0, 9.0], [4.0, 1.0, 2.0], [1.0, 3.0, 1.0]];
        let tb02 = [[5.0, 3.0, 9.0], [4.0, 1.0, 2.0], [1.0, 0.0, 3.0]];
        let tb12 = [[7.0, 1.0, 4.0], [6.0, 4.0, 8.0], [2.0, 0.0, 3.0]];
        for ca in 0..3 {
            for cb in 0..3 {
                p.set_twobody(0, 1, ca, cb, tb01[ca][cb]).unwrap();
                p.set_twobody(0, 2, ca, cb, tb02[ca][cb]).unwrap();
                p.set_twobody(1, 2, ca, cb, tb12[ca][cb]).unwrap();
            }
        }
        p.finalize().unwrap();
        Arc::new(p)
    }

    fn base_config() -> MonteCarloConfigBuilder {
        MonteCarloConfig::builder()
            .attempts_per_problem(1)
            .solutions_per_problem(4)
            .steps_per_attempt(200)
            .annealing_schedule(Some(Box::new(crate::ConstantSchedule::new(2.0))))
    }

    #[test]
    fn rejects_a_missing_annealing_schedule() {
        let p = canonical_3_node();
        let pool = ScopedThreadPool::new(1);
        let config = MonteCarloConfig::builder().attempts_per_problem(1).build().unwrap();
        let err = run_monte_carlo(&p, &pool, config, vec![SplitMix64::new(1)]).unwrap_err();
        assert!(matches!(err, CfnError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_a_mismatched_rng_count() {
        let p = canonical_3_node();
        let pool = ScopedThreadPool::new(1);
        let config = base_config().attempts_per_problem(2).build().unwrap();
        let err = run_monte_carlo(&p, &pool, config, vec![SplitMix64::new(1)]).unwrap_err();
        assert!(matches!(err, CfnError::InvalidConfig(_)));
    }

    #[test]
    fn every_stored_score_matches_a_fresh_absolute_recompute() {
        let p = canonical_3_node();
        let pool = ScopedThreadPool::new(1);
        let config = base_config().build().unwrap();
        let solutions = run_monte_carlo(&p, &pool, config, vec![SplitMix64::new(7)]).unwrap();
        for s in solutions.into_sorted_vec() {
            let fresh = p.absolute(&s.choices).unwrap();
            assert!((fresh - s.score).abs() < 1e-6, "stored {} vs fresh {}", s.score, fresh);
        }
    }

    #[test]
    fn never_exceeds_its_configured_capacity() {
        let p = canonical_3_node();
        let pool = ScopedThreadPool::new(2);
        let config = base_config().attempts_per_problem(3).solutions_per_problem(2).build().unwrap();
        let rngs = vec![SplitMix64::new(1), SplitMix64::new(2), SplitMix64::new(3)];
        let solutions = run_monte_carlo(&p, &pool, config, rngs).unwrap();
        assert!(solutions.len() <= 2);
    }

    #[test]
    fn same_seed_is_reproducible() {
        let p = canonical_3_node();
        let pool = ScopedThreadPool::new(1);

        let run = || {
            let config = base_config().build().unwrap();
            run_monte_carlo(&p, &pool, config, vec![SplitMix64::new(123)]).unwrap().into_sorted_vec()
        };
        let a = run();
        let b = run();
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.choices, y.choices);
            assert_eq!(x.score, y.score);
            assert_eq!(x.times_seen, y.times_seen);
        }
    }

    #[test]
    fn greedy_refinement_never_makes_the_best_kept_score_worse() {
        let p = canonical_3_node();
        let pool = ScopedThreadPool::new(1);

        let without_refinement = base_config().build().unwrap();
        let baseline = run_monte_carlo(&p, &pool, without_refinement, vec![SplitMix64::new(99)]).unwrap();
        let best_before = baseline.into_sorted_vec()[0].score;

        let with_refinement = base_config()
            .do_greedy_refinement(true)
            .greedy_refinement_mode(GreedyRefinementMode::RefineTopKeepingOriginal)
            .build()
            .unwrap();
        let refined = run_monte_carlo(&p, &pool, with_refinement, vec![SplitMix64::new(99)]).unwrap();
        let best_after = refined.into_sorted_vec()[0].score;

        assert!(best_after <= best_before + 1e-9);
    }
}
