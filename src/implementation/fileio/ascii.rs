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

//! The ASCII tab-delimited problem record interpreter.

use crate::implementation::fileio::{instantiate_problem, warn_bad_record};
use crate::{CfnError, CfnResult, PairwiseProblem, PluginRegistry, Tracer};

const BEGIN_ONEBODY: &str = "[BEGIN ONEBODY SEQPOS/ROTINDEX/ENERGY]";
const END_ONEBODY: &str = "[END ONEBODY SEQPOS/ROTINDEX/ENERGY]";
const BEGIN_TWOBODY: &str = "[BEGIN TWOBODY SEQPOS1/ROTINDEX1/SEQPOS2/ROTINDEX2/ENERGY]";
const END_TWOBODY: &str = "[END TWOBODY SEQPOS1/ROTINDEX1/SEQPOS2/ROTINDEX2/ENERGY]";

#[derive(Copy, Clone, Eq, PartialEq)]
enum State {
    Outside,
    InOnebody,
    BetweenBlocks,
    InTwobody,
}

struct OnebodyLine {
    seqpos: usize,
    rotindex: usize,
    energy: f64,
}

struct TwobodyLine {
    seqpos1: usize,
    rotindex1: usize,
    seqpos2: usize,
    rotindex2: usize,
    energy: f64,
}

fn parse_onebody_line(raw: &str) -> Option<OnebodyLine> {
    let mut fields = raw.split('\t');
    let seqpos = fields.next()?.trim().parse().ok()?;
    let rotindex: usize = fields.next()?.trim().parse().ok()?;
    let energy = fields.next()?.trim().parse().ok()?;
    if fields.next().is_some() || rotindex == 0 {
        return None;
    }
    Some(OnebodyLine { seqpos, rotindex: rotindex - 1, energy })
}

fn parse_twobody_line(raw: &str) -> Option<TwobodyLine> {
    let mut fields = raw.split('\t');
    let seqpos1 = fields.next()?.trim().parse().ok()?;
    let rotindex1: usize = fields.next()?.trim().parse().ok()?;
    let seqpos2 = fields.next()?.trim().parse().ok()?;
    let rotindex2: usize = fields.next()?.trim().parse().ok()?;
    let energy = fields.next()?.trim().parse().ok()?;
    if fields.next().is_some() || rotindex1 == 0 || rotindex2 == 0 {
        return None;
    }
    Some(TwobodyLine {
        seqpos1,
        rotindex1: rotindex1 - 1,
        seqpos2,
        rotindex2: rotindex2 - 1,
        energy,
    })
}

/// Parses every ASCII record in `input`, instantiating one problem per
/// record via `registry` and finalizing it. A malformed line abandons the
/// record it belongs to (with a tracer warning) and parsing resumes looking
/// for the next `[BEGIN ONEBODY ...]`. Requires at least one successful
/// record overall.
pub fn parse_ascii_records(
    input: &str,
    registry: &dyn PluginRegistry,
    problem_class: Option<&str>,
    solver_class: Option<&str>,
    tracer: &dyn Tracer,
) -> CfnResult<Vec<PairwiseProblem>> {
    let mut problems = Vec::new();
    let mut state = State::Outside;
    let mut onebody: Vec<OnebodyLine> = Vec::new();
    let mut twobody: Vec<TwobodyLine> = Vec::new();
    let mut record_failed = false;

    for (idx, raw_line) in input.lines().enumerate() {
        let line = idx + 1;
        let raw = raw_line.trim_end_matches('\r');
        let trimmed = raw.trim();

        match state {
            State::Outside => {
                if trimmed == BEGIN_ONEBODY {
                    onebody.clear();
                    twobody.clear();
                    record_failed = false;
                    state = State::InOnebody;
                }
            }
            State::InOnebody => {
                if trimmed == END_ONEBODY {
                    state = State::BetweenBlocks;
                } else if !record_failed {
                    match parse_onebody_line(trimmed) {
                        Some(parsed) => onebody.push(parsed),
                        None => {
                            warn_bad_record(tracer, line, "malformed one-body line", raw);
                            record_failed = true;
                        }
                    }
                }
            }
            State::BetweenBlocks => {
                if trimmed == BEGIN_TWOBODY {
                    state = State::InTwobody;
                } else if !trimmed.is_empty() {
                    warn_bad_record(tracer, line, "expected [BEGIN TWOBODY ...]", raw);
                    record_failed = true;
                    state = State::Outside;
                }
            }
            State::InTwobody => {
                if trimmed == END_TWOBODY {
                    if !record_failed {
                        match build_problem(registry, problem_class, solver_class, &onebody, &twobody) {
                            Ok(problem) => problems.push(problem),
                            Err(_) => {
                                warn_bad_record(tracer, line, "record rejected by the problem store", raw);
                            }
                        }
                    }
                    state = State::Outside;
                } else if !record_failed {
                    match parse_twobody_line(trimmed) {
                        Some(parsed) => twobody.push(parsed),
                        None => {
                            warn_bad_record(tracer, line, "malformed two-body line", raw);
                            record_failed = true;
                        }
                    }
                }
            }
        }
    }

    if problems.is_empty() {
        return Err(CfnError::ParseError {
            line: input.lines().count(),
            message: "no successful record found in ASCII stream".to_string(),
            raw: String::new(),
        });
    }
    Ok(problems)
}

fn build_problem(
    registry: &dyn PluginRegistry,
    problem_class: Option<&str>,
    solver_class: Option<&str>,
    onebody: &[OnebodyLine],
    twobody: &[TwobodyLine],
) -> CfnResult<PairwiseProblem> {
    let mut problem = instantiate_problem(registry, problem_class, solver_class)?;
    for line in onebody {
        problem.set_onebody(line.seqpos, line.rotindex, line.energy)?;
    }
    for line in twobody {
        let (a, ca, b, cb) = if line.seqpos1 < line.seqpos2 {
            (line.seqpos1, line.rotindex1, line.seqpos2, line.rotindex2)
        } else {
            (line.seqpos2, line.rotindex2, line.seqpos1, line.rotindex1)
        };
        problem.set_twobody(a, b, ca, cb, line.energy)?;
    }
    problem.finalize()?;
    Ok(problem)
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_ascii {
    use super::*;
    use crate::implementation::registry_default::InMemoryRegistry;
    use crate::implementation::tracer_default::NoOpTracer;

    fn registry() -> InMemoryRegistry {
        let registry = InMemoryRegistry::new();
        registry.register_problem("rotamer", PairwiseProblem::new);
        registry
    }

    #[test]
    fn parses_a_single_well_formed_record() {
        let input = "[BEGIN ONEBODY SEQPOS/ROTINDEX/ENERGY]\n\
                      0\t1\t10.0\n\
                      1\t1\t20.0\n\
                      [END ONEBODY SEQPOS/ROTINDEX/ENERGY]\n\
                      [BEGIN TWOBODY SEQPOS1/ROTINDEX1/SEQPOS2/ROTINDEX2/ENERGY]\n\
                      0\t1\t1\t1\t5.0\n\
                      [END TWOBODY SEQPOS1/ROTINDEX1/SEQPOS2/ROTINDEX2/ENERGY]\n";
        let registry = registry();
        let tracer = NoOpTracer;
        let problems = parse_ascii_records(input, &registry, Some("rotamer"), None, &tracer).unwrap();
        assert_eq!(1, problems.len());
        assert_eq!(2, problems[0].n_variables());
        assert_eq!(35.0, problems[0].absolute(&vec![0, 0]).unwrap());
    }

    #[test]
    fn converts_rotindex_from_one_based_to_zero_based() {
        let input = "[BEGIN ONEBODY SEQPOS/ROTINDEX/ENERGY]\n\
                      0\t2\t10.0\n\
                      0\t1\t1.0\n\
                      1\t1\t0.0\n\
                      [END ONEBODY SEQPOS/ROTINDEX/ENERGY]\n\
                      [BEGIN TWOBODY SEQPOS1/ROTINDEX1/SEQPOS2/ROTINDEX2/ENERGY]\n\
                      [END TWOBODY SEQPOS1/ROTINDEX1/SEQPOS2/ROTINDEX2/ENERGY]\n";
        let registry = registry();
        let tracer = NoOpTracer;
        let problems = parse_ascii_records(input, &registry, Some("rotamer"), None, &tracer).unwrap();
        // rotindex 2 (wire) -> choice index 1, so two choices exist for node 0.
        assert_eq!(2, problems[0].n_choices_of(crate::Variable(0)));
    }

    #[test]
    fn a_malformed_record_is_skipped_but_a_later_valid_one_still_parses() {
        let input = "[BEGIN ONEBODY SEQPOS/ROTINDEX/ENERGY]\n\
                      not-a-number\n\
                      [END ONEBODY SEQPOS/ROTINDEX/ENERGY]\n\
                      [BEGIN TWOBODY SEQPOS1/ROTINDEX1/SEQPOS2/ROTINDEX2/ENERGY]\n\
                      [END TWOBODY SEQPOS1/ROTINDEX1/SEQPOS2/ROTINDEX2/ENERGY]\n\
                      [BEGIN ONEBODY SEQPOS/ROTINDEX/ENERGY]\n\
                      0\t1\t3.0\n\
                      [END ONEBODY SEQPOS/ROTINDEX/ENERGY]\n\
                      [BEGIN TWOBODY SEQPOS1/ROTINDEX1/SEQPOS2/ROTINDEX2/ENERGY]\n\
                      [END TWOBODY SEQPOS1/ROTINDEX1/SEQPOS2/ROTINDEX2/ENERGY]\n";
        let registry = registry();
        let tracer = NoOpTracer;
        let problems = parse_ascii_records(input, &registry, Some("rotamer"), None, &tracer).unwrap();
        assert_eq!(1, problems.len());
    }

    #[test]
    fn an_entirely_empty_stream_fails() {
        let registry = registry();
        let tracer = NoOpTracer;
        assert!(parse_ascii_records("", &registry, Some("rotamer"), None, &tracer).is_err());
    }

    #[test]
    fn both_problem_and_solver_class_is_rejected() {
        let registry = registry();
        let tracer = NoOpTracer;
        let input = "[BEGIN ONEBODY SEQPOS/ROTINDEX/ENERGY]\n0\t1\t1.0\n[END ONEBODY SEQPOS/ROTINDEX/ENERGY]\n\
                      [BEGIN TWOBODY SEQPOS1/ROTINDEX1/SEQPOS2/ROTINDEX2/ENERGY]\n[END TWOBODY SEQPOS1/ROTINDEX1/SEQPOS2/ROTINDEX2/ENERGY]\n";
        let result = parse_ascii_records(input, &registry, Some("rotamer"), Some("monte-carlo"), &tracer);
        assert!(result.is_err());
    }
}
