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

//! The packed-binary problem record interpreter: every payload line is
//! base64-encoded (the byte-to-char expansion ratio of a standard base64
//! codec matches the wire format's 3-bytes-to-4-chars packing exactly).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::implementation::fileio::{instantiate_problem, warn_bad_record};
use crate::{CfnError, CfnResult, PairwiseProblem, PluginRegistry, Tracer};

const BEGIN: &str = "[BEGIN_BINARY_GRAPH_SUMMARY]";
const END: &str = "[END_BINARY_GRAPH_SUMMARY]";

struct RecordError(String);

impl From<RecordError> for CfnError {
    fn from(e: RecordError) -> Self {
        CfnError::ParseError { line: 0, message: e.0, raw: String::new() }
    }
}

fn decode_uint(bytes: &[u8], at: usize, bytesize: usize) -> Result<u64, RecordError> {
    let slice = bytes
        .get(at..at + bytesize)
        .ok_or_else(|| RecordError("packed array is shorter than its declared length".to_string()))?;
    let mut buf = [0u8; 8];
    buf[..bytesize].copy_from_slice(slice);
    Ok(u64::from_le_bytes(buf))
}

fn decode_float(bytes: &[u8], at: usize, bytesize: usize) -> Result<f64, RecordError> {
    match bytesize {
        4 => {
            let slice = bytes
                .get(at..at + 4)
                .ok_or_else(|| RecordError("packed float array is shorter than its declared length".to_string()))?;
            let mut buf = [0u8; 4];
            buf.copy_from_slice(slice);
            Ok(f32::from_le_bytes(buf) as f64)
        }
        8 => {
            let slice = bytes
                .get(at..at + 8)
                .ok_or_else(|| RecordError("packed float array is shorter than its declared length".to_string()))?;
            let mut buf = [0u8; 8];
            buf.copy_from_slice(slice);
            Ok(f64::from_le_bytes(buf))
        }
        other => Err(RecordError(format!("unsupported float bytesize {other}"))),
    }
}

fn two_decimals(line: &str) -> Result<(usize, usize), RecordError> {
    let mut fields = line.split_whitespace();
    let a = fields
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| RecordError("expected two decimal integers".to_string()))?;
    let b = fields
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| RecordError("expected two decimal integers".to_string()))?;
    Ok((a, b))
}

fn three_decimals(line: &str) -> Result<(usize, usize, usize), RecordError> {
    let mut fields = line.split_whitespace();
    let a = fields
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| RecordError("expected three decimal integers".to_string()))?;
    let b = fields
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| RecordError("expected three decimal integers".to_string()))?;
    let c = fields
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| RecordError("expected three decimal integers".to_string()))?;
    Ok((a, b, c))
}

/// Recovers `(variable_node, local_choice)` from a global choice index by
/// running a prefix sum over the choice-count vector.
fn global_choice_to_local(choice_counts: &[usize], global: u64) -> Result<(usize, usize), RecordError> {
    let mut remaining = global;
    for (node, &count) in choice_counts.iter().enumerate() {
        if remaining < count as u64 {
            return Ok((node, remaining as usize));
        }
        remaining -= count as u64;
    }
    Err(RecordError("global choice index is out of range of the choice-count vector".to_string()))
}

struct Record {
    choice_counts: Vec<usize>,
    onebody: Vec<f64>,
    twobody: Vec<(u64, u64, f64)>,
    absolute_index: Option<Vec<usize>>,
}

fn parse_record(lines: &[&str]) -> Result<Record, RecordError> {
    let mut it = lines.iter();
    let (n_nodes, cc_bytesize) = two_decimals(it.next().ok_or_else(|| RecordError("missing header line".to_string()))?)?;
    let cc_bytes = BASE64
        .decode(it.next().ok_or_else(|| RecordError("missing choice-count array".to_string()))?.trim())
        .map_err(|e| RecordError(format!("invalid base64 in choice-count array: {e}")))?;
    let mut choice_counts = Vec::with_capacity(n_nodes);
    for i in 0..n_nodes {
        choice_counts.push(decode_uint(&cc_bytes, i * cc_bytesize, cc_bytesize)? as usize);
    }

    let (n_onebody, ob_bytesize) = two_decimals(it.next().ok_or_else(|| RecordError("missing one-body header".to_string()))?)?;
    let ob_bytes = BASE64
        .decode(it.next().ok_or_else(|| RecordError("missing one-body array".to_string()))?.trim())
        .map_err(|e| RecordError(format!("invalid base64 in one-body array: {e}")))?;
    let mut onebody = Vec::with_capacity(n_onebody);
    for i in 0..n_onebody {
        onebody.push(decode_float(&ob_bytes, i * ob_bytesize, ob_bytesize)?);
    }

    let (n_pairs, index_bytesize, penalty_bytesize) =
        three_decimals(it.next().ok_or_else(|| RecordError("missing two-body header".to_string()))?)?;
    let tb_bytes = BASE64
        .decode(it.next().ok_or_else(|| RecordError("missing two-body array".to_string()))?.trim())
        .map_err(|e| RecordError(format!("invalid base64 in two-body array: {e}")))?;
    let stride = 2 * index_bytesize + penalty_bytesize;
    let mut twobody = Vec::with_capacity(n_pairs);
    for i in 0..n_pairs {
        let base = i * stride;
        let c1 = decode_uint(&tb_bytes, base, index_bytesize)?;
        let c2 = decode_uint(&tb_bytes, base + index_bytesize, index_bytesize)?;
        let penalty = decode_float(&tb_bytes, base + 2 * index_bytesize, penalty_bytesize)?;
        twobody.push((c1, c2, penalty));
    }

    let absolute_index = match it.next() {
        Some(line) if !line.trim().is_empty() => {
            let mut indices = Vec::with_capacity(n_nodes);
            for tok in line.split_whitespace() {
                indices.push(tok.parse().map_err(|_| RecordError("malformed absolute-index line".to_string()))?);
            }
            if indices.len() != n_nodes {
                return Err(RecordError("absolute-index line length does not match variable-node count".to_string()));
            }
            Some(indices)
        }
        _ => None,
    };

    Ok(Record { choice_counts, onebody, twobody, absolute_index })
}

fn build_problem(
    registry: &dyn PluginRegistry,
    problem_class: Option<&str>,
    solver_class: Option<&str>,
    record: &Record,
) -> CfnResult<PairwiseProblem> {
    let mut problem = instantiate_problem(registry, problem_class, solver_class)?;
    let absolute_of = |v: usize| record.absolute_index.as_ref().map(|idx| idx[v]).unwrap_or(v);

    let mut onebody_offsets = Vec::with_capacity(record.choice_counts.len());
    let mut cursor = 0usize;
    for &count in &record.choice_counts {
        onebody_offsets.push(cursor);
        cursor += count;
    }
    for (v, &count) in record.choice_counts.iter().enumerate() {
        let node = absolute_of(v);
        let offset = onebody_offsets[v];
        for choice in 0..count {
            problem.set_onebody(node, choice, record.onebody[offset + choice])?;
        }
    }

    for &(c1, c2, penalty) in &record.twobody {
        let (v1, choice1) =
            global_choice_to_local(&record.choice_counts, c1).map_err(CfnError::from)?;
        let (v2, choice2) =
            global_choice_to_local(&record.choice_counts, c2).map_err(CfnError::from)?;
        let (n1, n2) = (absolute_of(v1), absolute_of(v2));
        let (a, ca, b, cb) = if n1 < n2 { (n1, choice1, n2, choice2) } else { (n2, choice2, n1, choice1) };
        problem.set_twobody(a, b, ca, cb, penalty)?;
    }

    problem.finalize()?;
    Ok(problem)
}

/// Parses every packed-binary record in `input`. A malformed record (a
/// header that does not parse, an undersized packed array, invalid base64)
/// abandons that record with a tracer warning and parsing resumes at the
/// next `[BEGIN_BINARY_GRAPH_SUMMARY]`. Requires at least one successful
/// record overall.
pub fn parse_binary_records(
    input: &str,
    registry: &dyn PluginRegistry,
    problem_class: Option<&str>,
    solver_class: Option<&str>,
    tracer: &dyn Tracer,
) -> CfnResult<Vec<PairwiseProblem>> {
    let mut problems = Vec::new();
    let all_lines: Vec<&str> = input.lines().map(|l| l.trim_end_matches('\r')).collect();
    let mut i = 0usize;
    while i < all_lines.len() {
        if all_lines[i].trim() != BEGIN {
            i += 1;
            continue;
        }
        let start = i + 1;
        let mut end = None;
        for (offset, line) in all_lines[start..].iter().enumerate() {
            if line.trim() == END {
                end = Some(start + offset);
                break;
            }
        }
        let Some(end) = end else {
            warn_bad_record(tracer, start, "unterminated binary record", all_lines[i]);
            break;
        };
        let body = &all_lines[start..end];
        match parse_record(body).and_then(|record| {
            build_problem(registry, problem_class, solver_class, &record).map_err(|e| RecordError(e.to_string()))
        }) {
            Ok(problem) => problems.push(problem),
            Err(e) => warn_bad_record(tracer, start, &e.0, all_lines[i]),
        }
        i = end + 1;
    }

    if problems.is_empty() {
        return Err(CfnError::ParseError {
            line: all_lines.len(),
            message: "no successful record found in packed-binary stream".to_string(),
            raw: String::new(),
        });
    }
    Ok(problems)
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_binary {
    use super::*;
    use crate::implementation::registry_default::InMemoryRegistry;
    use crate::implementation::tracer_default::NoOpTracer;

    fn registry() -> InMemoryRegistry {
        let registry = InMemoryRegistry::new();
        registry.register_problem("rotamer", PairwiseProblem::new);
        registry
    }

    fn pack_u16(values: &[u16]) -> String {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        BASE64.encode(bytes)
    }

    fn pack_f64(values: &[f64]) -> String {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        BASE64.encode(bytes)
    }

    fn pack_twobody(pairs: &[(u16, u16, f64)]) -> String {
        let mut bytes = Vec::new();
        for &(c1, c2, penalty) in pairs {
            bytes.extend_from_slice(&c1.to_le_bytes());
            bytes.extend_from_slice(&c2.to_le_bytes());
            bytes.extend_from_slice(&penalty.to_le_bytes());
        }
        BASE64.encode(bytes)
    }

    #[test]
    fn parses_a_well_formed_record_with_two_variable_nodes() {
        // Two nodes, 2 choices each; global choice indices 0,1 for node 0
        // and 2,3 for node 1.
        let choice_counts = pack_u16(&[2, 2]);
        let onebody = pack_f64(&[1.0, 2.0, 3.0, 4.0]);
        let twobody = pack_twobody(&[(0, 2, 5.0)]);
        let input = format!(
            "{BEGIN}\n2 2\n{choice_counts}\n4 8\n{onebody}\n1 2 8\n{twobody}\n{END}\n"
        );
        let registry = registry();
        let tracer = NoOpTracer;
        let problems = parse_binary_records(&input, &registry, Some("rotamer"), None, &tracer).unwrap();
        assert_eq!(1, problems.len());
        let p = &problems[0];
        assert_eq!(2, p.n_variables());
        // choices (0,0): onebody 1.0 + 3.0 + twobody(choice0=0,choice2=0) 5.0 = 9.0
        assert_eq!(9.0, p.absolute(&vec![0, 0]).unwrap());
    }

    #[test]
    fn an_unterminated_record_yields_no_problems() {
        let registry = registry();
        let tracer = NoOpTracer;
        let input = format!("{BEGIN}\n2 2\nAA==\n");
        assert!(parse_binary_records(&input, &registry, Some("rotamer"), None, &tracer).is_err());
    }

    #[test]
    fn a_corrupt_record_is_skipped_but_a_later_valid_one_still_parses() {
        let choice_counts = pack_u16(&[1]);
        let onebody = pack_f64(&[7.0]);
        let twobody = pack_twobody(&[]);
        let good = format!("{BEGIN}\n1 2\n{choice_counts}\n1 8\n{onebody}\n0 2 8\n{twobody}\n{END}\n");
        let bad = format!("{BEGIN}\nnot-a-number\n{END}\n");
        let input = format!("{bad}{good}");
        let registry = registry();
        let tracer = NoOpTracer;
        let problems = parse_binary_records(&input, &registry, Some("rotamer"), None, &tracer).unwrap();
        assert_eq!(1, problems.len());
    }

    #[test]
    fn global_choice_to_local_recovers_the_right_variable_and_choice() {
        let counts = vec![2, 3, 1];
        assert_eq!((0, 0), global_choice_to_local(&counts, 0).unwrap());
        assert_eq!((0, 1), global_choice_to_local(&counts, 1).unwrap());
        assert_eq!((1, 0), global_choice_to_local(&counts, 2).unwrap());
        assert_eq!((1, 2), global_choice_to_local(&counts, 4).unwrap());
        assert_eq!((2, 0), global_choice_to_local(&counts, 5).unwrap());
        assert!(global_choice_to_local(&counts, 6).is_err());
    }

    #[test]
    fn an_explicit_absolute_index_line_is_honored() {
        let choice_counts = pack_u16(&[1]);
        let onebody = pack_f64(&[7.0]);
        let twobody = pack_twobody(&[]);
        let input = format!("{BEGIN}\n1 2\n{choice_counts}\n1 8\n{onebody}\n0 2 8\n{twobody}\n5\n{END}\n");
        let registry = registry();
        let tracer = NoOpTracer;
        let problems = parse_binary_records(&input, &registry, Some("rotamer"), None, &tracer).unwrap();
        // node with choice_count 1 is folded away entirely (fixed node), so
        // there are zero variables left, but the record itself must still
        // parse successfully.
        assert_eq!(0, problems[0].n_variables());
    }
}
