//! t-way coverage of a test set.
//!
//! A coverage target is one value combination over a `degree`-subset of a
//! strength's parameters. A test covers it when it realizes every pair.

use rayon::prelude::*;

use ct_compiler::strength::subsets;
use ct_ir::types::{PVPair, ParamId, ParamSpec, Strength};

use crate::eval::EvalError;
use crate::state::Assignment;

/// Coverage of one strength by a test set.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageReport {
    pub strength: Strength,
    /// Number of value combinations the strength asks for.
    pub total: usize,
    /// Combinations no test realizes, in enumeration order.
    pub uncovered: Vec<Vec<PVPair>>,
}

impl CoverageReport {
    pub fn covered(&self) -> usize {
        self.total - self.uncovered.len()
    }

    pub fn is_complete(&self) -> bool {
        self.uncovered.is_empty()
    }

    /// Covered fraction; an empty strength counts as fully covered.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.covered() as f64 / self.total as f64
    }
}

/// Every value combination a strength asks for: each `degree`-subset of its
/// parameters, crossed with their static domains.
pub fn targets(specs: &[ParamSpec], strength: &Strength) -> Result<Vec<Vec<PVPair>>, EvalError> {
    let mut out = Vec::new();
    for pids in subsets(strength) {
        let mut radices = Vec::with_capacity(pids.len());
        for &pid in &pids {
            radices.push(domain_size(specs, pid)?);
        }
        if radices.contains(&0) {
            continue;
        }
        // Mixed-radix counter over the value ids, last parameter fastest.
        let mut vids = vec![0usize; pids.len()];
        loop {
            out.push(
                pids.iter()
                    .zip(&vids)
                    .map(|(&pid, &vid)| PVPair::new(pid, vid))
                    .collect(),
            );
            let mut pos = vids.len();
            let advanced = loop {
                if pos == 0 {
                    break false;
                }
                pos -= 1;
                vids[pos] += 1;
                if vids[pos] < radices[pos] {
                    break true;
                }
                vids[pos] = 0;
            };
            if !advanced {
                break;
            }
        }
    }
    Ok(out)
}

fn domain_size(specs: &[ParamSpec], pid: ParamId) -> Result<usize, EvalError> {
    specs
        .get(pid)
        .map(|spec| spec.values().len())
        .ok_or(EvalError::UnknownParam {
            pid,
            len: specs.len(),
        })
}

/// Combinations of `strength` that no test realizes.
pub fn uncovered(
    specs: &[ParamSpec],
    strength: &Strength,
    tests: &[Assignment],
) -> Result<Vec<Vec<PVPair>>, EvalError> {
    Ok(not_realized(targets(specs, strength)?, tests))
}

fn not_realized(combos: Vec<Vec<PVPair>>, tests: &[Assignment]) -> Vec<Vec<PVPair>> {
    combos
        .into_iter()
        .filter(|combo| !tests.iter().any(|test| test.realizes(combo)))
        .collect()
}

/// One report per strength, computed in parallel, in strength order.
pub fn coverage_report(
    specs: &[ParamSpec],
    strengths: &[Strength],
    tests: &[Assignment],
) -> Result<Vec<CoverageReport>, EvalError> {
    strengths
        .par_iter()
        .map(|strength| -> Result<CoverageReport, EvalError> {
            let all = targets(specs, strength)?;
            let total = all.len();
            let uncovered = not_realized(all, tests);
            tracing::debug!(
                pids = ?strength.pids,
                degree = strength.degree,
                total,
                uncovered = uncovered.len(),
                "coverage"
            );
            Ok(CoverageReport {
                strength: strength.clone(),
                total,
                uncovered,
            })
        })
        .collect()
}
