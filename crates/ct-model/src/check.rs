//! Legality of assignments against a constraint set.

use rayon::prelude::*;

use ct_ir::expr::ConstraintRef;
use ct_ir::types::ParamSpec;

use crate::eval::{EvalError, Evaluator};
use crate::policy::EvalOptions;
use crate::state::Assignment;

/// Outcome of checking one assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Every constraint is valid and true.
    Legal,
    /// The constraint at this index is valid and false.
    Violated(usize),
    /// The constraint at this index could not be decided.
    Undetermined(usize),
}

impl Verdict {
    pub fn is_legal(&self) -> bool {
        matches!(self, Verdict::Legal)
    }
}

/// Check one assignment. Constraints are visited in order and the first
/// one that does not hold decides the verdict.
pub fn check(
    constraints: &[ConstraintRef],
    specs: &[ParamSpec],
    assignment: &Assignment,
    options: EvalOptions,
) -> Result<Verdict, EvalError> {
    let evaluator = Evaluator::new(specs, assignment).with_options(options);
    for (i, constraint) in constraints.iter().enumerate() {
        let result = evaluator.eval_constraint(constraint)?;
        if !result.valid {
            return Ok(Verdict::Undetermined(i));
        }
        if !result.value {
            return Ok(Verdict::Violated(i));
        }
    }
    Ok(Verdict::Legal)
}

pub fn is_legal(
    constraints: &[ConstraintRef],
    specs: &[ParamSpec],
    assignment: &Assignment,
) -> Result<bool, EvalError> {
    Ok(check(constraints, specs, assignment, EvalOptions::default())?.is_legal())
}

/// Check many assignments in parallel; verdicts come back in input order.
pub fn check_all(
    constraints: &[ConstraintRef],
    specs: &[ParamSpec],
    assignments: &[Assignment],
    options: EvalOptions,
) -> Result<Vec<Verdict>, EvalError> {
    let verdicts = assignments
        .par_iter()
        .map(|assignment| check(constraints, specs, assignment, options))
        .collect::<Result<Vec<_>, _>>()?;
    let legal = verdicts.iter().filter(|v| v.is_legal()).count();
    tracing::debug!(
        assignments = assignments.len(),
        legal,
        "checked assignments"
    );
    Ok(verdicts)
}
