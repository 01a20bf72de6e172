//! Per-parameter invalidation constraints.
//!
//! Preconditions are recorded against parameter names while the model is
//! assembled; finalizing turns them into one constraint per parameter:
//! `IVLD(p) <-> (c1 || c2 || ...)`, or `!IVLD(p)` when nothing was recorded.

use ct_ir::expr::{Constraint, ConstraintRef, LogicOp, Node};
use ct_ir::types::ParamId;

use crate::assembler::{AssembleError, Assembler};
use crate::diagnostics::ErrorLogger;

/// Finalization stopped on a precondition that is not a constraint. The
/// constraints finalized up to that point are kept in `built`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{error}")]
pub struct PartialInvalidations {
    pub error: AssembleError,
    pub built: Vec<ConstraintRef>,
}

impl<L: ErrorLogger> Assembler<L> {
    /// Record `precondition` as a reason to invalidate each named parameter.
    /// The same node is shared by every parameter it is recorded for.
    pub fn record_invalidation_precondition<S: AsRef<str>>(
        &mut self,
        names: &[S],
        precondition: Node,
    ) {
        for name in names {
            let name = name.as_ref();
            let Some(pid) = self.find_param(name) else {
                self.report_warning(&format!("parameter {name} not found"));
                continue;
            };
            self.invalidations
                .entry(pid)
                .or_default()
                .push(precondition.clone());
        }
    }

    /// One invalidation constraint per parameter, in parameter order.
    pub fn finalize_invalidations(&mut self) -> Result<Vec<ConstraintRef>, PartialInvalidations> {
        let mut built = Vec::with_capacity(self.params.len());
        for pid in 0..self.params.len() {
            let marker = Constraint::invalid(pid);
            let recorded = self.invalidations.get(&pid).cloned().unwrap_or_default();
            let Some((first, rest)) = recorded.split_first() else {
                built.push(Constraint::not(marker));
                continue;
            };

            let mut condition = match self.precondition(pid, 0, first) {
                Ok(c) => c,
                Err(error) => return Err(PartialInvalidations { error, built }),
            };
            for (i, precondition) in rest.iter().enumerate() {
                match self.precondition(pid, i + 1, precondition) {
                    Ok(c) => condition = Constraint::logic(LogicOp::Or, condition, c),
                    Err(error) => return Err(PartialInvalidations { error, built }),
                }
            }
            let constraint = Constraint::logic(LogicOp::Iff, condition, marker);
            tracing::debug!(
                pid,
                name = %self.params[pid].name,
                "synthesized invalidation constraint"
            );
            built.push(constraint);
        }
        Ok(built)
    }

    fn precondition(
        &mut self,
        pid: ParamId,
        index: usize,
        node: &Node,
    ) -> Result<ConstraintRef, AssembleError> {
        match node {
            Node::Constraint(c) => Ok(c.clone()),
            _ => self.fail(AssembleError::NotACondition {
                position: index + 1,
                param: self.params[pid].name.clone(),
            }),
        }
    }

    /// Standalone `IVLD(name)` marker. An unknown name is only a warning.
    pub fn build_invalidation(&mut self, name: &str) -> Option<ConstraintRef> {
        match self.find_param(name) {
            Some(pid) => Some(Constraint::invalid(pid)),
            None => {
                self.report_warning(&format!("parameter {name} not found"));
                None
            }
        }
    }
}
