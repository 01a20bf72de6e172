use ct_ir::expr::ConstraintRef;
use ct_ir::types::{ParamSpec, Seed, Strength};

use crate::assembler::{AssembleError, Assembler};
use crate::diagnostics::ErrorLogger;

/// Everything the search engine consumes once assembly is over. All of it
/// is read-only from here on.
#[derive(Debug, Clone)]
pub struct AssembledModel {
    pub params: Vec<ParamSpec>,
    pub constraints: Vec<ConstraintRef>,
    /// One synthesized constraint per parameter, in parameter order.
    pub invalidations: Vec<ConstraintRef>,
    pub strengths: Vec<Strength>,
    pub seeds: Vec<Seed>,
}

impl AssembledModel {
    /// User constraints followed by the invalidation constraints.
    pub fn all_constraints(&self) -> impl Iterator<Item = &ConstraintRef> {
        self.constraints.iter().chain(self.invalidations.iter())
    }
}

impl<L: ErrorLogger> Assembler<L> {
    pub fn finish(mut self) -> Result<AssembledModel, AssembleError> {
        // 1. Synthesize invalidation constraints
        let invalidations = self.finalize_invalidations().map_err(|partial| partial.error)?;

        // 2. Hand over the accumulated lists
        tracing::debug!(
            params = self.params.len(),
            constraints = self.constraints.len(),
            strengths = self.strengths.len(),
            seeds = self.seeds.len(),
            "assembly finished"
        );
        Ok(AssembledModel {
            params: self.params,
            constraints: self.constraints,
            invalidations,
            strengths: self.strengths,
            seeds: self.seeds,
        })
    }
}
