use ct_ir::expr::{ConstraintRef, Node};
use ct_ir::types::{PVPair, Seed};

use crate::assembler::{AssembleError, Assembler};
use crate::diagnostics::ErrorLogger;

impl<L: ErrorLogger> Assembler<L> {
    /// Resolve `name = value` to a parameter/value id pair. The value node's
    /// spelling is matched against the parameter's value set.
    ///
    /// An unknown parameter is only a warning and yields `Ok(None)`.
    pub fn build_pvpair(&mut self, name: &str, value: &Node) -> Result<Option<PVPair>, AssembleError> {
        let text = value.text();
        if text.is_empty() {
            return self.fail(AssembleError::EmptyValue);
        }
        let Some(pid) = self.find_param(name) else {
            self.report_warning(&format!("parameter {name} not found"));
            return Ok(None);
        };
        if self.params[pid].is_auto() {
            return self.fail(AssembleError::AutoPVPair(name.to_string()));
        }
        match self.params[pid].query_value_id(text) {
            Some(vid) => Ok(Some(PVPair::new(pid, vid))),
            None => self.fail(AssembleError::ValueNotFound {
                param: name.to_string(),
                value: text.to_string(),
            }),
        }
    }

    /// Seed a tuple that must appear verbatim in the generated tests.
    pub fn build_seed_tuple(&mut self, id: usize, pairs: Vec<PVPair>) -> &Seed {
        self.push_seed(Seed::Tuple { id, pairs })
    }

    /// Seed a constraint that at least one generated test must satisfy.
    pub fn build_seed_constraint(&mut self, id: usize, constraint: ConstraintRef) -> &Seed {
        self.push_seed(Seed::Constraint { id, constraint })
    }

    fn push_seed(&mut self, seed: Seed) -> &Seed {
        tracing::debug!(id = seed.id(), "added seed");
        self.seeds.push(seed);
        &self.seeds[self.seeds.len() - 1]
    }
}
