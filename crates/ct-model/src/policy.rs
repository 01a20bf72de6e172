//! How an invalid operand propagates through AND, OR and IMPLY.
//!
//! XOR, IFF and NOT always need both operands, so an invalid operand makes
//! them invalid under every policy.

use serde::{Deserialize, Serialize};

use crate::eval::Evaluated;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidPolicy {
    /// A valid operand that already determines the result wins over an
    /// invalid one: valid false decides AND, valid true decides OR, and a
    /// valid false antecedent or valid true consequent decides IMPLY.
    #[default]
    Deciding,
    /// Any invalid operand makes the result invalid.
    Absorbing,
}

impl InvalidPolicy {
    pub fn and(self, lhs: Evaluated<bool>, rhs: Evaluated<bool>) -> Evaluated<bool> {
        let value = lhs.value && rhs.value;
        if self == InvalidPolicy::Deciding && (lhs.is_valid_and(false) || rhs.is_valid_and(false)) {
            return Evaluated::valid(false);
        }
        Evaluated::new(value, lhs.valid && rhs.valid)
    }

    pub fn or(self, lhs: Evaluated<bool>, rhs: Evaluated<bool>) -> Evaluated<bool> {
        let value = lhs.value || rhs.value;
        if self == InvalidPolicy::Deciding && (lhs.is_valid_and(true) || rhs.is_valid_and(true)) {
            return Evaluated::valid(true);
        }
        Evaluated::new(value, lhs.valid && rhs.valid)
    }

    pub fn imply(self, lhs: Evaluated<bool>, rhs: Evaluated<bool>) -> Evaluated<bool> {
        let value = !lhs.value || rhs.value;
        if self == InvalidPolicy::Deciding && (lhs.is_valid_and(false) || rhs.is_valid_and(true)) {
            return Evaluated::valid(true);
        }
        Evaluated::new(value, lhs.valid && rhs.valid)
    }
}

/// Evaluation configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalOptions {
    pub policy: InvalidPolicy,
}
