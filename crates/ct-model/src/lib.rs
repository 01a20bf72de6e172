pub mod check;
pub mod coverage;
pub mod eval;
pub mod policy;
pub mod state;

pub use eval::{evaluate, EvalError, Evaluated, Evaluator};
pub use policy::{EvalOptions, InvalidPolicy};
pub use state::{Assignment, Slot};
