pub mod assembler;
pub mod build;
pub mod compile;
pub mod diagnostics;
pub mod invalidation;
pub mod options;
pub mod seed;
pub mod strength;

pub use assembler::{AssembleError, Assembler};
pub use compile::AssembledModel;
pub use diagnostics::{DiagnosticLog, ErrorLogger};
pub use invalidation::PartialInvalidations;
pub use options::AssemblerOptions;
