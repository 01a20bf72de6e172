use std::collections::BTreeMap;

use ct_ir::expr::{ArithExpr, ConstraintRef, Node, NodeKind, Operator};
use ct_ir::types::{find_param_id, ParamId, ParamSpec, Seed, Strength, UnknownParamType};

use crate::diagnostics::{DiagnosticLog, ErrorLogger};
use crate::options::AssemblerOptions;

// ── Errors ───────────────────────────────────────────────────────────

/// Fatal construction failures. Each one is also reported through the
/// logger before it is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssembleError {
    #[error(transparent)]
    ParamType(#[from] UnknownParamType),

    #[error("encountered null operands")]
    NullOperand,

    #[error("operands mismatch: {lhs} {rhs}")]
    OperandMismatch { lhs: NodeKind, rhs: NodeKind },

    #[error("expected {expected}, found {found}")]
    ExpectedKind {
        expected: NodeKind,
        found: &'static str,
    },

    #[error("unexpected {context} operator '{op}'")]
    UnexpectedOperator {
        op: Operator,
        context: &'static str,
    },

    #[error("the operands of '%' must be integers")]
    ModOperands,

    #[error("cannot cast to type {0}")]
    CastTarget(String),

    #[error("cannot cast from {0}")]
    CastSource(&'static str),

    #[error("unrecognized boolean value '{0}'")]
    BoolLiteral(String),

    #[error("value for parameter {param} is not a literal ({found})")]
    NotALiteral { param: String, found: &'static str },

    #[error("auto value #{position} for parameter {param} must be a {expected}, found {found}")]
    AutoValueKind {
        position: usize,
        param: String,
        expected: NodeKind,
        found: NodeKind,
    },

    #[error("string concatenation needs at least one term")]
    EmptyConcat,

    #[error("parameter {0} not found")]
    UnknownParam(String),

    #[error("parameter {0} is already declared")]
    DuplicateParam(String),

    #[error("parameter {0} is an auto parameter, and cannot be added to a strength")]
    AutoInStrength(String),

    #[error("cannot assemble pvpair for auto parameter {0}")]
    AutoPVPair(String),

    #[error("not a valid value")]
    EmptyValue,

    #[error("value not found: <{param},{value}>")]
    ValueNotFound { param: String, value: String },

    #[error("the parameter list is smaller than the strength ({available} < {degree})")]
    StrengthTooLarge { available: usize, degree: usize },

    #[error("condition #{position} for invalidating parameter {param} is not a condition")]
    NotACondition { position: usize, param: String },

    #[error("invalid value for option {0}")]
    InvalidOptionValue(String),

    #[error("unhandled option {0}")]
    UnknownOption(String),
}

// ── Assembler ────────────────────────────────────────────────────────

/// Type-directed construction layer between the parser and the search
/// engine.
///
/// The parameter list, constraint list, strengths and seeds it accumulates
/// are read-only once assembly is done; evaluation against them may then
/// run from any number of threads.
#[derive(Debug)]
pub struct Assembler<L = DiagnosticLog> {
    logger: Option<L>,
    pub(crate) options: AssemblerOptions,
    pub(crate) params: Vec<ParamSpec>,
    pub(crate) constraints: Vec<ConstraintRef>,
    /// Recorded preconditions per parameter, in recording order.
    pub(crate) invalidations: BTreeMap<ParamId, Vec<Node>>,
    pub(crate) strengths: Vec<Strength>,
    pub(crate) seeds: Vec<Seed>,
}

impl Assembler<DiagnosticLog> {
    pub fn new() -> Self {
        Self::with_logger(DiagnosticLog::new())
    }

    /// An Assembler that drops every diagnostic.
    pub fn silent() -> Self {
        Self::from_parts(None)
    }
}

impl Default for Assembler<DiagnosticLog> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ErrorLogger> Assembler<L> {
    pub fn with_logger(logger: L) -> Self {
        Self::from_parts(Some(logger))
    }

    fn from_parts(logger: Option<L>) -> Self {
        Self {
            logger,
            options: AssemblerOptions::default(),
            params: Vec::new(),
            constraints: Vec::new(),
            invalidations: BTreeMap::new(),
            strengths: Vec::new(),
            seeds: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: AssemblerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn logger(&self) -> Option<&L> {
        self.logger.as_ref()
    }

    pub fn report_error(&mut self, text: &str) {
        if let Some(logger) = self.logger.as_mut() {
            logger.report_error(text);
        }
    }

    pub fn report_warning(&mut self, text: &str) {
        if let Some(logger) = self.logger.as_mut() {
            logger.report_warning(text);
        }
    }

    pub fn num_errs(&self) -> usize {
        self.logger.as_ref().map_or(0, |l| l.num_errs())
    }

    pub fn num_warnings(&self) -> usize {
        self.logger.as_ref().map_or(0, |l| l.num_warnings())
    }

    /// Report a fatal condition and hand it back as an error.
    pub(crate) fn fail<T>(&mut self, err: AssembleError) -> Result<T, AssembleError> {
        self.report_error(&err.to_string());
        Err(err)
    }

    // ── Registry ─────────────────────────────────────────────────────

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    pub fn find_param(&self, name: &str) -> Option<ParamId> {
        find_param_id(&self.params, name)
    }

    /// Append a parameter to the spec list and return its id.
    pub fn add_param_spec(&mut self, spec: ParamSpec) -> Result<ParamId, AssembleError> {
        if self.find_param(&spec.name).is_some() {
            return self.fail(AssembleError::DuplicateParam(spec.name));
        }
        let pid = self.params.len();
        tracing::debug!(
            pid,
            name = %spec.name,
            param_type = %spec.param_type,
            auto = spec.is_auto(),
            aux = spec.is_aux,
            "declared parameter"
        );
        self.params.push(spec);
        Ok(pid)
    }

    pub fn add_constraint(&mut self, constraint: ConstraintRef) {
        self.constraints.push(constraint);
    }

    pub fn constraints(&self) -> &[ConstraintRef] {
        &self.constraints
    }

    pub fn strengths(&self) -> &[Strength] {
        &self.strengths
    }

    pub fn seeds(&self) -> &[Seed] {
        &self.seeds
    }

    // ── Options ──────────────────────────────────────────────────────

    pub fn default_precision(&self) -> f64 {
        self.options.default_precision
    }

    /// Set an option from a parsed `option = value` statement.
    pub fn set_option(&mut self, name: &str, value: &Node) -> Result<(), AssembleError> {
        if name != "default_precision" {
            return self.fail(AssembleError::UnknownOption(name.to_string()));
        }
        let precision = match value {
            Node::Arith(e) => match e.as_ref() {
                ArithExpr::Int { value, .. } => *value as f64,
                ArithExpr::Double { value, .. } => *value,
                _ => return self.fail(AssembleError::InvalidOptionValue(name.to_string())),
            },
            _ => return self.fail(AssembleError::InvalidOptionValue(name.to_string())),
        };
        self.options.default_precision = precision.abs();
        Ok(())
    }
}
