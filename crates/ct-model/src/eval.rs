//! Typed evaluation of expressions and constraints against an assignment.
//!
//! Every result carries a validity flag next to its value. Invalid values
//! come from unassigned or don't-care parameters, value ids outside the
//! domain, auto parameters whose rules all fail, and integer division by
//! zero. Structural problems (a parameter id past the end of the spec list,
//! an auto rule that depends on itself) are errors instead.
//!
//! Evaluation is a pure function of the AST, the spec list and the
//! assignment. Once assembly is done the first two are read-only, so any
//! number of threads may evaluate against them at once.

use std::cell::RefCell;

use ct_ir::expr::{ArithExpr, ArithOp, Constraint, LogicOp, Node, NumType, RelOp, StrExpr, StrRelOp};
use ct_ir::types::{ParamId, ParamSpec, ParamType, Value};

use crate::policy::EvalOptions;
use crate::state::{Assignment, Slot};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("parameter #{pid} is out of range ({len} parameters)")]
    UnknownParam { pid: ParamId, len: usize },

    #[error("parameter {name} of type {actual} used as {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: ParamType,
    },

    #[error("auto parameter {0} depends on itself")]
    AutoCycle(String),
}

/// A value together with whether it is well-defined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluated<T> {
    pub value: T,
    pub valid: bool,
}

impl<T> Evaluated<T> {
    pub fn new(value: T, valid: bool) -> Self {
        Self { value, valid }
    }

    pub fn valid(value: T) -> Self {
        Self::new(value, true)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Evaluated<U> {
        Evaluated::new(f(self.value), self.valid)
    }
}

impl<T: Default> Evaluated<T> {
    pub fn invalid() -> Self {
        Self::new(T::default(), false)
    }
}

impl Evaluated<bool> {
    pub fn is_valid_and(&self, value: bool) -> bool {
        self.valid && self.value == value
    }

    /// Valid and true.
    pub fn holds(&self) -> bool {
        self.is_valid_and(true)
    }
}

/// Runtime number, following the static type of the expression it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Num {
    Int(i64),
    Double(f64),
}

impl Default for Num {
    fn default() -> Self {
        Num::Int(0)
    }
}

impl Num {
    fn as_i64(self) -> i64 {
        match self {
            Num::Int(i) => i,
            // `as` truncates toward zero and saturates.
            Num::Double(d) => d as i64,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Double(d) => d,
        }
    }

    fn to_type(self, ty: NumType) -> Num {
        match ty {
            NumType::Int => Num::Int(self.as_i64()),
            NumType::Double => Num::Double(self.as_f64()),
        }
    }
}

/// Evaluates AST nodes against one assignment.
pub struct Evaluator<'a> {
    specs: &'a [ParamSpec],
    assignment: &'a Assignment,
    options: EvalOptions,
    /// Auto parameters currently being resolved.
    resolving: RefCell<Vec<ParamId>>,
}

impl<'a> Evaluator<'a> {
    pub fn new(specs: &'a [ParamSpec], assignment: &'a Assignment) -> Self {
        Self {
            specs,
            assignment,
            options: EvalOptions::default(),
            resolving: RefCell::new(Vec::new()),
        }
    }

    pub fn with_options(mut self, options: EvalOptions) -> Self {
        self.options = options;
        self
    }

    // ── Arithmetic ───────────────────────────────────────────────────

    pub fn eval_int(&self, expr: &ArithExpr) -> Result<Evaluated<i64>, EvalError> {
        Ok(self.eval_num(expr)?.map(Num::as_i64))
    }

    pub fn eval_double(&self, expr: &ArithExpr) -> Result<Evaluated<f64>, EvalError> {
        Ok(self.eval_num(expr)?.map(Num::as_f64))
    }

    fn eval_num(&self, expr: &ArithExpr) -> Result<Evaluated<Num>, EvalError> {
        match expr {
            ArithExpr::Int { value, .. } => Ok(Evaluated::valid(Num::Int(*value))),
            ArithExpr::Double { value, .. } => Ok(Evaluated::valid(Num::Double(*value))),
            ArithExpr::Param { pid, ty } => Ok(self.param_num(*pid)?.map(|n| n.to_type(*ty))),
            ArithExpr::Binary { op, ty, lhs, rhs } => {
                let lhs = self.eval_num(lhs)?;
                let rhs = self.eval_num(rhs)?;
                if !lhs.valid || !rhs.valid {
                    return Ok(Evaluated::invalid());
                }
                Ok(apply_arith(*op, *ty, lhs.value, rhs.value))
            }
            ArithExpr::Neg(operand) => Ok(self.eval_num(operand)?.map(|n| match n {
                Num::Int(i) => Num::Int(i.wrapping_neg()),
                Num::Double(d) => Num::Double(-d),
            })),
            ArithExpr::Cast { ty, operand } => Ok(self.eval_num(operand)?.map(|n| n.to_type(*ty))),
            ArithExpr::FromConstraint { ty, operand } => {
                let truth = self.eval_constraint(operand)?;
                Ok(truth.map(|b| Num::Int(i64::from(b)).to_type(*ty)))
            }
        }
    }

    fn param_num(&self, pid: ParamId) -> Result<Evaluated<Num>, EvalError> {
        let spec = self.spec(pid)?;
        if spec.is_auto() {
            return self.while_resolving(pid, || match self.first_firing_rule(spec)? {
                Some(Node::Arith(e)) => self.eval_num(&e),
                Some(_) => Err(self.mismatch(spec, "a number")),
                None => Ok(Evaluated::invalid()),
            });
        }
        match self.static_value(spec, pid) {
            None => Ok(Evaluated::invalid()),
            Some(Value::Int(i)) => Ok(Evaluated::valid(Num::Int(*i))),
            Some(Value::Double(d)) => Ok(Evaluated::valid(Num::Double(*d))),
            Some(_) => Err(self.mismatch(spec, "a number")),
        }
    }

    // ── Strings ──────────────────────────────────────────────────────

    pub fn eval_string(&self, expr: &StrExpr) -> Result<Evaluated<String>, EvalError> {
        match expr {
            StrExpr::Const(s) => Ok(Evaluated::valid(s.clone())),
            StrExpr::Param(pid) => self.param_string(*pid),
            StrExpr::Concat(terms) => {
                let mut out = String::new();
                for term in terms {
                    let part = self.eval_string(term)?;
                    if !part.valid {
                        return Ok(Evaluated::invalid());
                    }
                    out.push_str(&part.value);
                }
                Ok(Evaluated::valid(out))
            }
        }
    }

    fn param_string(&self, pid: ParamId) -> Result<Evaluated<String>, EvalError> {
        let spec = self.spec(pid)?;
        if spec.is_auto() {
            return self.while_resolving(pid, || match self.first_firing_rule(spec)? {
                Some(Node::Str(e)) => self.eval_string(&e),
                Some(_) => Err(self.mismatch(spec, "a string")),
                None => Ok(Evaluated::invalid()),
            });
        }
        match self.static_value(spec, pid) {
            None => Ok(Evaluated::invalid()),
            Some(Value::Str(s)) => Ok(Evaluated::valid(s.clone())),
            Some(_) => Err(self.mismatch(spec, "a string")),
        }
    }

    // ── Constraints ──────────────────────────────────────────────────

    pub fn eval_constraint(&self, constraint: &Constraint) -> Result<Evaluated<bool>, EvalError> {
        match constraint {
            Constraint::Bool(b) => Ok(Evaluated::valid(*b)),
            Constraint::Param(pid) => self.param_bool(*pid),
            Constraint::Invalid(pid) => self.is_invalid(*pid),
            Constraint::Not(operand) => Ok(self.eval_constraint(operand)?.map(|b| !b)),
            Constraint::Logic { op, lhs, rhs } => {
                let lhs = self.eval_constraint(lhs)?;
                let rhs = self.eval_constraint(rhs)?;
                let policy = self.options.policy;
                Ok(match op {
                    LogicOp::And => policy.and(lhs, rhs),
                    LogicOp::Or => policy.or(lhs, rhs),
                    LogicOp::Imply => policy.imply(lhs, rhs),
                    LogicOp::Xor => Evaluated::new(lhs.value != rhs.value, lhs.valid && rhs.valid),
                    LogicOp::Iff => Evaluated::new(lhs.value == rhs.value, lhs.valid && rhs.valid),
                })
            }
            Constraint::Arith {
                op,
                lhs,
                rhs,
                precision,
            } => {
                let lhs = self.eval_num(lhs)?;
                let rhs = self.eval_num(rhs)?;
                if !lhs.valid || !rhs.valid {
                    return Ok(Evaluated::invalid());
                }
                Ok(Evaluated::valid(compare(*op, lhs.value, rhs.value, *precision)))
            }
            Constraint::Str { op, lhs, rhs } => {
                let lhs = self.eval_string(lhs)?;
                let rhs = self.eval_string(rhs)?;
                if !lhs.valid || !rhs.valid {
                    return Ok(Evaluated::invalid());
                }
                let equal = lhs.value == rhs.value;
                Ok(Evaluated::valid(match op {
                    StrRelOp::Eq => equal,
                    StrRelOp::Ne => !equal,
                }))
            }
        }
    }

    fn param_bool(&self, pid: ParamId) -> Result<Evaluated<bool>, EvalError> {
        let spec = self.spec(pid)?;
        if spec.is_auto() {
            return self.while_resolving(pid, || match self.first_firing_rule(spec)? {
                Some(Node::Constraint(c)) => self.eval_constraint(&c),
                Some(_) => Err(self.mismatch(spec, "a boolean")),
                None => Ok(Evaluated::invalid()),
            });
        }
        match self.static_value(spec, pid) {
            None => Ok(Evaluated::invalid()),
            Some(Value::Bool(b)) => Ok(Evaluated::valid(*b)),
            Some(_) => Err(self.mismatch(spec, "a boolean")),
        }
    }

    /// Truth of `IVLD(pid)`.
    ///
    /// An auto parameter is invalid when none of its rules fires or the
    /// fired rule's value is itself invalid, exactly as reading it would
    /// report. A static parameter is invalid when its slot is `Invalid` or
    /// names a value id outside the domain; an unassigned one gives an
    /// invalid answer.
    pub fn is_invalid(&self, pid: ParamId) -> Result<Evaluated<bool>, EvalError> {
        let spec = self.spec(pid)?;
        if spec.is_auto() {
            let readable = match spec.param_type {
                ParamType::Int | ParamType::Double => self.param_num(pid)?.valid,
                ParamType::String => self.param_string(pid)?.valid,
                ParamType::Bool => self.param_bool(pid)?.valid,
            };
            return Ok(Evaluated::valid(!readable));
        }
        Ok(match self.assignment.get(pid) {
            None => Evaluated::invalid(),
            Some(Slot::Invalid) => Evaluated::valid(true),
            Some(Slot::Value(vid)) => Evaluated::valid(vid >= spec.values().len()),
        })
    }

    // ── Helpers ──────────────────────────────────────────────────────

    fn spec(&self, pid: ParamId) -> Result<&'a ParamSpec, EvalError> {
        self.specs.get(pid).ok_or(EvalError::UnknownParam {
            pid,
            len: self.specs.len(),
        })
    }

    fn static_value(&self, spec: &'a ParamSpec, pid: ParamId) -> Option<&'a Value> {
        match self.assignment.get(pid)? {
            Slot::Value(vid) => spec.values().get(vid).map(|v| &v.value),
            Slot::Invalid => None,
        }
    }

    /// Runs `f` with `pid` marked as being resolved. The mark covers both
    /// the rule conditions and the chosen value, so a rule that reaches its
    /// own parameter either way is reported as a cycle.
    fn while_resolving<T>(
        &self,
        pid: ParamId,
        f: impl FnOnce() -> Result<T, EvalError>,
    ) -> Result<T, EvalError> {
        if self.resolving.borrow().contains(&pid) {
            return Err(EvalError::AutoCycle(self.spec(pid)?.name.clone()));
        }
        self.resolving.borrow_mut().push(pid);
        let result = f();
        self.resolving.borrow_mut().pop();
        result
    }

    /// Value node of the first rule whose condition holds, if any.
    fn first_firing_rule(&self, spec: &'a ParamSpec) -> Result<Option<Node>, EvalError> {
        for rule in spec.auto_rules() {
            if self.eval_constraint(&rule.condition)?.holds() {
                return Ok(Some(rule.value.clone()));
            }
        }
        Ok(None)
    }

    fn mismatch(&self, spec: &ParamSpec, expected: &'static str) -> EvalError {
        EvalError::TypeMismatch {
            name: spec.name.clone(),
            expected,
            actual: spec.param_type,
        }
    }
}

fn apply_arith(op: ArithOp, ty: NumType, lhs: Num, rhs: Num) -> Evaluated<Num> {
    match ty {
        NumType::Int => {
            let (a, b) = (lhs.as_i64(), rhs.as_i64());
            let value = match op {
                ArithOp::Add => a.wrapping_add(b),
                ArithOp::Sub => a.wrapping_sub(b),
                ArithOp::Mult => a.wrapping_mul(b),
                ArithOp::Div | ArithOp::Mod if b == 0 => return Evaluated::invalid(),
                ArithOp::Div => a.wrapping_div(b),
                ArithOp::Mod => a.wrapping_rem(b),
            };
            Evaluated::valid(Num::Int(value))
        }
        NumType::Double => {
            let (a, b) = (lhs.as_f64(), rhs.as_f64());
            let value = match op {
                ArithOp::Add => a + b,
                ArithOp::Sub => a - b,
                ArithOp::Mult => a * b,
                ArithOp::Div => a / b,
                ArithOp::Mod => a % b,
            };
            Evaluated::valid(Num::Double(value))
        }
    }
}

/// Two integers compare exactly; anything else compares as doubles with
/// `precision` applied to equality and inequality only.
fn compare(op: RelOp, lhs: Num, rhs: Num, precision: f64) -> bool {
    if let (Num::Int(a), Num::Int(b)) = (lhs, rhs) {
        return match op {
            RelOp::Eq => a == b,
            RelOp::Ne => a != b,
            RelOp::Gt => a > b,
            RelOp::Ge => a >= b,
            RelOp::Lt => a < b,
            RelOp::Le => a <= b,
        };
    }
    let (a, b) = (lhs.as_f64(), rhs.as_f64());
    match op {
        RelOp::Eq => (a - b).abs() <= precision,
        RelOp::Ne => (a - b).abs() > precision,
        RelOp::Gt => a > b,
        RelOp::Ge => a >= b,
        RelOp::Lt => a < b,
        RelOp::Le => a <= b,
    }
}

// ── Convenience entry points ─────────────────────────────────────────

pub fn evaluate_int(
    expr: &ArithExpr,
    assignment: &Assignment,
    specs: &[ParamSpec],
) -> Result<Evaluated<i64>, EvalError> {
    Evaluator::new(specs, assignment).eval_int(expr)
}

pub fn evaluate_double(
    expr: &ArithExpr,
    assignment: &Assignment,
    specs: &[ParamSpec],
) -> Result<Evaluated<f64>, EvalError> {
    Evaluator::new(specs, assignment).eval_double(expr)
}

pub fn evaluate_string(
    expr: &StrExpr,
    assignment: &Assignment,
    specs: &[ParamSpec],
) -> Result<Evaluated<String>, EvalError> {
    Evaluator::new(specs, assignment).eval_string(expr)
}

pub fn evaluate(
    constraint: &Constraint,
    assignment: &Assignment,
    specs: &[ParamSpec],
) -> Result<Evaluated<bool>, EvalError> {
    Evaluator::new(specs, assignment).eval_constraint(constraint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_division_by_zero_is_invalid() {
        let r = apply_arith(ArithOp::Div, NumType::Int, Num::Int(4), Num::Int(0));
        assert!(!r.valid);
        let r = apply_arith(ArithOp::Mod, NumType::Int, Num::Int(4), Num::Int(0));
        assert!(!r.valid);
        let r = apply_arith(ArithOp::Mod, NumType::Int, Num::Int(-7), Num::Int(3));
        assert_eq!(r, Evaluated::valid(Num::Int(-1)));
    }

    #[test]
    fn test_int_overflow_wraps() {
        let r = apply_arith(ArithOp::Add, NumType::Int, Num::Int(i64::MAX), Num::Int(1));
        assert_eq!(r.value, Num::Int(i64::MIN));
        let r = apply_arith(ArithOp::Div, NumType::Int, Num::Int(i64::MIN), Num::Int(-1));
        assert_eq!(r.value, Num::Int(i64::MIN));
    }

    #[test]
    fn test_double_to_int_truncates_and_saturates() {
        assert_eq!(Num::Double(-2.7).as_i64(), -2);
        assert_eq!(Num::Double(1e300).as_i64(), i64::MAX);
        assert_eq!(Num::Double(f64::NAN).as_i64(), 0);
    }

    #[test]
    fn test_mixed_comparison_uses_precision() {
        assert!(compare(RelOp::Eq, Num::Int(1), Num::Double(1.05), 0.1));
        assert!(!compare(RelOp::Ne, Num::Int(1), Num::Double(1.05), 0.1));
        assert!(compare(RelOp::Lt, Num::Int(1), Num::Double(1.05), 0.1));
        assert!(!compare(RelOp::Eq, Num::Int(1), Num::Int(2), 5.0));
    }
}
