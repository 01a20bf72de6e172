//! Type-directed construction of parameters, expressions and constraints.

use std::sync::Arc;

use ct_ir::expr::{
    ArithExpr, ArithRef, Constraint, ConstraintRef, Node, NodeKind, NumType, Operator, StrExpr,
    StrRef, StrRelOp,
};
use ct_ir::render::Render;
use ct_ir::types::{AutoRule, ParamId, ParamSpec, ParamType, ParamValue, Value};

use crate::assembler::{AssembleError, Assembler};
use crate::diagnostics::ErrorLogger;

/// Precision carried in a `[p]` suffix of a raw operator token, e.g.
/// `==[0.01]`. Contents without a numeric prefix read as zero.
pub fn parse_precision(token: &str) -> Option<f64> {
    let lbracket = token.find('[')?;
    let rbracket = token.find(']')?;
    if rbracket <= lbracket + 1 {
        return None;
    }
    let inner = &token[lbracket + 1..rbracket];
    Some(ct_ir::types::leading_f64(inner).unwrap_or(0.0).abs())
}

fn literal_kind_name(node: &Node) -> &'static str {
    match node {
        Node::Arith(e) => match e.as_ref() {
            ArithExpr::Int { .. } => "integer",
            _ => "double",
        },
        Node::Str(_) => "string",
        Node::Constraint(_) => "boolean",
    }
}

impl<L: ErrorLogger> Assembler<L> {
    // ── Parameters ───────────────────────────────────────────────────

    /// Build a directly enumerable parameter from its literal values.
    pub fn build_param_spec(
        &mut self,
        type_keyword: &str,
        name: &str,
        values: &[Node],
    ) -> Result<ParamSpec, AssembleError> {
        let param_type = match type_keyword.parse::<ParamType>() {
            Ok(t) => t,
            Err(e) => return self.fail(e.into()),
        };

        if param_type == ParamType::Bool {
            let canonical = values.is_empty()
                || (values.len() == 2
                    && matches!(&values[0], Node::Constraint(c) if **c == Constraint::Bool(true))
                    && matches!(&values[1], Node::Constraint(c) if **c == Constraint::Bool(false)));
            if !canonical {
                self.report_warning(&format!(
                    "values for boolean parameter {name} are neglected, possible format is: \
                     \"bool <param>;\" or \"bool <param>: true, false;\""
                ));
            }
            return Ok(ParamSpec::boolean(name));
        }

        let mut coerced = Vec::with_capacity(values.len());
        for value in values {
            if !value.is_literal() {
                return self.fail(AssembleError::NotALiteral {
                    param: name.to_string(),
                    found: value.class_name(),
                });
            }
            let natural = literal_kind_name(value);
            let forced = match (param_type, natural) {
                (ParamType::Int, "integer") => None,
                (ParamType::Int, _) => Some("integer"),
                (ParamType::Double, "integer" | "double") => None,
                (ParamType::Double, _) => Some("double"),
                (ParamType::String, "string") => None,
                (ParamType::String, _) => Some("string"),
                (ParamType::Bool, _) => None,
            };
            if let Some(target) = forced {
                self.report_warning(&format!(
                    "forcing {natural} value {} as {target} for parameter {name}",
                    value.text()
                ));
            }
            coerced.push(coerce_literal(value, param_type));
        }
        Ok(ParamSpec::with_values(name, param_type, coerced))
    }

    /// Build an auto parameter from ordered (precondition, value) pairs.
    pub fn build_auto_param_spec(
        &mut self,
        type_keyword: &str,
        name: &str,
        specs: Vec<(Node, Node)>,
    ) -> Result<ParamSpec, AssembleError> {
        let param_type = match type_keyword.parse::<ParamType>() {
            Ok(t) => t,
            Err(e) => return self.fail(e.into()),
        };

        match specs.last() {
            None => self.report_warning(&format!(
                "the auto value specs for parameter {name} is empty"
            )),
            Some((Node::Constraint(c), _)) if **c == Constraint::Bool(true) => {}
            Some(_) => self.report_warning(&format!(
                "the last condition for auto parameter {name} is not a constant true. \
                 This may cause errors if the specified conditions do not cover all the cases. \
                 Consider using a \"default\" or \"true\"."
            )),
        }

        let expected = match param_type {
            ParamType::Int | ParamType::Double => NodeKind::Arith,
            ParamType::String => NodeKind::Str,
            ParamType::Bool => NodeKind::Constraint,
        };
        let mut rules = Vec::with_capacity(specs.len());
        for (i, (condition, value)) in specs.into_iter().enumerate() {
            let condition = match condition {
                Node::Constraint(c) => c,
                other => {
                    return self.fail(AssembleError::ExpectedKind {
                        expected: NodeKind::Constraint,
                        found: other.class_name(),
                    })
                }
            };
            if value.kind() != expected {
                return self.fail(AssembleError::AutoValueKind {
                    position: i + 1,
                    param: name.to_string(),
                    expected,
                    found: value.kind(),
                });
            }
            rules.push(AutoRule { condition, value });
        }
        Ok(ParamSpec::auto(name, param_type, rules))
    }

    /// Build and register a directly enumerable parameter.
    pub fn declare_param(
        &mut self,
        type_keyword: &str,
        name: &str,
        values: &[Node],
    ) -> Result<ParamId, AssembleError> {
        let spec = self.build_param_spec(type_keyword, name, values)?;
        self.add_param_spec(spec)
    }

    /// Build and register an auto parameter.
    pub fn declare_auto_param(
        &mut self,
        type_keyword: &str,
        name: &str,
        specs: Vec<(Node, Node)>,
    ) -> Result<ParamId, AssembleError> {
        let spec = self.build_auto_param_spec(type_keyword, name, specs)?;
        self.add_param_spec(spec)
    }

    /// Typed reference to a declared parameter.
    pub fn build_param_reference(&mut self, name: &str) -> Result<Node, AssembleError> {
        let Some(pid) = self.find_param(name) else {
            return self.fail(AssembleError::UnknownParam(name.to_string()));
        };
        let node = match self.params[pid].param_type {
            ParamType::Int => Node::Arith(Arc::new(ArithExpr::Param {
                pid,
                ty: NumType::Int,
            })),
            ParamType::Double => Node::Arith(Arc::new(ArithExpr::Param {
                pid,
                ty: NumType::Double,
            })),
            ParamType::String => Node::Str(Arc::new(StrExpr::Param(pid))),
            ParamType::Bool => Node::Constraint(Arc::new(Constraint::Param(pid))),
        };
        Ok(node)
    }

    // ── Literals ─────────────────────────────────────────────────────

    pub fn build_bool_literal(&mut self, text: &str) -> Result<ConstraintRef, AssembleError> {
        match text {
            "true" => Ok(Arc::new(Constraint::Bool(true))),
            "false" => Ok(Arc::new(Constraint::Bool(false))),
            other => self.fail(AssembleError::BoolLiteral(other.to_string())),
        }
    }

    // ── Arithmetic ───────────────────────────────────────────────────

    pub fn build_arith_expr(
        &mut self,
        op: Operator,
        lhs: Option<Node>,
        rhs: Option<Node>,
    ) -> Result<Node, AssembleError> {
        let (Some(lhs), Some(rhs)) = (lhs, rhs) else {
            return self.fail(AssembleError::NullOperand);
        };
        let lhs = self.expect_arith(lhs)?;
        let rhs = self.expect_arith(rhs)?;
        let Some(arith_op) = op.arith() else {
            return self.fail(AssembleError::UnexpectedOperator {
                op,
                context: "arithmetic",
            });
        };
        if op == Operator::Mod && (lhs.num_type() != NumType::Int || rhs.num_type() != NumType::Int)
        {
            return self.fail(AssembleError::ModOperands);
        }
        let ty = lhs.num_type().join(rhs.num_type());
        tracing::trace!(op = %op, ty = %ty, "built arithmetic expression");
        Ok(Node::Arith(Arc::new(ArithExpr::Binary {
            op: arith_op,
            ty,
            lhs,
            rhs,
        })))
    }

    /// `NEG` wraps the operand; `UPLUS` hands back the operand itself.
    pub fn build_unary_arith(
        &mut self,
        op: Operator,
        operand: Option<Node>,
    ) -> Result<Node, AssembleError> {
        let Some(operand) = operand else {
            return self.fail(AssembleError::NullOperand);
        };
        let operand = self.expect_arith(operand)?;
        match op {
            Operator::Neg => Ok(Node::Arith(Arc::new(ArithExpr::Neg(operand)))),
            Operator::Uplus => Ok(Node::Arith(operand)),
            _ => self.fail(AssembleError::UnexpectedOperator {
                op,
                context: "unary arithmetic",
            }),
        }
    }

    pub fn build_cast(
        &mut self,
        operand: Option<Node>,
        target_type: &str,
    ) -> Result<Node, AssembleError> {
        let Some(operand) = operand else {
            return self.fail(AssembleError::NullOperand);
        };
        if let Node::Str(e) = &operand {
            return self.fail(AssembleError::CastSource(e.class_name()));
        }
        let ty = match target_type {
            "int" => NumType::Int,
            "double" => NumType::Double,
            other => return self.fail(AssembleError::CastTarget(other.to_string())),
        };
        let cast = match operand {
            Node::Arith(operand) => ArithExpr::Cast { ty, operand },
            Node::Constraint(operand) => ArithExpr::FromConstraint { ty, operand },
            Node::Str(e) => return self.fail(AssembleError::CastSource(e.class_name())),
        };
        Ok(Node::Arith(Arc::new(cast)))
    }

    // ── Strings ──────────────────────────────────────────────────────

    pub fn build_string_concat(&mut self, terms: Vec<Node>) -> Result<Node, AssembleError> {
        if terms.is_empty() {
            return self.fail(AssembleError::EmptyConcat);
        }
        let mut parts: Vec<StrRef> = Vec::with_capacity(terms.len());
        for term in terms {
            match term {
                Node::Str(e) => parts.push(e),
                other => {
                    return self.fail(AssembleError::ExpectedKind {
                        expected: NodeKind::Str,
                        found: other.class_name(),
                    })
                }
            }
        }
        if parts.len() == 1 {
            return Ok(Node::Str(parts.remove(0)));
        }
        Ok(Node::Str(Arc::new(StrExpr::Concat(parts))))
    }

    // ── Constraints ──────────────────────────────────────────────────

    pub fn build_arith_constraint(
        &mut self,
        op: Operator,
        lhs: Option<ArithRef>,
        rhs: Option<ArithRef>,
        precision: f64,
    ) -> Result<ConstraintRef, AssembleError> {
        let (Some(lhs), Some(rhs)) = (lhs, rhs) else {
            return self.fail(AssembleError::NullOperand);
        };
        let Some(rel) = op.relational() else {
            return self.fail(AssembleError::UnexpectedOperator {
                op,
                context: "arithmetic constraint",
            });
        };
        Ok(Arc::new(Constraint::Arith {
            op: rel,
            lhs,
            rhs,
            precision,
        }))
    }

    pub fn build_string_constraint(
        &mut self,
        op: Operator,
        lhs: Option<StrRef>,
        rhs: Option<StrRef>,
    ) -> Result<ConstraintRef, AssembleError> {
        let (Some(lhs), Some(rhs)) = (lhs, rhs) else {
            return self.fail(AssembleError::NullOperand);
        };
        let rel = match op {
            Operator::Eq => StrRelOp::Eq,
            Operator::Ne => StrRelOp::Ne,
            _ => {
                return self.fail(AssembleError::UnexpectedOperator {
                    op,
                    context: "string constraint",
                })
            }
        };
        Ok(Arc::new(Constraint::Str { op: rel, lhs, rhs }))
    }

    pub fn build_logical_constraint(
        &mut self,
        op: Operator,
        lhs: Option<Node>,
        rhs: Option<Node>,
    ) -> Result<ConstraintRef, AssembleError> {
        let (Some(lhs), Some(rhs)) = (lhs, rhs) else {
            return self.fail(AssembleError::NullOperand);
        };
        let lhs = self.expect_constraint(lhs)?;
        let rhs = self.expect_constraint(rhs)?;
        let Some(logic) = op.logical() else {
            return self.fail(AssembleError::UnexpectedOperator {
                op,
                context: "logical constraint",
            });
        };
        Ok(Constraint::logic(logic, lhs, rhs))
    }

    /// Only `NOT` is a unary logical operator.
    pub fn build_unary_logical(
        &mut self,
        op: Operator,
        operand: Option<Node>,
    ) -> Result<ConstraintRef, AssembleError> {
        let Some(operand) = operand else {
            return self.fail(AssembleError::NullOperand);
        };
        let operand = self.expect_constraint(operand)?;
        if op != Operator::Not {
            return self.fail(AssembleError::UnexpectedOperator {
                op,
                context: "unary logical",
            });
        }
        Ok(Constraint::not(operand))
    }

    /// Relation between two operands, dispatched on their kinds. The raw
    /// operator token may carry a `[p]` precision suffix.
    pub fn build_relational_constraint(
        &mut self,
        op: Operator,
        lhs: Option<Node>,
        rhs: Option<Node>,
        raw_token: &str,
    ) -> Result<ConstraintRef, AssembleError> {
        let (Some(lhs), Some(rhs)) = (lhs, rhs) else {
            return self.fail(AssembleError::NullOperand);
        };
        let explicit = parse_precision(raw_token);
        match (lhs, rhs) {
            (Node::Arith(lhs), Node::Arith(rhs)) => {
                let both_int = lhs.num_type() == NumType::Int && rhs.num_type() == NumType::Int;
                let precision = match explicit {
                    Some(_) if both_int => {
                        self.report_warning("ignoring precision for integer relation");
                        self.options.default_precision
                    }
                    Some(p) => p,
                    None => self.options.default_precision,
                };
                self.build_arith_constraint(op, Some(lhs), Some(rhs), precision)
            }
            (Node::Str(lhs), Node::Str(rhs)) => {
                if explicit.is_some() {
                    self.report_warning("ignoring precision for string relation");
                }
                self.build_string_constraint(op, Some(lhs), Some(rhs))
            }
            (lhs @ Node::Constraint(_), rhs @ Node::Constraint(_)) => {
                if explicit.is_some() {
                    self.report_warning("ignoring precision for bool relation");
                }
                self.build_logical_constraint(op, Some(lhs), Some(rhs))
            }
            (lhs, rhs) => self.fail(AssembleError::OperandMismatch {
                lhs: lhs.kind(),
                rhs: rhs.kind(),
            }),
        }
    }

    // ── Helpers ──────────────────────────────────────────────────────

    fn expect_arith(&mut self, node: Node) -> Result<ArithRef, AssembleError> {
        match node {
            Node::Arith(e) => Ok(e),
            other => self.fail(AssembleError::ExpectedKind {
                expected: NodeKind::Arith,
                found: other.class_name(),
            }),
        }
    }

    pub(crate) fn expect_constraint(&mut self, node: Node) -> Result<ConstraintRef, AssembleError> {
        match node {
            Node::Constraint(c) => Ok(c),
            other => self.fail(AssembleError::ExpectedKind {
                expected: NodeKind::Constraint,
                found: other.class_name(),
            }),
        }
    }

    /// Render a node against the registered parameters, for diagnostics.
    pub fn describe(&self, node: &Node) -> String {
        node.display(&self.params).to_string()
    }
}

/// Coerce a literal node to a parameter's declared type. Numeric literals
/// convert by value; everything else goes through the spelling.
fn coerce_literal(node: &Node, param_type: ParamType) -> ParamValue {
    let text = node.text().to_string();
    let Node::Arith(e) = node else {
        return ParamValue::coerce(&text, param_type);
    };
    let value = match (e.as_ref(), param_type) {
        (ArithExpr::Int { value, .. }, ParamType::Int) => Value::Int(*value),
        (ArithExpr::Int { value, .. }, ParamType::Double) => Value::Double(*value as f64),
        (ArithExpr::Double { value, .. }, ParamType::Int) => Value::Int(value.trunc() as i64),
        (ArithExpr::Double { value, .. }, ParamType::Double) => Value::Double(*value),
        _ => return ParamValue::coerce(&text, param_type),
    };
    ParamValue { text, value }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_from_bracket_suffix() {
        assert_eq!(parse_precision("==[0.01]"), Some(0.01));
        assert_eq!(parse_precision("!=[-0.5]"), Some(0.5));
        assert_eq!(parse_precision("==[abc]"), Some(0.0));
    }

    #[test]
    fn test_precision_requires_well_formed_brackets() {
        assert_eq!(parse_precision("=="), None);
        assert_eq!(parse_precision("==[]"), None);
        assert_eq!(parse_precision("==]0.1["), None);
        assert_eq!(parse_precision("==[0.1"), None);
    }

    #[test]
    fn test_coerce_double_literal_to_int_truncates() {
        let v = coerce_literal(&Node::double_spelled(2.9, "2.9"), ParamType::Int);
        assert_eq!(v.value, Value::Int(2));
        assert_eq!(v.text, "2.9");
        let v = coerce_literal(&Node::double_spelled(-2.9, "-2.9"), ParamType::Int);
        assert_eq!(v.value, Value::Int(-2));
    }

    #[test]
    fn test_coerce_number_to_string_keeps_spelling() {
        let v = coerce_literal(&Node::int_spelled(10, "010"), ParamType::String);
        assert_eq!(v.value, Value::Str("010".into()));
    }
}
