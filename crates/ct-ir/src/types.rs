use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::expr::{ConstraintRef, Node, NumType};

/// Index of a parameter in the ordered spec list.
pub type ParamId = usize;
/// Index of a value in a parameter's static domain.
pub type ValueId = usize;

// ── Parameter types ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Int,
    Double,
    String,
    Bool,
}

impl ParamType {
    pub fn keyword(&self) -> &'static str {
        match self {
            ParamType::Int => "int",
            ParamType::Double => "double",
            ParamType::String => "string",
            ParamType::Bool => "bool",
        }
    }

    pub fn num_type(&self) -> Option<NumType> {
        match self {
            ParamType::Int => Some(NumType::Int),
            ParamType::Double => Some(NumType::Double),
            ParamType::String | ParamType::Bool => None,
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized parameter type '{0}'")]
pub struct UnknownParamType(pub String);

impl FromStr for ParamType {
    type Err = UnknownParamType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(ParamType::Int),
            "double" => Ok(ParamType::Double),
            "string" => Ok(ParamType::String),
            "bool" => Ok(ParamType::Bool),
            other => Err(UnknownParamType(other.to_string())),
        }
    }
}

// ── Values ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Double(f64),
    Str(String),
}

/// One entry of a static domain: the spelling used for matching and the
/// value coerced to the parameter's declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamValue {
    pub text: String,
    pub value: Value,
}

impl ParamValue {
    /// Coerce a literal spelling to `ty`. Numbers are read from the leading
    /// numeric prefix of the text, falling back to zero.
    pub fn coerce(text: &str, ty: ParamType) -> Self {
        let value = match ty {
            ParamType::Int => Value::Int(leading_i64(text).unwrap_or(0)),
            ParamType::Double => Value::Double(leading_f64(text).unwrap_or(0.0)),
            ParamType::String => Value::Str(text.to_string()),
            ParamType::Bool => Value::Bool(text == "true"),
        };
        Self {
            text: text.to_string(),
            value,
        }
    }
}

/// Length of the longest prefix of `s` shaped like a decimal number
/// (`[+-]digits[.digits][e[+-]digits]`), after leading whitespace.
fn numeric_prefix(s: &str, allow_fraction: bool) -> &str {
    let bytes = s.as_bytes();
    let mut end = 0;
    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if allow_fraction {
        if end < bytes.len() && bytes[end] == b'.' {
            let frac_start = end + 1;
            let mut frac_end = frac_start;
            while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
                frac_end += 1;
            }
            digits += frac_end - frac_start;
            if digits > 0 {
                end = frac_end;
            }
        }
        if digits > 0 && end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
            let mut exp_end = end + 1;
            if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
                exp_end += 1;
            }
            let exp_digits_start = exp_end;
            while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
                exp_end += 1;
            }
            if exp_end > exp_digits_start {
                end = exp_end;
            }
        }
    }
    if digits == 0 {
        return "";
    }
    &s[..end]
}

/// Integer read from the leading numeric prefix, the way a C stream
/// extraction would.
pub fn leading_i64(text: &str) -> Option<i64> {
    numeric_prefix(text.trim_start(), false).parse().ok()
}

/// Double read from the leading numeric prefix.
pub fn leading_f64(text: &str) -> Option<f64> {
    numeric_prefix(text.trim_start(), true).parse().ok()
}

// ── Parameter specifications ─────────────────────────────────────────

/// One (condition, value) rule of an auto parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoRule {
    pub condition: ConstraintRef,
    pub value: Node,
}

/// A parameter's domain: either enumerable values or computed rules,
/// never both.
#[derive(Debug, Clone, PartialEq)]
pub enum Domain {
    Values(Vec<ParamValue>),
    /// Evaluated first-match-wins at assignment time.
    Auto(Vec<AutoRule>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub param_type: ParamType,
    pub domain: Domain,
    /// Excluded from strength coverage and default strength expansion.
    pub is_aux: bool,
}

impl ParamSpec {
    pub fn with_values(name: impl Into<String>, param_type: ParamType, values: Vec<ParamValue>) -> Self {
        Self {
            name: name.into(),
            param_type,
            domain: Domain::Values(values),
            is_aux: false,
        }
    }

    /// A boolean parameter; its domain is always `true, false` in that order.
    pub fn boolean(name: impl Into<String>) -> Self {
        let values = ["true", "false"]
            .iter()
            .map(|t| ParamValue::coerce(t, ParamType::Bool))
            .collect();
        Self::with_values(name, ParamType::Bool, values)
    }

    pub fn auto(name: impl Into<String>, param_type: ParamType, rules: Vec<AutoRule>) -> Self {
        Self {
            name: name.into(),
            param_type,
            domain: Domain::Auto(rules),
            is_aux: false,
        }
    }

    pub fn aux(mut self, is_aux: bool) -> Self {
        self.is_aux = is_aux;
        self
    }

    pub fn is_auto(&self) -> bool {
        matches!(self.domain, Domain::Auto(_))
    }

    /// Static values; empty for auto parameters.
    pub fn values(&self) -> &[ParamValue] {
        match &self.domain {
            Domain::Values(values) => values,
            Domain::Auto(_) => &[],
        }
    }

    pub fn auto_rules(&self) -> &[AutoRule] {
        match &self.domain {
            Domain::Values(_) => &[],
            Domain::Auto(rules) => rules,
        }
    }

    pub fn query_value_id(&self, text: &str) -> Option<ValueId> {
        self.values().iter().position(|v| v.text == text)
    }

    /// Whether the parameter takes part in default strength expansion.
    pub fn is_coverable(&self) -> bool {
        !self.is_aux && !self.is_auto()
    }
}

pub fn find_param_id(specs: &[ParamSpec], name: &str) -> Option<ParamId> {
    specs.iter().position(|spec| spec.name == name)
}

// ── Strengths and seeds ──────────────────────────────────────────────

/// One atomic parameter-value choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PVPair {
    pub pid: ParamId,
    pub vid: ValueId,
}

impl PVPair {
    pub fn new(pid: ParamId, vid: ValueId) -> Self {
        Self { pid, vid }
    }
}

/// Covering requirement: every `degree`-way value combination over
/// `pids` must appear in some generated test.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Strength {
    pub pids: Vec<ParamId>,
    pub degree: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Seed {
    /// Must be realized verbatim in the output.
    Tuple { id: usize, pairs: Vec<PVPair> },
    /// Must hold for at least one generated test.
    Constraint { id: usize, constraint: ConstraintRef },
}

impl Seed {
    pub fn id(&self) -> usize {
        match self {
            Seed::Tuple { id, .. } | Seed::Constraint { id, .. } => *id,
        }
    }
}
