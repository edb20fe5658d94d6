use serde_json::Value;

use crate::error::{AgentError, Result};

/// Kind of a single activation parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Any,
    Bool,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl ParamKind {
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            ParamKind::Any => true,
            ParamKind::Bool => value.is_boolean(),
            ParamKind::Integer => value.is_i64() || value.is_u64(),
            ParamKind::Number => value.is_number(),
            ParamKind::String => value.is_string(),
            ParamKind::Array => value.is_array(),
            ParamKind::Object => value.is_object(),
        }
    }
}

/// Declared shape of the arguments an agent accepts at activation.
///
/// `fixed` lists one kind per leading parameter. Parameters from
/// `optional_from` on may be omitted, or given as `null`. A `variadic` kind
/// allows any number of trailing parameters of that kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationPrototype {
    fixed: Vec<ParamKind>,
    optional_from: usize,
    variadic: Option<ParamKind>,
}

impl ActivationPrototype {
    pub fn new(fixed: impl Into<Vec<ParamKind>>) -> Self {
        let fixed = fixed.into();
        let optional_from = fixed.len();
        Self {
            fixed,
            optional_from,
            variadic: None,
        }
    }

    /// Accepts no argument at all.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn optional_from(mut self, index: usize) -> Self {
        self.optional_from = index.min(self.fixed.len());
        self
    }

    pub fn variadic(mut self, kind: ParamKind) -> Self {
        self.variadic = Some(kind);
        self
    }

    pub fn validate(&self, args: &[Value]) -> Result<()> {
        if args.len() < self.optional_from {
            return Err(AgentError::InvalidParameters(format!(
                "expected at least {} arguments, got {}",
                self.optional_from,
                args.len()
            )));
        }
        if self.variadic.is_none() && args.len() > self.fixed.len() {
            return Err(AgentError::InvalidParameters(format!(
                "expected at most {} arguments, got {}",
                self.fixed.len(),
                args.len()
            )));
        }

        for (i, arg) in args.iter().enumerate() {
            let kind = self
                .fixed
                .get(i)
                .copied()
                .or(self.variadic)
                .unwrap_or(ParamKind::Any);
            let optional = i >= self.optional_from;
            if !(kind.accepts(arg) || (optional && arg.is_null())) {
                return Err(AgentError::InvalidParameters(format!(
                    "argument {} should be {:?}, got {}",
                    i, kind, arg
                )));
            }
        }
        Ok(())
    }
}
