//! Argument types and their validators.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::errors::{invalid, type_mismatch, EvalResult};
use crate::value::Value;

/// Declared type of a command or helper argument.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ArgType {
    Any,
    Address,
    Number,
    Bool,
    Bytes,
    /// `bytesN`: exactly `N` bytes.
    FixedBytes(u8),
    String,
    /// A trailing `( ... )` block, handed over unevaluated.
    Block,
    /// A `$name` node, handed over by name so the command can bind it.
    Variable,
    /// Any node, handed over unevaluated.
    Raw,
    /// A type registered by the module.
    Custom(&'static str),
}

impl ArgType {
    /// Whether arguments of this type are evaluated before `run`.
    pub fn is_evaluated(self) -> bool {
        !matches!(self, ArgType::Block | ArgType::Variable | ArgType::Raw)
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgType::Any => f.write_str("any"),
            ArgType::Address => f.write_str("address"),
            ArgType::Number => f.write_str("number"),
            ArgType::Bool => f.write_str("bool"),
            ArgType::Bytes => f.write_str("bytes"),
            ArgType::FixedBytes(n) => write!(f, "bytes{n}"),
            ArgType::String => f.write_str("string"),
            ArgType::Block => f.write_str("block"),
            ArgType::Variable => f.write_str("variable"),
            ArgType::Raw => f.write_str("node"),
            ArgType::Custom(name) => f.write_str(name),
        }
    }
}

/// Validator for a custom type.
pub type Validator = fn(&Value) -> bool;

/// Custom types a module adds on top of the built-in ones.
#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    custom: FxHashMap<&'static str, Validator>,
}

impl TypeRegistry {
    pub fn register(&mut self, name: &'static str, validator: Validator) {
        self.custom.insert(name, validator);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.custom.contains_key(name)
    }

    /// Check `value` against `ty`. Placeholders pass every check.
    pub fn check(&self, ty: ArgType, value: &Value) -> EvalResult<bool> {
        if value.is_placeholder() {
            return Ok(true);
        }
        Ok(match ty {
            ArgType::Any | ArgType::Raw => true,
            ArgType::Address => matches!(value, Value::Address(_)),
            ArgType::Number => matches!(value, Value::Number(_)),
            ArgType::Bool => matches!(value, Value::Bool(_)),
            ArgType::Bytes => matches!(value, Value::Bytes(_)),
            ArgType::FixedBytes(n) => {
                matches!(value, Value::Bytes(b) if b.len() == usize::from(n))
            }
            ArgType::String => matches!(value, Value::String(_)),
            ArgType::Block | ArgType::Variable => false,
            ArgType::Custom(name) => {
                let validator = self
                    .custom
                    .get(name)
                    .ok_or_else(|| invalid(format!("unknown argument type `{name}`")))?;
                validator(value)
            }
        })
    }

    /// Like [`check`](Self::check), failing with a typed error naming `arg`.
    pub fn validate(&self, arg: &str, ty: ArgType, value: &Value) -> EvalResult<()> {
        if self.check(ty, value)? {
            Ok(())
        } else {
            Err(type_mismatch(
                arg,
                &ty.to_string(),
                &format!("{} `{value}`", value.type_name()),
            ))
        }
    }
}
