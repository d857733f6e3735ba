//! Runtime values.
//!
//! - [`Address`]: 20-byte account address with EIP-55 display
//! - [`Value`]: everything a node can evaluate to
//! - [`number_from_parts`]: numeric literal scaling

mod number;

pub use number::{number_from_parts, MAX_EXPONENT};

use std::fmt;
use std::str::FromStr;

use num_bigint::BigInt;
use serde::{Serialize, Serializer};
use tiny_keccak::{Hasher, Keccak};

/// Keccak-256 digest of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut out = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut out);
    out
}

/// An account or contract address.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0; 20]);

    pub const fn new(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Address whose last eight bytes hold `n`, for well-known sentinels.
    pub fn from_low_u64(n: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&n.to_be_bytes());
        Address(bytes)
    }

    /// EIP-55 mixed-case hex.
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = keccak256(lower.as_bytes());
        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = (hash[i / 2] >> (if i % 2 == 0 { 4 } else { 0 })) & 0x0f;
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

/// Error parsing an address.
#[derive(Clone, Eq, PartialEq, Debug, thiserror::Error)]
#[error("`{0}` is not a 20-byte hex address")]
pub struct ParseAddressError(pub String);

impl FromStr for Address {
    type Err = ParseAddressError;

    /// Accepts `0x` followed by 40 hex digits in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .filter(|d| d.len() == 40)
            .ok_or_else(|| ParseAddressError(s.to_string()))?;
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes).map_err(|_| ParseAddressError(s.to_string()))?;
        Ok(Address(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

/// A runtime value.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Value {
    Address(Address),
    Bool(bool),
    Bytes(Vec<u8>),
    Number(BigInt),
    String(String),
    List(Vec<Value>),
    /// Stands in for the result of a capability call skipped during eager
    /// evaluation. Passes every type check.
    Placeholder,
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Address(_) => "address",
            Value::Bool(_) => "bool",
            Value::Bytes(_) => "bytes",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Placeholder => "placeholder",
        }
    }

    #[inline]
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Value::Placeholder)
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            Value::Address(a) => Some(*a),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&BigInt> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this value, or any list element, is a placeholder.
    pub fn contains_placeholder(&self) -> bool {
        match self {
            Value::Placeholder => true,
            Value::List(items) => items.iter().any(Value::contains_placeholder),
            _ => false,
        }
    }
}

impl From<Address> for Value {
    fn from(a: Address) -> Self {
        Value::Address(a)
    }
}

impl From<BigInt> for Value {
    fn from(n: BigInt) -> Self {
        Value::Number(n)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(BigInt::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Address(a) => write!(f, "{a}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Placeholder => f.write_str("<pending>"),
        }
    }
}
