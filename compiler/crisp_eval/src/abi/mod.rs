//! Minimal EVM ABI codec.
//!
//! Enough to encode calls from a textual signature (`transfer(address,uint256)`)
//! and decode the static return value of a contract read.
//!
//! # Module Structure
//!
//! - `mod.rs`: parameter types and function fragments
//! - `encode.rs`: head/tail call encoding
//! - `decode.rs`: return value decoding

mod decode;
mod encode;

use std::fmt;

use crate::errors::{invalid, EvalResult};
use crate::value::keccak256;

/// A Solidity parameter type.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ParamType {
    Address,
    Bool,
    /// `uintN`, bits.
    Uint(u16),
    /// `intN`, bits.
    Int(u16),
    /// `bytesN`, length.
    FixedBytes(u8),
    Bytes,
    String,
    Array(Box<ParamType>),
}

impl ParamType {
    /// Parse a type, canonicalising `uint`/`int` to their 256-bit forms.
    pub fn parse(text: &str) -> EvalResult<Self> {
        let text = text.trim();
        if let Some(inner) = text.strip_suffix("[]") {
            return Ok(ParamType::Array(Box::new(ParamType::parse(inner)?)));
        }
        let ty = match text {
            "address" => ParamType::Address,
            "bool" => ParamType::Bool,
            "bytes" => ParamType::Bytes,
            "string" => ParamType::String,
            "uint" => ParamType::Uint(256),
            "int" => ParamType::Int(256),
            _ => {
                if let Some(bits) = text.strip_prefix("uint") {
                    ParamType::Uint(parse_bits(text, bits)?)
                } else if let Some(bits) = text.strip_prefix("int") {
                    ParamType::Int(parse_bits(text, bits)?)
                } else if let Some(len) = text.strip_prefix("bytes") {
                    match len.parse::<u8>() {
                        Ok(n @ 1..=32) => ParamType::FixedBytes(n),
                        _ => return Err(unknown_type(text)),
                    }
                } else {
                    return Err(unknown_type(text));
                }
            }
        };
        Ok(ty)
    }

    /// Whether the encoding lives in the tail.
    pub fn is_dynamic(&self) -> bool {
        matches!(
            self,
            ParamType::Bytes | ParamType::String | ParamType::Array(_)
        )
    }
}

fn parse_bits(text: &str, bits: &str) -> EvalResult<u16> {
    match bits.parse::<u16>() {
        Ok(n) if n > 0 && n <= 256 && n % 8 == 0 => Ok(n),
        _ => Err(unknown_type(text)),
    }
}

#[cold]
fn unknown_type(text: &str) -> crate::EvalError {
    invalid(format!("unknown ABI type `{text}`"))
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Address => f.write_str("address"),
            ParamType::Bool => f.write_str("bool"),
            ParamType::Uint(bits) => write!(f, "uint{bits}"),
            ParamType::Int(bits) => write!(f, "int{bits}"),
            ParamType::FixedBytes(n) => write!(f, "bytes{n}"),
            ParamType::Bytes => f.write_str("bytes"),
            ParamType::String => f.write_str("string"),
            ParamType::Array(inner) => write!(f, "{inner}[]"),
        }
    }
}

/// A parsed function signature.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FunctionFragment {
    pub name: String,
    pub inputs: Vec<ParamType>,
    /// Declared return types; a read without any decodes as `uint256`.
    pub outputs: Vec<ParamType>,
}

impl FunctionFragment {
    /// Parse `name(types)` with an optional `(types)` return group.
    pub fn parse(signature: &str) -> EvalResult<Self> {
        let signature = signature.trim();
        let open = signature
            .find('(')
            .ok_or_else(|| invalid(format!("`{signature}` is not a function signature")))?;
        let name = &signature[..open];
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(invalid(format!("invalid function name in `{signature}`")));
        }

        let (inputs, rest) = split_group(&signature[open..], signature)?;
        let outputs = if rest.is_empty() {
            Vec::new()
        } else {
            let (outputs, trailing) = split_group(rest, signature)?;
            if !trailing.is_empty() {
                return Err(invalid(format!("trailing text in `{signature}`")));
            }
            outputs
        };
        Ok(FunctionFragment {
            name: name.to_string(),
            inputs,
            outputs,
        })
    }

    /// `name(type,...)` with canonical type names.
    pub fn canonical(&self) -> String {
        let inputs: Vec<String> = self.inputs.iter().map(ToString::to_string).collect();
        format!("{}({})", self.name, inputs.join(","))
    }

    pub fn selector(&self) -> [u8; 4] {
        let hash = keccak256(self.canonical().as_bytes());
        [hash[0], hash[1], hash[2], hash[3]]
    }

    /// Selector followed by the encoded arguments.
    pub fn encode_call(&self, args: &[crate::Value]) -> EvalResult<Vec<u8>> {
        if args.len() != self.inputs.len() {
            return Err(invalid(format!(
                "`{}` takes {} parameter(s), {} given",
                self.canonical(),
                self.inputs.len(),
                args.len()
            )));
        }
        let mut out = self.selector().to_vec();
        out.extend(encode::encode_params(&self.inputs, args)?);
        Ok(out)
    }

    /// Decode the first return value of a read.
    pub fn decode_output(&self, data: &[u8]) -> EvalResult<crate::Value> {
        let ty = self.outputs.first().cloned().unwrap_or(ParamType::Uint(256));
        decode::decode_single(&ty, data)
    }
}

impl fmt::Display for FunctionFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// Split `(a,b)rest` into parsed types and `rest`.
fn split_group<'a>(text: &'a str, whole: &str) -> EvalResult<(Vec<ParamType>, &'a str)> {
    if !text.starts_with('(') {
        return Err(invalid(format!("trailing text in `{whole}`")));
    }
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    let inner = &text[1..i];
                    let types = split_top_level(inner)
                        .into_iter()
                        .filter(|t| !t.trim().is_empty())
                        .map(|t| ParamType::parse(strip_param_name(t)))
                        .collect::<EvalResult<Vec<_>>>()?;
                    return Ok((types, &text[i + 1..]));
                }
            }
            _ => {}
        }
    }
    Err(invalid(format!("unbalanced parentheses in `{whole}`")))
}

fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// `uint256 amount` -> `uint256`.
fn strip_param_name(param: &str) -> &str {
    let param = param.trim();
    param.split_whitespace().next().unwrap_or(param)
}
