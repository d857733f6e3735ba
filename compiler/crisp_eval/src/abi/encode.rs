//! Head/tail parameter encoding.

use num_bigint::{BigInt, Sign};
use num_traits::{One, Signed, Zero};

use super::ParamType;
use crate::errors::{invalid, type_mismatch, EvalResult};
use crate::value::Value;

const WORD: usize = 32;

pub(super) fn encode_params(types: &[ParamType], values: &[Value]) -> EvalResult<Vec<u8>> {
    let head_len = types.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();
    for (ty, value) in types.iter().zip(values) {
        if ty.is_dynamic() {
            head.extend(uint_word(&BigInt::from(head_len + tail.len()))?);
            tail.extend(encode_dynamic(ty, value)?);
        } else {
            head.extend(encode_static(ty, value)?);
        }
    }
    head.extend(tail);
    Ok(head)
}

fn encode_static(ty: &ParamType, value: &Value) -> EvalResult<[u8; WORD]> {
    if value.is_placeholder() {
        return Ok([0; WORD]);
    }
    match (ty, value) {
        (ParamType::Address, Value::Address(a)) => {
            let mut word = [0u8; WORD];
            word[12..].copy_from_slice(a.as_bytes());
            Ok(word)
        }
        (ParamType::Bool, Value::Bool(b)) => {
            let mut word = [0u8; WORD];
            word[31] = u8::from(*b);
            Ok(word)
        }
        (ParamType::Uint(bits), Value::Number(n)) => {
            if n.is_negative() || n.bits() > u64::from(*bits) {
                return Err(invalid(format!("{n} does not fit in uint{bits}")));
            }
            uint_word(n)
        }
        (ParamType::Int(bits), Value::Number(n)) => int_word(n, *bits),
        (ParamType::FixedBytes(len), Value::Bytes(b)) => {
            if b.len() > usize::from(*len) {
                return Err(invalid(format!(
                    "0x{} does not fit in bytes{len}",
                    hex::encode(b)
                )));
            }
            let mut word = [0u8; WORD];
            word[..b.len()].copy_from_slice(b);
            Ok(word)
        }
        _ => Err(type_mismatch("parameter", &ty.to_string(), value.type_name())),
    }
}

fn encode_dynamic(ty: &ParamType, value: &Value) -> EvalResult<Vec<u8>> {
    match (ty, value) {
        (_, Value::Placeholder) => Ok(uint_word(&BigInt::zero())?.to_vec()),
        (ParamType::Bytes, Value::Bytes(b)) => Ok(length_prefixed(b)),
        (ParamType::String, Value::String(s)) => Ok(length_prefixed(s.as_bytes())),
        (ParamType::Array(inner), Value::List(items)) => {
            let mut out = uint_word(&BigInt::from(items.len()))?.to_vec();
            let types = vec![(**inner).clone(); items.len()];
            out.extend(encode_params(&types, items)?);
            Ok(out)
        }
        _ => Err(type_mismatch("parameter", &ty.to_string(), value.type_name())),
    }
}

fn length_prefixed(data: &[u8]) -> Vec<u8> {
    let padded = data.len().div_ceil(WORD) * WORD;
    let mut out = Vec::with_capacity(WORD + padded);
    let mut len = [0u8; WORD];
    len[24..].copy_from_slice(&(data.len() as u64).to_be_bytes());
    out.extend(len);
    out.extend(data);
    out.resize(WORD + padded, 0);
    out
}

/// Big-endian unsigned word.
pub(crate) fn uint_word(n: &BigInt) -> EvalResult<[u8; WORD]> {
    let (sign, bytes) = n.to_bytes_be();
    if sign == Sign::Minus || bytes.len() > WORD {
        return Err(invalid(format!("{n} does not fit in 256 bits")));
    }
    let mut word = [0u8; WORD];
    word[WORD - bytes.len()..].copy_from_slice(&bytes);
    Ok(word)
}

/// Two's complement signed word.
fn int_word(n: &BigInt, bits: u16) -> EvalResult<[u8; WORD]> {
    let limit = BigInt::one() << (bits - 1);
    if n >= &limit || n < &-&limit {
        return Err(invalid(format!("{n} does not fit in int{bits}")));
    }
    let bytes = n.to_signed_bytes_be();
    let fill = if n.is_negative() { 0xff } else { 0 };
    let mut word = [fill; WORD];
    word[WORD - bytes.len()..].copy_from_slice(&bytes);
    Ok(word)
}
