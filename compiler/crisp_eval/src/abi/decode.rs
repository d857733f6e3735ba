//! Return value decoding for contract reads.

use num_bigint::{BigInt, Sign};

use super::ParamType;
use crate::errors::{unexpected_result, EvalResult};
use crate::value::{Address, Value};

const WORD: usize = 32;

fn word(data: &[u8], offset: usize) -> EvalResult<&[u8]> {
    data.get(offset..offset + WORD).ok_or_else(|| {
        unexpected_result(format!(
            "return data too short: {} byte(s), needed {}",
            data.len(),
            offset + WORD
        ))
    })
}

fn word_as_usize(data: &[u8], offset: usize) -> EvalResult<usize> {
    let w = word(data, offset)?;
    if w[..24].iter().any(|b| *b != 0) {
        return Err(unexpected_result("offset or length out of range"));
    }
    let mut low = [0u8; 8];
    low.copy_from_slice(&w[24..]);
    usize::try_from(u64::from_be_bytes(low))
        .map_err(|_| unexpected_result("offset or length out of range"))
}

/// Decode the value at the head of `data`.
pub(super) fn decode_single(ty: &ParamType, data: &[u8]) -> EvalResult<Value> {
    match ty {
        ParamType::Address => {
            let w = word(data, 0)?;
            let mut bytes = [0u8; 20];
            bytes.copy_from_slice(&w[12..]);
            Ok(Value::Address(Address::new(bytes)))
        }
        ParamType::Bool => Ok(Value::Bool(word(data, 0)?[31] != 0)),
        ParamType::Uint(_) => Ok(Value::Number(BigInt::from_bytes_be(
            Sign::Plus,
            word(data, 0)?,
        ))),
        ParamType::Int(_) => Ok(Value::Number(BigInt::from_signed_bytes_be(word(data, 0)?))),
        ParamType::FixedBytes(len) => {
            Ok(Value::Bytes(word(data, 0)?[..usize::from(*len)].to_vec()))
        }
        ParamType::Bytes | ParamType::String => {
            let offset = word_as_usize(data, 0)?;
            let len = word_as_usize(data, offset)?;
            let start = offset + WORD;
            let bytes = data
                .get(start..start + len)
                .ok_or_else(|| unexpected_result("dynamic return value truncated"))?
                .to_vec();
            if *ty == ParamType::Bytes {
                Ok(Value::Bytes(bytes))
            } else {
                String::from_utf8(bytes)
                    .map(Value::String)
                    .map_err(|_| unexpected_result("returned string is not UTF-8"))
            }
        }
        ParamType::Array(_) => Err(unexpected_result(format!(
            "decoding `{ty}` return values is not supported"
        ))),
    }
}
