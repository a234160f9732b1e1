//! Value-to-register encoding
//!
//! Inverse of the decoder: turns an engineering value back into the register
//! words a rule describes, for callers that write setpoints to a device.
//! Scaled rules invert the affine transform first; multi-word types place
//! words under the rule's byte order and word swap.
//!
//! Bitfield rules are not encodable here: writing a sub-word field needs a
//! read-modify-write of the current register, which belongs to the
//! transport layer.

use crate::bytes;
use crate::error::{ConvError, Result};
use crate::types::{ConversionRule, DataKind, Value};

/// Encode an engineering value into the register words for a rule
///
/// The returned vector has exactly the rule's footprint. Out-of-range and
/// non-numeric inputs produce an error rather than wrapping silently.
pub fn encode_rule(rule: &ConversionRule, value: &Value) -> Result<Vec<u16>> {
    let order = rule.byte_order;
    let swap = rule.kind.word_swap();

    match &rule.kind {
        DataKind::Int16 => {
            let n = numeric(rule, value)?.round();
            check_range(rule, n, f64::from(i16::MIN), f64::from(i16::MAX))?;
            Ok(vec![(n as i16) as u16])
        }
        DataKind::Uint16 => {
            let n = numeric(rule, value)?.round();
            check_range(rule, n, 0.0, f64::from(u16::MAX))?;
            Ok(vec![n as u16])
        }
        DataKind::Int32 { .. } => {
            let n = numeric(rule, value)?.round();
            check_range(rule, n, f64::from(i32::MIN), f64::from(i32::MAX))?;
            let bytes = (n as i32).to_be_bytes();
            Ok(bytes::bytes_4_to_regs(&bytes, order, swap).to_vec())
        }
        DataKind::Uint32 { .. } => {
            let n = numeric(rule, value)?.round();
            check_range(rule, n, 0.0, f64::from(u32::MAX))?;
            let bytes = (n as u32).to_be_bytes();
            Ok(bytes::bytes_4_to_regs(&bytes, order, swap).to_vec())
        }
        DataKind::Float32 { .. } => {
            let n = numeric(rule, value)?;
            let bytes = (n as f32).to_be_bytes();
            Ok(bytes::bytes_4_to_regs(&bytes, order, swap).to_vec())
        }
        DataKind::Float64 { .. } => {
            let n = numeric(rule, value)?;
            let bytes = n.to_be_bytes();
            Ok(bytes::bytes_8_to_regs(&bytes, order, swap).to_vec())
        }
        DataKind::Scaled { scale, offset } => {
            let scale = scale.unwrap_or(1.0);
            if scale == 0.0 {
                return Err(unencodable(rule, value, "scale factor is zero"));
            }
            let n = numeric(rule, value)?;
            let raw = ((n - offset.unwrap_or(0.0)) / scale).round();
            check_range(rule, raw, 0.0, f64::from(u16::MAX))?;
            Ok(vec![raw as u16])
        }
        DataKind::Bcd => {
            let n = numeric(rule, value)?.round();
            check_range(rule, n, 0.0, 9999.0)?;
            let packed = bytes::u16_to_bcd(n as u16)
                .ok_or_else(|| unencodable(rule, value, "does not fit in 4 BCD digits"))?;
            Ok(vec![packed])
        }
        DataKind::Bitfield { .. } => Err(unencodable(
            rule,
            value,
            "bitfield write requires read-modify-write of the current word",
        )),
    }
}

fn numeric(rule: &ConversionRule, value: &Value) -> Result<f64> {
    match value {
        Value::Number(n) if n.is_finite() => Ok(*n),
        Value::Number(_) => Err(unencodable(rule, value, "not a finite number")),
        // Device conventions encode flags as 0/1 words
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Null => Err(unencodable(rule, value, "null has no register image")),
    }
}

fn check_range(rule: &ConversionRule, n: f64, min: f64, max: f64) -> Result<()> {
    if n < min || n > max {
        return Err(unencodable(
            rule,
            &Value::Number(n),
            format!("outside {min}..={max}"),
        ));
    }
    Ok(())
}

fn unencodable(rule: &ConversionRule, value: &Value, reason: impl Into<String>) -> ConvError {
    ConvError::Unencodable {
        data_type: rule.kind.label(),
        value: format!("{value:?}"),
        reason: reason.into(),
    }
}
