//! Rule-driven register decoding
//!
//! Pure mapping from (register snapshot, rule) to a typed engineering value.
//! Decoding never panics and never returns `Err` to the caller: every
//! failure is captured into the rule's `ConversionResult` so one bad rule
//! cannot abort a batch.

use crate::bytes;
use crate::error::{ConvError, Result};
use crate::types::{ConversionResult, ConversionRule, DataKind, ResultMetadata, Value};
use crate::units;
use chrono::Utc;
use tracing::{debug, trace, warn};

/// Apply one rule to one register snapshot
pub fn decode_rule(snapshot: &[u16], rule: &ConversionRule) -> ConversionResult {
    let footprint = rule.footprint();
    let mut metadata = base_metadata(rule);

    // checked_add: start_register is unbounded deserialized data, and a
    // wrapped sum would slip past the length guard
    let needed = match rule.start_register.checked_add(footprint) {
        Some(end) if snapshot.len() >= end => end,
        _ => {
            let err = ConvError::InsufficientRegisters {
                rule: rule.name.clone(),
                start: rule.start_register,
                required: footprint,
                available: snapshot.len(),
            };
            debug!(rule = %rule.name, "decode failed: {err}");
            return failed(rule, Vec::new(), metadata, &err);
        }
    };

    let window = snapshot[rule.start_register..needed].to_vec();
    let decoded =
        decode_window(&window, rule).and_then(|v| post_process(v, rule, &mut metadata));

    match decoded {
        Ok(value) => {
            trace!(rule = %rule.name, ?value, "decoded");
            ConversionResult {
                name: rule.name.clone(),
                value,
                raw: window,
                data_type: rule.kind.label().to_string(),
                valid: true,
                error: None,
                metadata,
            }
        }
        Err(err) => {
            debug!(rule = %rule.name, "decode failed: {err}");
            failed(rule, window, metadata, &err)
        }
    }
}

fn base_metadata(rule: &ConversionRule) -> ResultMetadata {
    let (scale, offset) = match rule.kind {
        DataKind::Scaled { scale, offset } => (scale, offset),
        _ => (None, None),
    };
    ResultMetadata {
        byte_order: rule.byte_order.label(rule.kind.word_swap()).to_string(),
        scale,
        offset,
        unit_conversion: None,
        timestamp: Some(Utc::now()),
    }
}

fn failed(
    rule: &ConversionRule,
    raw: Vec<u16>,
    metadata: ResultMetadata,
    err: &ConvError,
) -> ConversionResult {
    ConversionResult {
        name: rule.name.clone(),
        value: Value::Null,
        raw,
        data_type: rule.kind.label().to_string(),
        valid: false,
        error: Some(err.to_string()),
        metadata,
    }
}

/// Bit-exact reinterpretation of the register window by data type
fn decode_window(window: &[u16], rule: &ConversionRule) -> Result<Value> {
    let order = rule.byte_order;
    let swap = rule.kind.word_swap();

    let value = match &rule.kind {
        DataKind::Int16 => Value::Number(f64::from(bytes::reg_to_i16(window[0]))),
        DataKind::Uint16 => Value::Number(f64::from(window[0])),
        DataKind::Int32 { .. } => {
            let regs = [window[0], window[1]];
            Value::Number(f64::from(bytes::regs_to_i32(&regs, order, swap)))
        }
        DataKind::Uint32 { .. } => {
            let regs = [window[0], window[1]];
            Value::Number(f64::from(bytes::regs_to_u32(&regs, order, swap)))
        }
        DataKind::Float32 { .. } => {
            let regs = [window[0], window[1]];
            Value::Number(f64::from(bytes::regs_to_f32(&regs, order, swap)))
        }
        DataKind::Float64 { .. } => {
            let regs = [window[0], window[1], window[2], window[3]];
            Value::Number(bytes::regs_to_f64(&regs, order, swap))
        }
        DataKind::Scaled { scale, offset } => {
            // Raw word stays unsigned here; signed scaled inputs should use
            // int16 plus a downstream transform instead.
            let raw = f64::from(window[0]);
            Value::Number(raw * scale.unwrap_or(1.0) + offset.unwrap_or(0.0))
        }
        DataKind::Bitfield {
            bit_mask,
            bit_position,
            bit_length,
        } => decode_bitfield(window[0], *bit_mask, *bit_position, *bit_length),
        DataKind::Bcd => {
            let word = window[0];
            let decimal = bytes::bcd_to_u16(word).ok_or(ConvError::InvalidBcd { word })?;
            Value::Number(f64::from(decimal))
        }
    };

    Ok(value)
}

fn decode_bitfield(
    word: u16,
    bit_mask: Option<u16>,
    bit_position: Option<u8>,
    bit_length: Option<u8>,
) -> Value {
    if let Some(mask) = bit_mask {
        return Value::Number(f64::from(word & mask));
    }
    if let Some(position) = bit_position {
        // The validator bounds position and length; stay total anyway for
        // rule sets that skipped validation
        let length = bit_length.unwrap_or(1).min(16);
        let mask = ((1u32 << length) - 1) as u16;
        let extracted = word.checked_shr(u32::from(position)).unwrap_or(0) & mask;
        if length == 1 {
            return Value::Bool(extracted != 0);
        }
        return Value::Number(f64::from(extracted));
    }
    // The validator rejects this shape; stay total for unvalidated rule
    // sets and decode the whole word unchanged
    Value::Number(f64::from(word))
}

/// Unit conversion, rounding and range validation, in that order
fn post_process(
    value: Value,
    rule: &ConversionRule,
    metadata: &mut ResultMetadata,
) -> Result<Value> {
    let mut value = value;

    if let (Some(unit), Some(n)) = (&rule.unit, value.as_f64()) {
        match units::convert(n, &unit.from, &unit.to) {
            Some(converted) => {
                metadata.unit_conversion = Some(format!("{} -> {}", unit.from, unit.to));
                value = Value::Number(converted);
            }
            None => {
                warn!(
                    rule = %rule.name,
                    from = %unit.from,
                    to = %unit.to,
                    "no unit conversion available, passing value through"
                );
                metadata.unit_conversion = Some("no conversion available".to_string());
            }
        }
    }

    if let (Some(places), Some(n)) = (rule.decimal_places, value.as_f64()) {
        value = Value::Number(round_places(n, places));
    }

    if let Some(check) = &rule.validation {
        if check.enabled {
            if let Some(n) = value.as_f64() {
                if n.is_nan() {
                    if !check.allow_nan {
                        return Err(ConvError::NanRejected);
                    }
                } else if check.min.is_some_and(|min| n < min)
                    || check.max.is_some_and(|max| n > max)
                {
                    return Err(ConvError::OutOfRange {
                        value: n,
                        min: check.min.unwrap_or(f64::NEG_INFINITY),
                        max: check.max.unwrap_or(f64::INFINITY),
                    });
                }
            }
        }
    }

    Ok(value)
}

/// Round half away from zero to a fixed number of decimal places
fn round_places(value: f64, places: u8) -> f64 {
    let pow = 10f64.powi(i32::from(places));
    (value * pow).round() / pow
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytes::ByteOrder;
    use crate::types::{RangeCheck, UnitConversion};

    fn rule(name: &str, start: usize, kind: DataKind) -> ConversionRule {
        ConversionRule::new(name, start, kind)
    }

    #[test]
    fn test_int16_twos_complement() {
        let r = rule("t", 0, DataKind::Int16);
        assert_eq!(decode_rule(&[0x0000], &r).value, Value::Number(0.0));
        assert_eq!(decode_rule(&[0x7FFF], &r).value, Value::Number(32767.0));
        assert_eq!(decode_rule(&[0x8000], &r).value, Value::Number(-32768.0));
        assert_eq!(decode_rule(&[0xFFFF], &r).value, Value::Number(-1.0));
        // w > 32767 decodes as w - 65536
        assert_eq!(
            decode_rule(&[40000], &r).value,
            Value::Number(40000.0 - 65536.0)
        );
    }

    #[test]
    fn test_uint16() {
        let r = rule("u", 0, DataKind::Uint16);
        assert_eq!(decode_rule(&[0xFFFF], &r).value, Value::Number(65535.0));
        assert_eq!(decode_rule(&[42], &r).value, Value::Number(42.0));
    }

    #[test]
    fn test_int32_negative() {
        // 0xFFFFFFFE = -2
        let r = rule("i", 0, DataKind::Int32 { word_swap: false });
        let result = decode_rule(&[0xFFFF, 0xFFFE], &r);
        assert_eq!(result.value, Value::Number(-2.0));
        assert_eq!(result.raw, vec![0xFFFF, 0xFFFE]);
    }

    #[test]
    fn test_uint32_layouts() {
        let snapshot = [0x1234, 0x5678];

        let mut r = rule("u", 0, DataKind::Uint32 { word_swap: false });
        assert_eq!(
            decode_rule(&snapshot, &r).value,
            Value::Number(f64::from(0x12345678u32))
        );

        r.kind = DataKind::Uint32 { word_swap: true };
        assert_eq!(
            decode_rule(&snapshot, &r).value,
            Value::Number(f64::from(0x56781234u32))
        );

        r.kind = DataKind::Uint32 { word_swap: false };
        r.byte_order = ByteOrder::LittleEndian;
        assert_eq!(
            decode_rule(&snapshot, &r).value,
            Value::Number(f64::from(0x78563412u32))
        );

        r.kind = DataKind::Uint32 { word_swap: true };
        assert_eq!(
            decode_rule(&snapshot, &r).value,
            Value::Number(f64::from(0x34127856u32))
        );
    }

    #[test]
    fn test_float32_roundtrip() {
        let bits = 123.456f32.to_be_bytes();
        let snapshot = [
            u16::from_be_bytes([bits[0], bits[1]]),
            u16::from_be_bytes([bits[2], bits[3]]),
        ];
        let r = rule("f", 0, DataKind::Float32 { word_swap: false });
        let value = decode_rule(&snapshot, &r).value.as_f64().unwrap();
        assert!((value - f64::from(123.456f32)).abs() < 1e-9);
    }

    #[test]
    fn test_float64() {
        let bits = (-9876.54321f64).to_be_bytes();
        let snapshot: Vec<u16> = bits
            .chunks(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        let r = rule("d", 0, DataKind::Float64 { word_swap: false });
        let value = decode_rule(&snapshot, &r).value.as_f64().unwrap();
        assert!((value - (-9876.54321)).abs() < 1e-9);
    }

    #[test]
    fn test_scaled_treats_word_as_unsigned() {
        let mut r = rule(
            "s",
            0,
            DataKind::Scaled {
                scale: Some(0.1),
                offset: Some(-40.0),
            },
        );
        r.decimal_places = Some(1);
        let result = decode_rule(&[0xFFFF], &r);
        // 65535 * 0.1 - 40, not -1 * 0.1 - 40
        assert_eq!(result.value, Value::Number(6513.5));
        assert_eq!(result.metadata.scale, Some(0.1));
        assert_eq!(result.metadata.offset, Some(-40.0));
    }

    #[test]
    fn test_scaled_defaults_to_identity() {
        let r = rule(
            "s",
            0,
            DataKind::Scaled {
                scale: None,
                offset: None,
            },
        );
        assert_eq!(decode_rule(&[123], &r).value, Value::Number(123.0));
    }

    #[test]
    fn test_bitfield_mask() {
        let r = rule(
            "b",
            0,
            DataKind::Bitfield {
                bit_mask: Some(0x00F0),
                bit_position: None,
                bit_length: None,
            },
        );
        assert_eq!(decode_rule(&[0x12AB], &r).value, Value::Number(0x00A0 as f64));
    }

    #[test]
    fn test_bitfield_single_bit_is_boolean() {
        let r = rule(
            "b",
            0,
            DataKind::Bitfield {
                bit_mask: None,
                bit_position: Some(3),
                bit_length: None,
            },
        );
        assert_eq!(decode_rule(&[0b0000_1000], &r).value, Value::Bool(true));
        assert_eq!(decode_rule(&[0b0000_0100], &r).value, Value::Bool(false));
    }

    #[test]
    fn test_bitfield_multi_bit() {
        let r = rule(
            "b",
            0,
            DataKind::Bitfield {
                bit_mask: None,
                bit_position: Some(4),
                bit_length: Some(4),
            },
        );
        assert_eq!(decode_rule(&[0x12AB], &r).value, Value::Number(0xA as f64));
    }

    #[test]
    fn test_bitfield_full_width() {
        let r = rule(
            "b",
            0,
            DataKind::Bitfield {
                bit_mask: None,
                bit_position: Some(0),
                bit_length: Some(16),
            },
        );
        assert_eq!(decode_rule(&[0xBEEF], &r).value, Value::Number(0xBEEF as f64));
    }

    #[test]
    fn test_bcd_decode() {
        let r = rule("b", 0, DataKind::Bcd);
        assert_eq!(decode_rule(&[0x1234], &r).value, Value::Number(1234.0));
        assert_eq!(decode_rule(&[0x0000], &r).value, Value::Number(0.0));
    }

    #[test]
    fn test_bcd_invalid_nibble_is_error() {
        let r = rule("b", 0, DataKind::Bcd);
        let result = decode_rule(&[0x12F4], &r);
        assert!(!result.valid);
        assert_eq!(result.value, Value::Null);
        assert!(result.error.unwrap().contains("invalid BCD"));
    }

    #[test]
    fn test_insufficient_registers() {
        let r = rule("f", 3, DataKind::Float32 { word_swap: false });
        let result = decode_rule(&[1, 2, 3, 4], &r);
        assert!(!result.valid);
        assert!(result.raw.is_empty());
        let message = result.error.unwrap();
        assert!(message.contains("need 2 starting at 3"));
        assert!(message.contains("has 4"));
    }

    #[test]
    fn test_start_register_overflow_is_insufficient_registers() {
        // start + footprint must not wrap past the length guard
        let r = rule("f", usize::MAX, DataKind::Float32 { word_swap: false });
        let result = decode_rule(&[1, 2, 3], &r);
        assert!(!result.valid);
        assert_eq!(result.value, Value::Null);
        assert!(result
            .error
            .unwrap()
            .contains("insufficient registers"));

        let r = rule("u", usize::MAX, DataKind::Uint16);
        let result = decode_rule(&[1, 2, 3], &r);
        assert!(!result.valid);
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        // 1.25 and 2.5 are exact in binary, so they sit exactly on the
        // midpoint and must round away from zero
        assert_eq!(round_places(1.25, 1), 1.3);
        assert_eq!(round_places(-1.25, 1), -1.3);
        assert_eq!(round_places(2.5, 0), 3.0);
        assert_eq!(round_places(-2.5, 0), -3.0);
        assert_eq!(round_places(1.0049, 2), 1.0);
    }

    #[test]
    fn test_range_validation() {
        let mut r = rule("v", 0, DataKind::Uint16);
        r.validation = Some(RangeCheck {
            enabled: true,
            min: Some(10.0),
            max: Some(100.0),
            allow_nan: false,
        });

        assert!(decode_rule(&[50], &r).valid);

        let low = decode_rule(&[5], &r);
        assert!(!low.valid);
        assert!(low.error.unwrap().contains("outside configured range"));

        let high = decode_rule(&[101], &r);
        assert!(!high.valid);
    }

    #[test]
    fn test_nan_rejected_unless_allowed() {
        // 0x7FC00000 is a quiet NaN
        let snapshot = [0x7FC0, 0x0000];
        let mut r = rule("f", 0, DataKind::Float32 { word_swap: false });
        r.validation = Some(RangeCheck {
            enabled: true,
            min: None,
            max: None,
            allow_nan: false,
        });
        let result = decode_rule(&snapshot, &r);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("NaN"));

        r.validation = Some(RangeCheck {
            enabled: true,
            min: None,
            max: None,
            allow_nan: true,
        });
        let result = decode_rule(&snapshot, &r);
        assert!(result.valid);
        assert!(result.value.as_f64().unwrap().is_nan());
    }

    #[test]
    fn test_unit_conversion_applied() {
        let mut r = rule("t", 0, DataKind::Int16);
        r.unit = Some(UnitConversion {
            from: "celsius".into(),
            to: "fahrenheit".into(),
        });
        let result = decode_rule(&[25], &r);
        assert_eq!(result.value, Value::Number(77.0));
        assert_eq!(
            result.metadata.unit_conversion.as_deref(),
            Some("celsius -> fahrenheit")
        );
    }

    #[test]
    fn test_unit_conversion_unavailable_passes_through() {
        let mut r = rule("t", 0, DataKind::Int16);
        r.unit = Some(UnitConversion {
            from: "celsius".into(),
            to: "gpm".into(),
        });
        let result = decode_rule(&[25], &r);
        assert!(result.valid);
        assert_eq!(result.value, Value::Number(25.0));
        assert_eq!(
            result.metadata.unit_conversion.as_deref(),
            Some("no conversion available")
        );
    }

    #[test]
    fn test_metadata_byte_order_label() {
        let mut r = rule("u", 0, DataKind::Uint32 { word_swap: true });
        r.byte_order = ByteOrder::BigEndian;
        let result = decode_rule(&[0, 1], &r);
        assert_eq!(result.metadata.byte_order, "big_endian_swap");
    }
}
