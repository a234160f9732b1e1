//! regconv - register conversion engine for industrial field devices
//!
//! Converts short arrays of 16-bit registers read from field devices into
//! typed engineering values according to a named set of conversion rules:
//! - signed/unsigned integers (16/32-bit) and IEEE-754 floats (32/64-bit)
//!   with configurable byte order and word swap
//! - scaled analog readings (`raw * scale + offset`)
//! - bit flags and multi-bit fields
//! - packed decimal (BCD)
//! - engineering-unit conversion from a fixed catalog
//!
//! # Usage
//!
//! ```text
//! ┌───────────┐  once   ┌───────────┐                ┌─────────────┐
//! │ rule set  │────────▶│ validator │         ┌─────▶│    batch    │
//! │ (config)  │         └───────────┘         │      │ orchestrator│
//! └───────────┘                               │      └──────┬──────┘
//! ┌───────────┐     per conversion pass       │             │ per rule
//! │ registers │─────────────────────────────┘        ┌──────▼──────┐
//! └───────────┘                                      │   decoder   │
//!                                                    └─────────────┘
//! ```
//!
//! Validate a rule set once, then reuse it across many snapshots. Each
//! batch pass yields exactly one [`ConversionResult`] per rule; a failing
//! rule never aborts the others.
//!
//! ```
//! use regconv::{
//!     convert_with_policy, validate_rules, ConversionRule, DataKind, ErrorPolicy,
//! };
//!
//! let rules = vec![
//!     ConversionRule::new("flow", 0, DataKind::Float32 { word_swap: false }),
//!     ConversionRule::new("status", 2, DataKind::Uint16),
//! ];
//! validate_rules(&rules).into_result()?;
//!
//! let snapshot = [0x41C8, 0x0000, 0x0003];
//! let results = convert_with_policy(&rules, &snapshot, ErrorPolicy::DefaultValues)?;
//! assert_eq!(results.len(), 2);
//! # Ok::<(), regconv::ConvError>(())
//! ```
//!
//! The engine is purely computational: no I/O, no async, no shared mutable
//! state. Independent passes over independent snapshots may run
//! concurrently.

mod batch;
pub mod bytes;
mod decoder;
mod encoder;
mod error;
mod types;
pub mod units;
mod validator;

// Re-export public API
pub use batch::{
    apply_policy, convert_batch, convert_with_policy, results_to_map, ErrorPolicy,
};
pub use bytes::ByteOrder;
pub use decoder::decode_rule;
pub use encoder::encode_rule;
pub use error::{ConvError, Result};
pub use types::{
    ConversionResult, ConversionRule, DataKind, RangeCheck, ResultMetadata, UnitConversion, Value,
};
pub use validator::{validate_rules, ValidationReport};
