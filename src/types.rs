//! Conversion rule model and result types
//!
//! Core types for rule-driven register conversion:
//! - ConversionRule: one named conversion over a register window
//! - DataKind: tagged per-data-type parameters (the compiler enforces which
//!   parameters a given data type carries)
//! - ConversionResult / Value: typed engineering value with metadata
//!
//! Rules are plain configuration data and round-trip through serde, so rule
//! sets can be shipped as JSON or YAML point tables.

use crate::bytes::ByteOrder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Rule model
// ============================================================================

/// One conversion rule: how to read a typed value out of a register window
///
/// A rule is effectively immutable configuration: validate a rule set once,
/// then reuse it across many register snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionRule {
    /// Unique rule name (case-insensitive within a rule set)
    pub name: String,

    /// Index of the first register this rule reads
    pub start_register: usize,

    /// Data type and its type-specific parameters
    #[serde(flatten)]
    pub kind: DataKind,

    /// Byte order for multi-register assembly (default: big-endian)
    #[serde(default)]
    pub byte_order: ByteOrder,

    /// Round the final numeric value to this many decimal places (0-10)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimal_places: Option<u8>,

    /// Optional range validation applied after decoding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<RangeCheck>,

    /// Optional engineering-unit conversion applied after decoding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<UnitConversion>,
}

impl ConversionRule {
    /// Minimal rule with default byte order and no post-processing
    pub fn new(name: impl Into<String>, start_register: usize, kind: DataKind) -> Self {
        Self {
            name: name.into(),
            start_register,
            kind,
            byte_order: ByteOrder::default(),
            decimal_places: None,
            validation: None,
            unit: None,
        }
    }

    /// Number of consecutive registers this rule consumes
    pub fn footprint(&self) -> usize {
        self.kind.footprint()
    }

    /// Inclusive register range `[start, start + footprint - 1]`
    ///
    /// Saturates rather than wrapping for out-of-range start registers.
    pub fn register_range(&self) -> (usize, usize) {
        let end = self.start_register.saturating_add(self.footprint() - 1);
        (self.start_register, end)
    }
}

/// Data type of a conversion rule, with its type-specific parameters
///
/// The `data_type` tag and parameter names follow the point-table schema
/// ("int16", "float32", ...). Multi-word types carry a `word_swap` flag;
/// single-word types have no use for one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "data_type", rename_all = "snake_case")]
pub enum DataKind {
    /// Single register reinterpreted as signed two's complement
    Int16,
    /// Single register, unsigned
    Uint16,
    /// Two registers assembled into a signed 32-bit integer
    Int32 {
        #[serde(default)]
        word_swap: bool,
    },
    /// Two registers assembled into an unsigned 32-bit integer
    Uint32 {
        #[serde(default)]
        word_swap: bool,
    },
    /// Two registers reinterpreted as IEEE-754 single precision
    Float32 {
        #[serde(default)]
        word_swap: bool,
    },
    /// Four registers reinterpreted as IEEE-754 double precision
    Float64 {
        #[serde(default)]
        word_swap: bool,
    },
    /// Single unsigned register through `raw * scale + offset`
    Scaled {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scale: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        offset: Option<f64>,
    },
    /// Bits extracted from a single register
    ///
    /// Either a literal `bit_mask`, or a `bit_position` (0-15) with
    /// `bit_length` (1-16, default 1). A 1-bit field decodes as a boolean.
    Bitfield {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bit_mask: Option<u16>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bit_position: Option<u8>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bit_length: Option<u8>,
    },
    /// Single register holding 4 packed decimal digits
    Bcd,
}

impl DataKind {
    /// Number of consecutive registers this data type consumes
    pub fn footprint(&self) -> usize {
        match self {
            Self::Int16 | Self::Uint16 | Self::Scaled { .. } | Self::Bitfield { .. } | Self::Bcd => 1,
            Self::Int32 { .. } | Self::Uint32 { .. } | Self::Float32 { .. } => 2,
            Self::Float64 { .. } => 4,
        }
    }

    /// Data type label as it appears in point tables
    pub fn label(&self) -> &'static str {
        match self {
            Self::Int16 => "int16",
            Self::Uint16 => "uint16",
            Self::Int32 { .. } => "int32",
            Self::Uint32 { .. } => "uint32",
            Self::Float32 { .. } => "float32",
            Self::Float64 { .. } => "float64",
            Self::Scaled { .. } => "scaled",
            Self::Bitfield { .. } => "bitfield",
            Self::Bcd => "bcd",
        }
    }

    /// Word-swap flag for multi-register assembly (false for 1-word types)
    pub fn word_swap(&self) -> bool {
        match self {
            Self::Int32 { word_swap }
            | Self::Uint32 { word_swap }
            | Self::Float32 { word_swap }
            | Self::Float64 { word_swap } => *word_swap,
            _ => false,
        }
    }
}

/// Range validation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeCheck {
    /// Whether the check is applied (default: true)
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Lower bound, inclusive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Upper bound, inclusive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Accept NaN float values (default: false)
    #[serde(default)]
    pub allow_nan: bool,
}

fn default_enabled() -> bool {
    true
}

/// Engineering-unit conversion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitConversion {
    /// Source unit name (e.g. "celsius")
    pub from: String,
    /// Target unit name (e.g. "fahrenheit")
    pub to: String,
}

// ============================================================================
// Result model
// ============================================================================

/// Decoded engineering value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Numeric value (all integer and float types decode to f64)
    Number(f64),
    /// Single-bit flag
    Bool(bool),
    /// No value (failed decode, or policy-substituted placeholder)
    Null,
}

impl Value {
    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Number(n) => serde_json::json!(n),
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Null => serde_json::Value::Null,
        }
    }
}

/// Outcome of applying one rule to one register snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Rule name
    pub name: String,
    /// Decoded value (null when the decode failed)
    pub value: Value,
    /// The raw register window actually consumed
    pub raw: Vec<u16>,
    /// Data type label of the rule
    pub data_type: String,
    /// Whether the decode (and any configured validation) succeeded
    pub valid: bool,
    /// Failure message when `valid` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Decode parameters and post-processing applied
    pub metadata: ResultMetadata,
}

/// How a result was produced
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultMetadata {
    /// Register layout used for assembly ("big_endian", "big_endian_swap", ...)
    pub byte_order: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,
    /// Applied unit conversion ("celsius -> fahrenheit"), or
    /// "no conversion available" when the catalog had no formula
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_conversion: Option<String>,
    /// When the conversion pass produced this result
    pub timestamp: Option<DateTime<Utc>>,
}
