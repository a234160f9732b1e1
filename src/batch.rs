//! Batch conversion over one register snapshot
//!
//! Applies a validated rule set to a snapshot, one decoder invocation per
//! rule. A single rule's failure never aborts the remaining rules: the raw
//! pass always yields exactly one result per rule, and the configured error
//! policy is applied afterwards over the result list.

use crate::decoder::decode_rule;
use crate::error::{ConvError, Result};
use crate::types::{ConversionResult, ConversionRule, DataKind, Value};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What to do with invalid results after a batch pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Fail the whole pass on the first invalid result
    StopOnError,
    /// Drop invalid results from the output
    SkipInvalid,
    /// Keep all results, substituting a type-appropriate default value
    #[default]
    DefaultValues,
}

/// Decode every rule against one snapshot
///
/// Always returns exactly one result per rule, in rule order.
pub fn convert_batch(rules: &[ConversionRule], snapshot: &[u16]) -> Vec<ConversionResult> {
    let results: Vec<ConversionResult> = rules
        .iter()
        .map(|rule| decode_rule(snapshot, rule))
        .collect();

    let invalid = results.iter().filter(|r| !r.valid).count();
    debug!(
        rules = rules.len(),
        registers = snapshot.len(),
        invalid,
        "batch conversion pass complete"
    );
    results
}

/// Apply an error policy over a batch result list
pub fn apply_policy(
    results: Vec<ConversionResult>,
    policy: ErrorPolicy,
    rules: &[ConversionRule],
) -> Result<Vec<ConversionResult>> {
    match policy {
        ErrorPolicy::StopOnError => {
            if let Some(bad) = results.iter().find(|r| !r.valid) {
                return Err(ConvError::BatchStopped {
                    rule: bad.name.clone(),
                    message: bad
                        .error
                        .clone()
                        .unwrap_or_else(|| "unknown error".to_string()),
                });
            }
            Ok(results)
        }
        ErrorPolicy::SkipInvalid => Ok(results.into_iter().filter(|r| r.valid).collect()),
        ErrorPolicy::DefaultValues => Ok(results
            .into_iter()
            .map(|mut result| {
                if !result.valid {
                    result.value = default_value(rules, &result.name);
                    result.valid = true;
                }
                result
            })
            .collect()),
    }
}

/// Convert a snapshot and apply the policy in one call
pub fn convert_with_policy(
    rules: &[ConversionRule],
    snapshot: &[u16],
    policy: ErrorPolicy,
) -> Result<Vec<ConversionResult>> {
    apply_policy(convert_batch(rules, snapshot), policy, rules)
}

/// Flatten results into a name -> value map for host output records
pub fn results_to_map(results: &[ConversionResult]) -> serde_json::Map<String, serde_json::Value> {
    results
        .iter()
        .map(|r| (r.name.clone(), serde_json::Value::from(r.value)))
        .collect()
}

fn default_value(rules: &[ConversionRule], name: &str) -> Value {
    match rules.iter().find(|r| r.name == name).map(|r| &r.kind) {
        Some(DataKind::Bitfield { .. }) => Value::Bool(false),
        Some(_) => Value::Number(0.0),
        None => Value::Null,
    }
}
