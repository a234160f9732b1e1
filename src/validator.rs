//! Static rule set validation
//!
//! Checks a rule set once, before it is used against any snapshot. Problems
//! accumulate into a report rather than failing fast, so a configuration
//! author sees everything wrong in one pass. Errors block use of the rule
//! set; warnings do not.

use crate::error::{ConvError, Result};
use crate::types::{ConversionRule, DataKind};
use crate::units;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Outcome of validating a rule set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True when no blocking errors were found
    pub valid: bool,
    /// Blocking problems
    pub errors: Vec<String>,
    /// Non-blocking problems (suspicious but usable configuration)
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Convert the report into a `Result`, for callers that treat any
    /// validation error as fatal to the configuration step
    pub fn into_result(self) -> Result<()> {
        if self.valid {
            Ok(())
        } else {
            Err(ConvError::InvalidRuleSet {
                errors: self.errors,
            })
        }
    }
}

/// Validate a rule set
///
/// An empty rule set is itself an error. Register-window overlap is a
/// warning, never an error: overlapping rules may be intentional aliasing
/// (for example a bitfield view into a word that another rule reads whole).
pub fn validate_rules(rules: &[ConversionRule]) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if rules.is_empty() {
        errors.push("at least one rule required".to_string());
    }

    check_duplicate_names(rules, &mut errors);

    for rule in rules {
        check_rule(rule, &mut errors, &mut warnings);
    }

    check_overlaps(rules, &mut warnings);

    ValidationReport {
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}

fn check_duplicate_names(rules: &[ConversionRule], errors: &mut Vec<String>) {
    let mut seen: HashMap<String, &str> = HashMap::new();
    let mut duplicates = Vec::new();

    for rule in rules {
        let key = rule.name.trim().to_lowercase();
        if key.is_empty() {
            continue; // reported per-rule as an empty name
        }
        if let Some(first) = seen.get(key.as_str()) {
            duplicates.push(format!("'{}' / '{}'", first, rule.name));
        } else {
            seen.insert(key, rule.name.as_str());
        }
    }

    if !duplicates.is_empty() {
        errors.push(format!("duplicate rule names: {}", duplicates.join(", ")));
    }
}

fn check_rule(rule: &ConversionRule, errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    let name = rule.name.trim();
    if name.is_empty() {
        errors.push("rule with empty name".to_string());
        return;
    }

    match &rule.kind {
        DataKind::Bitfield {
            bit_mask,
            bit_position,
            bit_length,
        } => {
            if bit_mask.is_none() && bit_position.is_none() {
                errors.push(format!(
                    "rule '{name}': bitfield requires bit_mask or bit_position"
                ));
            }
            if let Some(pos) = bit_position {
                if *pos > 15 {
                    errors.push(format!(
                        "rule '{name}': bit_position {pos} outside 0-15"
                    ));
                }
            }
            if let Some(len) = bit_length {
                if *len == 0 || *len > 16 {
                    errors.push(format!(
                        "rule '{name}': bit_length {len} outside 1-16"
                    ));
                }
            }
        }
        DataKind::Scaled { scale, offset } => {
            if scale.is_none() && offset.is_none() {
                warnings.push(format!(
                    "rule '{name}': scaled type with neither scale nor offset (identity transform)"
                ));
            }
        }
        _ => {}
    }

    if let Some(places) = rule.decimal_places {
        if places > 10 {
            errors.push(format!(
                "rule '{name}': decimal_places {places} outside 0-10"
            ));
        }
    }

    if let Some(check) = &rule.validation {
        if check.enabled {
            if let (Some(min), Some(max)) = (check.min, check.max) {
                if min > max {
                    errors.push(format!(
                        "rule '{name}': validation min {min} greater than max {max}"
                    ));
                }
            }
        }
    }

    if let Some(unit) = &rule.unit {
        let from = unit.from.trim();
        let to = unit.to.trim();
        if from.is_empty() || to.is_empty() {
            errors.push(format!(
                "rule '{name}': unit conversion with missing from or to"
            ));
        } else if from.eq_ignore_ascii_case(to) {
            warnings.push(format!(
                "rule '{name}': unit conversion from '{from}' to itself"
            ));
        } else if !units::has_conversion(from, to) {
            warnings.push(format!(
                "rule '{name}': no conversion available from '{from}' to '{to}', value will pass through"
            ));
        }
    }
}

fn check_overlaps(rules: &[ConversionRule], warnings: &mut Vec<String>) {
    for (i, a) in rules.iter().enumerate() {
        let (a_start, a_end) = a.register_range();
        for b in rules.iter().skip(i + 1) {
            let (b_start, b_end) = b.register_range();
            if a_start <= b_end && b_start <= a_end {
                warnings.push(format!(
                    "rules '{}' and '{}' overlap on registers {}-{}",
                    a.name,
                    b.name,
                    a_start.max(b_start),
                    a_end.min(b_end)
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RangeCheck, UnitConversion};

    fn rule(name: &str, start: usize, kind: DataKind) -> ConversionRule {
        ConversionRule::new(name, start, kind)
    }

    #[test]
    fn test_valid_rule_set() {
        let rules = vec![
            rule("temp", 0, DataKind::Float32 { word_swap: false }),
            rule("status", 2, DataKind::Uint16),
        ];
        let report = validate_rules(&rules);
        assert!(report.valid, "{:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_empty_rule_set_is_error() {
        let report = validate_rules(&[]);
        assert!(!report.valid);
        assert!(report.errors[0].contains("at least one rule"));
    }

    #[test]
    fn test_duplicate_names_case_insensitive() {
        let rules = vec![
            rule("Temp", 0, DataKind::Uint16),
            rule(" temp ", 1, DataKind::Uint16),
        ];
        let report = validate_rules(&rules);
        assert!(!report.valid);
        assert!(report.errors[0].contains("duplicate rule names"));
        assert!(report.errors[0].contains("Temp"));
    }

    #[test]
    fn test_empty_name_is_error() {
        let rules = vec![rule("  ", 0, DataKind::Uint16)];
        let report = validate_rules(&rules);
        assert!(!report.valid);
        assert!(report.errors.iter().any(|e| e.contains("empty name")));
    }

    #[test]
    fn test_bitfield_bounds() {
        let mut rules = vec![rule(
            "flags",
            0,
            DataKind::Bitfield {
                bit_mask: None,
                bit_position: Some(16),
                bit_length: Some(17),
            },
        )];
        let report = validate_rules(&rules);
        assert_eq!(report.errors.len(), 2);

        rules[0].kind = DataKind::Bitfield {
            bit_mask: None,
            bit_position: None,
            bit_length: None,
        };
        let report = validate_rules(&rules);
        assert!(report
            .errors
            .iter()
            .any(|e| e.contains("requires bit_mask or bit_position")));
    }

    #[test]
    fn test_scaled_without_parameters_warns() {
        let rules = vec![rule(
            "raw",
            0,
            DataKind::Scaled {
                scale: None,
                offset: None,
            },
        )];
        let report = validate_rules(&rules);
        assert!(report.valid);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("neither scale nor offset"));
    }

    #[test]
    fn test_min_greater_than_max_is_error() {
        let mut r = rule("level", 0, DataKind::Uint16);
        r.validation = Some(RangeCheck {
            enabled: true,
            min: Some(10.0),
            max: Some(5.0),
            allow_nan: false,
        });
        let report = validate_rules(&[r]);
        assert!(!report.valid);
        assert!(report.errors[0].contains("min 10 greater than max 5"));
    }

    #[test]
    fn test_disabled_range_check_not_validated() {
        let mut r = rule("level", 0, DataKind::Uint16);
        r.validation = Some(RangeCheck {
            enabled: false,
            min: Some(10.0),
            max: Some(5.0),
            allow_nan: false,
        });
        assert!(validate_rules(&[r]).valid);
    }

    #[test]
    fn test_unit_conversion_checks() {
        let mut r = rule("temp", 0, DataKind::Int16);
        r.unit = Some(UnitConversion {
            from: "celsius".into(),
            to: "".into(),
        });
        let report = validate_rules(&[r.clone()]);
        assert!(!report.valid);
        assert!(report.errors[0].contains("missing from or to"));

        r.unit = Some(UnitConversion {
            from: "celsius".into(),
            to: "Celsius".into(),
        });
        let report = validate_rules(&[r.clone()]);
        assert!(report.valid);
        assert!(report.warnings[0].contains("to itself"));

        r.unit = Some(UnitConversion {
            from: "celsius".into(),
            to: "kpa".into(),
        });
        let report = validate_rules(&[r]);
        assert!(report.valid);
        assert!(report.warnings[0].contains("no conversion available"));
    }

    #[test]
    fn test_decimal_places_bounds() {
        let mut r = rule("v", 0, DataKind::Uint16);
        r.decimal_places = Some(11);
        let report = validate_rules(&[r]);
        assert!(!report.valid);
        assert!(report.errors[0].contains("decimal_places 11"));
    }

    #[test]
    fn test_overlap_is_warning_not_error() {
        // float32 at 0 spans registers 0-1; int16 at 1 aliases register 1
        let rules = vec![
            rule("flow", 0, DataKind::Float32 { word_swap: false }),
            rule("flow_lo", 1, DataKind::Int16),
        ];
        let report = validate_rules(&rules);
        assert!(report.valid);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("'flow' and 'flow_lo' overlap"));
    }

    #[test]
    fn test_adjacent_windows_do_not_overlap() {
        let rules = vec![
            rule("a", 0, DataKind::Float32 { word_swap: false }),
            rule("b", 2, DataKind::Uint16),
        ];
        let report = validate_rules(&rules);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_overlap_check_tolerates_extreme_start_register() {
        // register_range saturates instead of wrapping, so the overlap scan
        // stays well-defined for nonsense start registers
        let rules = vec![
            rule("way_out", usize::MAX, DataKind::Float32 { word_swap: false }),
            rule("normal", 0, DataKind::Uint16),
        ];
        let report = validate_rules(&rules);
        assert!(report.valid);
        assert!(report.warnings.is_empty());

        let (start, end) = rules[0].register_range();
        assert_eq!(start, usize::MAX);
        assert_eq!(end, usize::MAX);
    }

    #[test]
    fn test_into_result() {
        let rules = vec![rule("ok", 0, DataKind::Uint16)];
        assert!(validate_rules(&rules).into_result().is_ok());
        assert!(validate_rules(&[]).into_result().is_err());
    }
}
