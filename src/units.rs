//! Engineering unit catalog
//!
//! Fixed table of physical units grouped by category, plus directed
//! conversion formulas (`value * factor + offset`). Temperature formulas are
//! affine and tabulated explicitly in both directions; everything else is
//! purely multiplicative and tabulated one way, with the reverse direction
//! derived by inversion at lookup time.
//!
//! The catalog is process-wide immutable data: the tables are `static` and
//! the lookup index is built once behind a `Lazy`.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Physical category of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Temperature,
    Pressure,
    Flow,
    Power,
    Energy,
    Speed,
    Volume,
    Length,
    Mass,
    Electrical,
}

struct UnitDef {
    name: &'static str,
    category: Category,
}

struct Formula {
    from: &'static str,
    to: &'static str,
    factor: f64,
    offset: f64,
}

static UNITS: &[UnitDef] = &[
    UnitDef { name: "celsius", category: Category::Temperature },
    UnitDef { name: "fahrenheit", category: Category::Temperature },
    UnitDef { name: "kelvin", category: Category::Temperature },
    UnitDef { name: "pa", category: Category::Pressure },
    UnitDef { name: "kpa", category: Category::Pressure },
    UnitDef { name: "mpa", category: Category::Pressure },
    UnitDef { name: "bar", category: Category::Pressure },
    UnitDef { name: "psi", category: Category::Pressure },
    UnitDef { name: "m3_h", category: Category::Flow },
    UnitDef { name: "l_min", category: Category::Flow },
    UnitDef { name: "l_s", category: Category::Flow },
    UnitDef { name: "gpm", category: Category::Flow },
    UnitDef { name: "w", category: Category::Power },
    UnitDef { name: "kw", category: Category::Power },
    UnitDef { name: "mw", category: Category::Power },
    UnitDef { name: "hp", category: Category::Power },
    UnitDef { name: "btu_h", category: Category::Power },
    UnitDef { name: "wh", category: Category::Energy },
    UnitDef { name: "kwh", category: Category::Energy },
    UnitDef { name: "mwh", category: Category::Energy },
    UnitDef { name: "mj", category: Category::Energy },
    UnitDef { name: "j", category: Category::Energy },
    UnitDef { name: "btu", category: Category::Energy },
    UnitDef { name: "m_s", category: Category::Speed },
    UnitDef { name: "km_h", category: Category::Speed },
    UnitDef { name: "mph", category: Category::Speed },
    UnitDef { name: "ft_s", category: Category::Speed },
    UnitDef { name: "ml", category: Category::Volume },
    UnitDef { name: "l", category: Category::Volume },
    UnitDef { name: "m3", category: Category::Volume },
    UnitDef { name: "ft3", category: Category::Volume },
    UnitDef { name: "gal", category: Category::Volume },
    UnitDef { name: "mm", category: Category::Length },
    UnitDef { name: "m", category: Category::Length },
    UnitDef { name: "km", category: Category::Length },
    UnitDef { name: "in", category: Category::Length },
    UnitDef { name: "ft", category: Category::Length },
    UnitDef { name: "mi", category: Category::Length },
    UnitDef { name: "g", category: Category::Mass },
    UnitDef { name: "kg", category: Category::Mass },
    UnitDef { name: "t", category: Category::Mass },
    UnitDef { name: "lb", category: Category::Mass },
    UnitDef { name: "oz", category: Category::Mass },
    UnitDef { name: "mv", category: Category::Electrical },
    UnitDef { name: "v", category: Category::Electrical },
    UnitDef { name: "kv", category: Category::Electrical },
    UnitDef { name: "ma", category: Category::Electrical },
    UnitDef { name: "a", category: Category::Electrical },
    UnitDef { name: "ka", category: Category::Electrical },
];

// Affine temperature pairs carry a nonzero offset, so the divide-by-f(1)
// inversion fallback is not sound for them; both directions are explicit.
static FORMULAS: &[Formula] = &[
    // Temperature (affine, explicit in both directions)
    Formula { from: "celsius", to: "fahrenheit", factor: 1.8, offset: 32.0 },
    Formula { from: "fahrenheit", to: "celsius", factor: 5.0 / 9.0, offset: -160.0 / 9.0 },
    Formula { from: "celsius", to: "kelvin", factor: 1.0, offset: 273.15 },
    Formula { from: "kelvin", to: "celsius", factor: 1.0, offset: -273.15 },
    Formula { from: "fahrenheit", to: "kelvin", factor: 5.0 / 9.0, offset: 459.67 * 5.0 / 9.0 },
    Formula { from: "kelvin", to: "fahrenheit", factor: 1.8, offset: -459.67 },
    // Pressure
    Formula { from: "bar", to: "kpa", factor: 100.0, offset: 0.0 },
    Formula { from: "bar", to: "psi", factor: 14.5038, offset: 0.0 },
    Formula { from: "kpa", to: "psi", factor: 0.145038, offset: 0.0 },
    Formula { from: "mpa", to: "bar", factor: 10.0, offset: 0.0 },
    Formula { from: "pa", to: "kpa", factor: 0.001, offset: 0.0 },
    // Flow
    Formula { from: "m3_h", to: "l_min", factor: 1000.0 / 60.0, offset: 0.0 },
    Formula { from: "l_s", to: "m3_h", factor: 3.6, offset: 0.0 },
    Formula { from: "gpm", to: "l_min", factor: 3.78541, offset: 0.0 },
    // Power
    Formula { from: "kw", to: "w", factor: 1000.0, offset: 0.0 },
    Formula { from: "mw", to: "kw", factor: 1000.0, offset: 0.0 },
    Formula { from: "kw", to: "hp", factor: 1.34102, offset: 0.0 },
    Formula { from: "w", to: "btu_h", factor: 3.41214, offset: 0.0 },
    // Energy
    Formula { from: "kwh", to: "mj", factor: 3.6, offset: 0.0 },
    Formula { from: "mwh", to: "kwh", factor: 1000.0, offset: 0.0 },
    Formula { from: "kwh", to: "btu", factor: 3412.14, offset: 0.0 },
    Formula { from: "wh", to: "j", factor: 3600.0, offset: 0.0 },
    // Speed
    Formula { from: "m_s", to: "km_h", factor: 3.6, offset: 0.0 },
    Formula { from: "m_s", to: "mph", factor: 2.23694, offset: 0.0 },
    Formula { from: "km_h", to: "mph", factor: 0.621371, offset: 0.0 },
    Formula { from: "m_s", to: "ft_s", factor: 3.28084, offset: 0.0 },
    // Volume
    Formula { from: "m3", to: "l", factor: 1000.0, offset: 0.0 },
    Formula { from: "l", to: "ml", factor: 1000.0, offset: 0.0 },
    Formula { from: "l", to: "gal", factor: 0.264172, offset: 0.0 },
    Formula { from: "m3", to: "ft3", factor: 35.3147, offset: 0.0 },
    // Length
    Formula { from: "m", to: "ft", factor: 3.28084, offset: 0.0 },
    Formula { from: "m", to: "in", factor: 39.3701, offset: 0.0 },
    Formula { from: "mm", to: "in", factor: 0.0393701, offset: 0.0 },
    Formula { from: "km", to: "mi", factor: 0.621371, offset: 0.0 },
    // Mass
    Formula { from: "kg", to: "lb", factor: 2.20462, offset: 0.0 },
    Formula { from: "kg", to: "g", factor: 1000.0, offset: 0.0 },
    Formula { from: "t", to: "kg", factor: 1000.0, offset: 0.0 },
    Formula { from: "g", to: "oz", factor: 0.035274, offset: 0.0 },
    // Electrical
    Formula { from: "v", to: "mv", factor: 1000.0, offset: 0.0 },
    Formula { from: "kv", to: "v", factor: 1000.0, offset: 0.0 },
    Formula { from: "a", to: "ma", factor: 1000.0, offset: 0.0 },
    Formula { from: "ka", to: "a", factor: 1000.0, offset: 0.0 },
];

static FORMULA_INDEX: Lazy<HashMap<(&'static str, &'static str), &'static Formula>> =
    Lazy::new(|| {
        FORMULAS
            .iter()
            .map(|f| ((f.from, f.to), f))
            .collect()
    });

static UNIT_INDEX: Lazy<HashMap<&'static str, Category>> =
    Lazy::new(|| UNITS.iter().map(|u| (u.name, u.category)).collect());

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Whether the catalog knows this unit name
pub fn is_known_unit(name: &str) -> bool {
    UNIT_INDEX.contains_key(normalize(name).as_str())
}

/// Physical category of a unit, if known
pub fn category_of(name: &str) -> Option<Category> {
    UNIT_INDEX.get(normalize(name).as_str()).copied()
}

/// Whether `convert` would produce a value for this pair
pub fn has_conversion(from: &str, to: &str) -> bool {
    let (from, to) = (normalize(from), normalize(to));
    if from == to {
        return true;
    }
    if FORMULA_INDEX.contains_key(&(from.as_str(), to.as_str())) {
        return true;
    }
    // Reverse inversion only applies to zero-offset multiplicative formulas
    FORMULA_INDEX
        .get(&(to.as_str(), from.as_str()))
        .is_some_and(|f| f.offset == 0.0)
}

/// Convert a value between two named units
///
/// Lookup order: exact `{from, to}` formula; else the reverse `{to, from}`
/// entry inverted by evaluating it at 1 and dividing (zero-offset
/// multiplicative formulas only). Returns `None` when no conversion is
/// available; callers pass the value through unchanged in that case.
pub fn convert(value: f64, from: &str, to: &str) -> Option<f64> {
    let (from, to) = (normalize(from), normalize(to));
    if from == to {
        return Some(value);
    }

    if let Some(f) = FORMULA_INDEX.get(&(from.as_str(), to.as_str())) {
        return Some(value * f.factor + f.offset);
    }

    if let Some(f) = FORMULA_INDEX.get(&(to.as_str(), from.as_str())) {
        if f.offset == 0.0 {
            let unit_rate = f.factor * 1.0 + f.offset;
            return Some(value / unit_rate);
        }
    }

    None
}
