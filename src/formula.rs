//! Translation of formula query strings into store criteria.

use serde_json::{json, Map, Value};

use crate::composition::{Composition, FormulaError};
use crate::elements::Element;

/// Symbols substituted for `*` wildcards. None of them is an element symbol.
pub const DUMMY_SYMBOLS: &str = "ADEGJLMQRXZ";

/// Convert a formula into criteria on the stored composition fields.
///
/// Four forms are understood:
///
/// * chemical systems such as `Si-O` or `Si-*`, matched on `chemsys` or, when a wildcard is
///   present, on `nelements` and the `elements` array;
/// * formulas with wildcards such as `Cr2*3`, matched on `formula_anonymous` and the reduced
///   amounts of the real elements;
/// * anonymous formulas such as `A2B3`, matched on `formula_anonymous`;
/// * concrete formulas such as `Fe2O3`, matched on `nelements` and reduced amounts.
pub fn formula_to_criteria(formula: &str) -> Result<Map<String, Value>, FormulaError> {
    let formula = formula.trim();
    if formula.contains('-') {
        chemsys_criteria(formula)
    } else if formula.contains('*') {
        wildcard_criteria(formula)
    } else {
        let composition = Composition::parse(formula)?;
        let mut criteria = Map::new();
        if composition.has_dummy() {
            criteria.insert(
                "formula_anonymous".to_string(),
                json!(composition.anonymized_formula()),
            );
        } else {
            let (reduced, _) = composition.reduced();
            criteria.insert("nelements".to_string(), json!(reduced.len()));
            insert_reduced_amounts(&mut criteria, &reduced);
        }
        Ok(criteria)
    }
}

/// Normalise a chemical system by sorting its elements, e.g. `O-Si-Li` becomes `Li-O-Si`.
pub fn normalize_chemsys(chemsys: &str) -> Result<String, FormulaError> {
    let mut elements = chemsys
        .split('-')
        .map(|part| {
            let part = part.trim();
            Element::from_symbol(part)
                .map(|element| element.symbol())
                .ok_or_else(|| FormulaError::InvalidElement(part.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    elements.sort_unstable();
    Ok(elements.join("-"))
}

fn chemsys_criteria(formula: &str) -> Result<Map<String, Value>, FormulaError> {
    let parts: Vec<&str> = formula.split('-').map(str::trim).collect();
    let mut criteria = Map::new();
    if parts.contains(&"*") {
        let elements = parts
            .iter()
            .filter(|part| **part != "*")
            .map(|part| {
                Element::from_symbol(part)
                    .map(|element| element.symbol())
                    .ok_or_else(|| FormulaError::InvalidElement(part.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        criteria.insert("nelements".to_string(), json!(parts.len()));
        if !elements.is_empty() {
            criteria.insert("elements".to_string(), json!({ "$all": elements }));
        }
    } else {
        criteria.insert("chemsys".to_string(), json!(normalize_chemsys(formula)?));
    }
    Ok(criteria)
}

fn wildcard_criteria(formula: &str) -> Result<Map<String, Value>, FormulaError> {
    let mut dummies = DUMMY_SYMBOLS.chars();
    let mut substituted = String::with_capacity(formula.len());
    for c in formula.chars() {
        if c == '*' {
            let dummy = dummies
                .next()
                .ok_or_else(|| FormulaError::TooManyWildcards(formula.to_string()))?;
            substituted.push(dummy);
        } else {
            substituted.push(c);
        }
    }
    let (scaled, _) = Composition::parse(&substituted)?.integer_scaled();
    let (reduced, _) = scaled.reduced();
    let mut criteria = Map::new();
    criteria.insert(
        "formula_anonymous".to_string(),
        json!(reduced.anonymized_formula()),
    );
    insert_reduced_amounts(&mut criteria, &reduced);
    Ok(criteria)
}

/// Insert `composition_reduced.<El>` criteria for each real element, in symbol order.
fn insert_reduced_amounts(criteria: &mut Map<String, Value>, reduced: &Composition) {
    let mut amounts: Vec<(&str, f64)> = reduced
        .iter()
        .filter(|(species, _)| !species.is_dummy())
        .map(|(species, amount)| (species.symbol(), amount))
        .collect();
    amounts.sort_by(|a, b| a.0.cmp(b.0));
    for (symbol, amount) in amounts {
        criteria.insert(format!("composition_reduced.{}", symbol), json!(amount));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criteria(formula: &str) -> Value {
        Value::Object(formula_to_criteria(formula).unwrap())
    }

    #[test]
    fn concrete_formula() {
        assert_eq!(
            json!({"composition_reduced.Cr": 2.0, "composition_reduced.O": 3.0, "nelements": 2}),
            criteria("Cr2O3")
        );
    }

    #[test]
    fn concrete_formula_is_reduced() {
        assert_eq!(
            json!({"composition_reduced.O": 2.0, "composition_reduced.Si": 1.0, "nelements": 2}),
            criteria("Si2O4")
        );
    }

    #[test]
    fn wildcard_formula() {
        assert_eq!(
            json!({"composition_reduced.Cr": 2.0, "formula_anonymous": "A2B3"}),
            criteria("Cr2*3")
        );
    }

    #[test]
    fn wildcard_formula_is_reduced() {
        assert_eq!(
            json!({"composition_reduced.Fe": 1.0, "formula_anonymous": "AB2"}),
            criteria("Fe2*4")
        );
    }

    #[test]
    fn wildcard_formula_fractional() {
        assert_eq!(
            json!({"composition_reduced.Li": 1.0, "formula_anonymous": "AB2"}),
            criteria("Li0.5*")
        );
        assert_eq!(
            json!({"composition_reduced.Fe": 1.0, "composition_reduced.Li": 2.0, "formula_anonymous": "AB2C4"}),
            criteria("Li0.5Fe0.25*")
        );
    }

    #[test]
    fn wildcard_formula_extra_species() {
        assert_eq!(
            json!({"composition_reduced.Fe": 2.0, "composition_reduced.O": 3.0, "formula_anonymous": "AB2C3"}),
            criteria("Fe2O3*")
        );
    }

    #[test]
    fn too_many_wildcards() {
        let formula = "*".repeat(DUMMY_SYMBOLS.len() + 1);
        assert_eq!(
            Err(FormulaError::TooManyWildcards(formula.clone())),
            formula_to_criteria(&formula)
        );
    }

    #[test]
    fn anonymous_formula() {
        assert_eq!(json!({"formula_anonymous": "A2B3"}), criteria("A2B3"));
    }

    #[test]
    fn chemsys() {
        assert_eq!(json!({"chemsys": "O-Si"}), criteria("Si-O"));
        assert_eq!(json!({"chemsys": "Fe-Li-O"}), criteria("O-Li-Fe"));
    }

    #[test]
    fn chemsys_with_wildcard() {
        assert_eq!(
            json!({"elements": {"$all": ["Si"]}, "nelements": 2}),
            criteria("Si-*")
        );
    }

    #[test]
    fn chemsys_all_wildcards() {
        assert_eq!(json!({"nelements": 3}), criteria("*-*-*"));
    }

    #[test]
    fn chemsys_invalid_element() {
        assert_eq!(
            Err(FormulaError::InvalidElement("Xy".to_string())),
            formula_to_criteria("Si-Xy")
        );
    }

    #[test]
    fn normalize() {
        assert_eq!("Li-O-Si", normalize_chemsys("O-Si-Li").unwrap());
        assert_eq!("Fe", normalize_chemsys(" Fe ").unwrap());
    }
}
