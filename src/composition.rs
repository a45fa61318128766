//! Chemical compositions parsed from formula strings.
//!
//! A formula is a sequence of species symbols, each optionally followed by an amount, with
//! nested `(...)` or `[...]` groups that may themselves carry a multiplier, e.g. `Fe2O3`,
//! `Ca3(PO4)2` or `Li0.5CoO2`. Symbols that are not elements are accepted as dummy species
//! (`A`, `X`, ...) as long as they cannot be confused with an element symbol.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::elements::Element;

/// Amounts closer than this are considered equal.
pub const AMOUNT_TOLERANCE: f64 = 1e-8;

/// Largest multiplier tried when scaling fractional amounts to integers.
const MAX_MULTIPLIER: u32 = 1000;

/// Error parsing a formula
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FormulaError {
    /// Formula with no species
    #[error("formula is empty")]
    Empty,

    /// Symbol that is neither an element nor a valid dummy species
    #[error("{0} is not a valid element symbol")]
    InvalidElement(String),

    /// Amount that is not a valid number
    #[error("invalid amount {0}")]
    InvalidAmount(String),

    /// More wildcards than available dummy symbols
    #[error("too many wildcards in {0}")]
    TooManyWildcards(String),

    /// Opening and closing brackets do not match
    #[error("unbalanced brackets in {0}")]
    UnbalancedBrackets(String),

    /// Character that cannot appear in a formula
    #[error("unexpected character {character:?} at position {position} in {formula}")]
    UnexpectedCharacter {
        character: char,
        position: usize,
        formula: String,
    },
}

/// A species in a composition: a real element or a placeholder symbol.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Species {
    Element(Element),
    Dummy(String),
}

impl Species {
    /// Interpret a symbol as an element, falling back to a dummy species.
    pub fn from_symbol(symbol: &str) -> Result<Self, FormulaError> {
        if let Some(element) = Element::from_symbol(symbol) {
            return Ok(Species::Element(element));
        }
        // A dummy symbol must not start with an element symbol.
        let starts_like_element = symbol
            .char_indices()
            .skip(1)
            .map(|(i, _)| &symbol[..i])
            .chain(std::iter::once(symbol))
            .take(2)
            .any(Element::is_valid_symbol);
        if starts_like_element || symbol.is_empty() {
            Err(FormulaError::InvalidElement(symbol.to_string()))
        } else {
            Ok(Species::Dummy(symbol.to_string()))
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            Species::Element(element) => element.symbol(),
            Species::Dummy(symbol) => symbol,
        }
    }

    pub fn is_dummy(&self) -> bool {
        matches!(self, Species::Dummy(_))
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Amounts of each species, in order of first appearance.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Composition {
    amounts: Vec<(Species, f64)>,
}

impl Composition {
    /// Parse a formula string.
    pub fn parse(formula: &str) -> Result<Self, FormulaError> {
        let mut parser = Parser::new(formula);
        let symbols = parser.parse_group(None)?;
        let mut composition = Composition::default();
        for (symbol, amount) in symbols {
            composition.add(Species::from_symbol(&symbol)?, amount);
        }
        composition.amounts.retain(|(_, amount)| amount.abs() > AMOUNT_TOLERANCE);
        if composition.is_empty() {
            return Err(FormulaError::Empty);
        }
        Ok(composition)
    }

    /// Add `amount` of `species`, merging with any existing amount.
    pub fn add(&mut self, species: Species, amount: f64) {
        match self.amounts.iter_mut().find(|(s, _)| *s == species) {
            Some((_, existing)) => *existing += amount,
            None => self.amounts.push((species, amount)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Species, f64)> {
        self.amounts.iter().map(|(species, amount)| (species, *amount))
    }

    /// Number of distinct species.
    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }

    pub fn amount(&self, symbol: &str) -> Option<f64> {
        self.iter()
            .find(|(species, _)| species.symbol() == symbol)
            .map(|(_, amount)| amount)
    }

    /// Real elements of the composition.
    pub fn elements(&self) -> Vec<Element> {
        self.iter()
            .filter_map(|(species, _)| match species {
                Species::Element(element) => Some(*element),
                Species::Dummy(_) => None,
            })
            .collect()
    }

    pub fn has_dummy(&self) -> bool {
        self.iter().any(|(species, _)| species.is_dummy())
    }

    /// Reduce the composition by the greatest common divisor of its amounts.
    ///
    /// Returns the reduced composition and the reduction factor. Compositions with
    /// non-integral amounts are returned unchanged with a factor of 1.
    pub fn reduced(&self) -> (Composition, f64) {
        let integral = self.iter().all(|(_, amount)| is_integral(amount));
        if !integral {
            return (self.clone(), 1.0);
        }
        let factor = self
            .iter()
            .map(|(_, amount)| amount.round() as u64)
            .fold(0, gcd)
            .max(1) as f64;
        let amounts = self
            .amounts
            .iter()
            .map(|(species, amount)| (species.clone(), amount / factor))
            .collect();
        (Composition { amounts }, factor)
    }

    /// Scale the composition by the smallest multiplier making every amount integral, e.g.
    /// `Li0.5CoO2` becomes `LiCo2O4`.
    ///
    /// Returns the scaled composition and the multiplier. Compositions that no multiplier up
    /// to 1000 makes integral are returned unchanged with a multiplier of 1.
    pub fn integer_scaled(&self) -> (Composition, f64) {
        for multiplier in (1..=MAX_MULTIPLIER).map(f64::from) {
            if self.iter().all(|(_, amount)| is_integral(amount * multiplier)) {
                let amounts = self
                    .amounts
                    .iter()
                    .map(|(species, amount)| (species.clone(), (amount * multiplier).round()))
                    .collect();
                return (Composition { amounts }, multiplier);
            }
        }
        (self.clone(), 1.0)
    }

    /// Formula with species replaced by `A`, `B`, `C`... in order of increasing reduced
    /// amount, e.g. `Fe2O3` becomes `A2B3`.
    pub fn anonymized_formula(&self) -> String {
        let (reduced, _) = self.reduced();
        let mut amounts: Vec<f64> = reduced.iter().map(|(_, amount)| amount).collect();
        amounts.sort_by(|a, b| a.total_cmp(b));
        amounts
            .into_iter()
            .zip('A'..='Z')
            .map(|(amount, letter)| format!("{}{}", letter, format_amount(amount)))
            .collect()
    }
}

impl FromStr for Composition {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Composition::parse(s)
    }
}

impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (species, amount) in self.iter() {
            write!(f, "{}{}", species, format_amount(amount))?;
        }
        Ok(())
    }
}

fn is_integral(amount: f64) -> bool {
    (amount - amount.round()).abs() < AMOUNT_TOLERANCE
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// Format an amount for a formula string. An amount of one is omitted.
fn format_amount(amount: f64) -> String {
    if (amount - 1.0).abs() < AMOUNT_TOLERANCE {
        String::new()
    } else if is_integral(amount) {
        format!("{}", amount.round() as i64)
    } else {
        format!("{}", amount)
    }
}

/// Recursive descent parser over the characters of a formula.
struct Parser<'a> {
    formula: &'a str,
    chars: Vec<char>,
    position: usize,
}

impl<'a> Parser<'a> {
    fn new(formula: &'a str) -> Self {
        Parser {
            formula,
            chars: formula.chars().collect(),
            position: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn unbalanced(&self) -> FormulaError {
        FormulaError::UnbalancedBrackets(self.formula.to_string())
    }

    /// Parse symbols and amounts until `closing` (or the end of input at the top level).
    fn parse_group(&mut self, closing: Option<char>) -> Result<Vec<(String, f64)>, FormulaError> {
        let mut symbols = Vec::new();
        loop {
            let Some(c) = self.peek() else {
                return match closing {
                    Some(_) => Err(self.unbalanced()),
                    None => Ok(symbols),
                };
            };
            match c {
                c if c.is_whitespace() => self.position += 1,
                c if Some(c) == closing => {
                    self.position += 1;
                    return Ok(symbols);
                }
                '(' | '[' => {
                    self.position += 1;
                    let inner = self.parse_group(Some(if c == '(' { ')' } else { ']' }))?;
                    let multiplier = self.parse_amount()?.unwrap_or(1.0);
                    symbols.extend(
                        inner
                            .into_iter()
                            .map(|(symbol, amount)| (symbol, amount * multiplier)),
                    );
                }
                ')' | ']' => return Err(self.unbalanced()),
                c if c.is_ascii_uppercase() => {
                    let start = self.position;
                    self.position += 1;
                    while self.peek().is_some_and(|c| c.is_ascii_lowercase()) {
                        self.position += 1;
                    }
                    let symbol: String = self.chars[start..self.position].iter().collect();
                    let amount = self.parse_amount()?.unwrap_or(1.0);
                    symbols.push((symbol, amount));
                }
                character => {
                    return Err(FormulaError::UnexpectedCharacter {
                        character,
                        position: self.position,
                        formula: self.formula.to_string(),
                    })
                }
            }
        }
    }

    fn parse_amount(&mut self) -> Result<Option<f64>, FormulaError> {
        let start = self.position;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || c == '.')
        {
            self.position += 1;
        }
        if start == self.position {
            return Ok(None);
        }
        let text: String = self.chars[start..self.position].iter().collect();
        text.parse::<f64>()
            .map(Some)
            .map_err(|_| FormulaError::InvalidAmount(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple() {
        let composition = Composition::parse("Fe2O3").unwrap();
        assert_eq!(2, composition.len());
        assert_eq!(Some(2.0), composition.amount("Fe"));
        assert_eq!(Some(3.0), composition.amount("O"));
        assert!(!composition.has_dummy());
    }

    #[test]
    fn parse_groups() {
        let composition = Composition::parse("Ca3(PO4)2").unwrap();
        assert_eq!(Some(3.0), composition.amount("Ca"));
        assert_eq!(Some(2.0), composition.amount("P"));
        assert_eq!(Some(8.0), composition.amount("O"));

        let composition = Composition::parse("K4[Fe(CN)6]").unwrap();
        assert_eq!(Some(6.0), composition.amount("C"));
        assert_eq!(Some(6.0), composition.amount("N"));
        assert_eq!(Some(1.0), composition.amount("Fe"));
    }

    #[test]
    fn parse_repeated_species() {
        let composition = Composition::parse("CH3COOH").unwrap();
        assert_eq!(Some(2.0), composition.amount("C"));
        assert_eq!(Some(4.0), composition.amount("H"));
        assert_eq!(Some(2.0), composition.amount("O"));
        assert_eq!("C2H4O2", composition.to_string());
    }

    #[test]
    fn parse_fractional() {
        let composition = Composition::parse("Li0.5CoO2").unwrap();
        assert_eq!(Some(0.5), composition.amount("Li"));
        let (reduced, factor) = composition.reduced();
        assert_eq!(1.0, factor);
        assert_eq!(composition, reduced);
    }

    #[test]
    fn integer_scaled() {
        let (scaled, multiplier) = Composition::parse("Li0.5CoO2").unwrap().integer_scaled();
        assert_eq!(2.0, multiplier);
        assert_eq!("LiCo2O4", scaled.to_string());

        let (scaled, multiplier) = Composition::parse("Li0.25Fe0.5A").unwrap().integer_scaled();
        assert_eq!(4.0, multiplier);
        assert_eq!(Some(1.0), scaled.amount("Li"));
        assert_eq!(Some(2.0), scaled.amount("Fe"));
        assert_eq!(Some(4.0), scaled.amount("A"));

        let composition = Composition::parse("Fe2O3").unwrap();
        assert_eq!((composition.clone(), 1.0), composition.integer_scaled());
    }

    #[test]
    fn parse_whitespace() {
        let composition = Composition::parse(" Si O2 ").unwrap();
        assert_eq!(Some(2.0), composition.amount("O"));
    }

    #[test]
    fn parse_dummy() {
        let composition = Composition::parse("A2B3").unwrap();
        assert!(composition.has_dummy());
        assert_eq!(vec![Element::from_symbol("B").unwrap()], composition.elements());
    }

    #[test]
    fn parse_errors() {
        assert_eq!(Err(FormulaError::Empty), Composition::parse(""));
        assert_eq!(Err(FormulaError::Empty), Composition::parse("Fe0"));
        assert_eq!(
            Err(FormulaError::InvalidElement("Foo".to_string())),
            Composition::parse("Foo2")
        );
        assert_eq!(
            Err(FormulaError::UnbalancedBrackets("Ca3(PO4".to_string())),
            Composition::parse("Ca3(PO4")
        );
        assert_eq!(
            Err(FormulaError::UnbalancedBrackets("PO4)2".to_string())),
            Composition::parse("PO4)2")
        );
        assert_eq!(
            Err(FormulaError::InvalidAmount("1.2.3".to_string())),
            Composition::parse("Fe1.2.3")
        );
        assert_eq!(
            Err(FormulaError::UnexpectedCharacter {
                character: 'f',
                position: 0,
                formula: "fe".to_string()
            }),
            Composition::parse("fe")
        );
    }

    #[test]
    fn reduce() {
        let (reduced, factor) = Composition::parse("Si2O4").unwrap().reduced();
        assert_eq!(2.0, factor);
        assert_eq!(Some(1.0), reduced.amount("Si"));
        assert_eq!(Some(2.0), reduced.amount("O"));
    }

    #[test]
    fn anonymized_formula() {
        assert_eq!("A2B3", Composition::parse("Fe2O3").unwrap().anonymized_formula());
        assert_eq!("AB2", Composition::parse("Si2O4").unwrap().anonymized_formula());
        assert_eq!("A2B3", Composition::parse("Cr2A3").unwrap().anonymized_formula());
        assert_eq!("ABC3", Composition::parse("BaTiO3").unwrap().anonymized_formula());
        assert_eq!(
            "A0.5BC2",
            Composition::parse("Li0.5CoO2").unwrap().anonymized_formula()
        );
    }
}
