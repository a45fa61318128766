//! Chemical elements of the periodic table.

use std::fmt;
use std::str::FromStr;

use crate::composition::FormulaError;

/// Element symbols ordered by atomic number.
pub const SYMBOLS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh",
    "Fl", "Mc", "Lv", "Ts", "Og",
];

/// A chemical element, identified by its atomic number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Element(u8);

impl Element {
    /// Look up an element by its symbol. Symbols are case-sensitive.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        SYMBOLS
            .iter()
            .position(|s| *s == symbol)
            .map(|index| Element(index as u8 + 1))
    }

    /// Look up an element by its atomic number.
    pub fn from_atomic_number(z: u8) -> Option<Self> {
        if (1..=SYMBOLS.len() as u8).contains(&z) {
            Some(Element(z))
        } else {
            None
        }
    }

    pub fn symbol(&self) -> &'static str {
        SYMBOLS[self.0 as usize - 1]
    }

    pub fn atomic_number(&self) -> u8 {
        self.0
    }

    /// Returns whether `symbol` names an element.
    pub fn is_valid_symbol(symbol: &str) -> bool {
        Self::from_symbol(symbol).is_some()
    }
}

impl FromStr for Element {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_symbol(s).ok_or_else(|| FormulaError::InvalidElement(s.to_string()))
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_symbol() {
        let iron = Element::from_symbol("Fe").unwrap();
        assert_eq!(26, iron.atomic_number());
        assert_eq!("Fe", iron.symbol());
        assert_eq!("Fe", iron.to_string());
    }

    #[test]
    fn lookup_by_atomic_number() {
        assert_eq!("H", Element::from_atomic_number(1).unwrap().symbol());
        assert_eq!("Og", Element::from_atomic_number(118).unwrap().symbol());
        assert_eq!(None, Element::from_atomic_number(0));
        assert_eq!(None, Element::from_atomic_number(119));
    }

    #[test]
    fn symbols_are_case_sensitive() {
        assert!(Element::is_valid_symbol("Si"));
        assert!(!Element::is_valid_symbol("si"));
        assert!(!Element::is_valid_symbol("SI"));
    }

    #[test]
    fn parse_invalid() {
        assert_eq!(
            Err(FormulaError::InvalidElement("Xx".to_string())),
            "Xx".parse::<Element>()
        );
    }
}
