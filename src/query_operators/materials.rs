//! Chemistry aware filters: formulas, chemical systems, elements and symmetry.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::elements::Element;
use crate::error::ApiError;
use crate::formula::{formula_to_criteria, normalize_chemsys};
use crate::query::QueryFragment;
use crate::query_operator::{ParamSpec, QueryOperator};
use crate::query_params::QueryParams;

/// Matches a formula, which may be anonymous, contain wildcards or be a chemical system.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct FormulaQuery {}

impl QueryOperator for FormulaQuery {
    fn parameters(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::string(
            "formula",
            "Query by formula including anonymized formula or by including wild cards",
        )]
    }

    fn query(&self, params: &QueryParams) -> Result<QueryFragment, ApiError> {
        match params.get("formula") {
            Some(formula) => Ok(QueryFragment::with_criteria(formula_to_criteria(formula)?)),
            None => Ok(QueryFragment::default()),
        }
    }

    fn ensure_indexes(&self) -> Vec<(String, bool)> {
        ["formula_anonymous", "chemsys", "nelements"]
            .into_iter()
            .map(|key| (key.to_string(), false))
            .collect()
    }
}

/// Matches a dash-delimited chemical system in any element order.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ChemsysQuery {}

impl QueryOperator for ChemsysQuery {
    fn parameters(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::string(
            "chemsys",
            "Dash-delimited list of elements in the material",
        )]
    }

    fn query(&self, params: &QueryParams) -> Result<QueryFragment, ApiError> {
        match params.get("chemsys") {
            Some(chemsys) => Ok(QueryFragment::criterion(
                "chemsys",
                json!(normalize_chemsys(chemsys)?),
            )),
            None => Ok(QueryFragment::default()),
        }
    }

    fn ensure_indexes(&self) -> Vec<(String, bool)> {
        vec![("chemsys".to_string(), false)]
    }
}

/// Requires or excludes elements of the composition.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ElementsQuery {}

fn element_list(params: &QueryParams, name: &str) -> Result<Option<Vec<String>>, ApiError> {
    params
        .get_list(name)
        .map(|symbols| {
            symbols
                .iter()
                .map(|symbol| {
                    Element::from_str(symbol)
                        .map(|element| element.symbol().to_string())
                        .map_err(|err| ApiError::invalid_parameter(name, err))
                })
                .collect()
        })
        .transpose()
}

impl QueryOperator for ElementsQuery {
    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::string(
                "elements",
                "Query by elements in the material composition as a comma-separated list",
            ),
            ParamSpec::string(
                "exclude_elements",
                "Query by excluded elements in the material composition as a comma-separated list",
            ),
        ]
    }

    fn query(&self, params: &QueryParams) -> Result<QueryFragment, ApiError> {
        let mut condition = Map::new();
        if let Some(elements) = element_list(params, "elements")? {
            condition.insert("$all".to_string(), json!(elements));
        }
        if let Some(excluded) = element_list(params, "exclude_elements")? {
            condition.insert("$nin".to_string(), json!(excluded));
        }
        if condition.is_empty() {
            Ok(QueryFragment::default())
        } else {
            Ok(QueryFragment::criterion("elements", Value::Object(condition)))
        }
    }

    fn ensure_indexes(&self) -> Vec<(String, bool)> {
        vec![("elements".to_string(), false)]
    }
}

/// Crystal systems.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum CrystalSystem {
    Triclinic,
    Monoclinic,
    Orthorhombic,
    Tetragonal,
    Trigonal,
    Hexagonal,
    Cubic,
}

impl CrystalSystem {
    pub const ALL: [CrystalSystem; 7] = [
        CrystalSystem::Triclinic,
        CrystalSystem::Monoclinic,
        CrystalSystem::Orthorhombic,
        CrystalSystem::Tetragonal,
        CrystalSystem::Trigonal,
        CrystalSystem::Hexagonal,
        CrystalSystem::Cubic,
    ];
}

impl FromStr for CrystalSystem {
    type Err = String;

    /// Parse a crystal system, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CrystalSystem::ALL
            .into_iter()
            .find(|system| system.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("{} is not a crystal system", s))
    }
}

/// Filters on crystal system and space group.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct SymmetryQuery {}

impl QueryOperator for SymmetryQuery {
    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::string("crystal_system", "Crystal system of the material")
                .with_allowed(CrystalSystem::ALL.iter().map(|system| system.to_string())),
            ParamSpec::integer("spacegroup_number", "Space group number of the material"),
            ParamSpec::string("spacegroup_symbol", "Space group symbol of the material"),
        ]
    }

    fn query(&self, params: &QueryParams) -> Result<QueryFragment, ApiError> {
        let mut criteria = Map::new();
        if let Some(system) = params.get_parsed::<CrystalSystem>("crystal_system")? {
            criteria.insert("symmetry.crystal_system".to_string(), json!(system.to_string()));
        }
        if let Some(number) = params.get_parsed::<u32>("spacegroup_number")? {
            if !(1..=230).contains(&number) {
                return Err(ApiError::invalid_parameter(
                    "spacegroup_number",
                    "must be between 1 and 230",
                ));
            }
            criteria.insert("symmetry.number".to_string(), json!(number));
        }
        if let Some(symbol) = params.get("spacegroup_symbol") {
            criteria.insert("symmetry.symbol".to_string(), json!(symbol.trim()));
        }
        Ok(QueryFragment::with_criteria(criteria))
    }

    fn ensure_indexes(&self) -> Vec<(String, bool)> {
        ["symmetry.crystal_system", "symmetry.number", "symmetry.symbol"]
            .into_iter()
            .map(|key| (key.to_string(), false))
            .collect()
    }
}
