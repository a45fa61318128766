//! Query operator implementations and their serialisable registry.
//!
//! Resource configuration refers to operators by class name, e.g.
//! `{"@class": "PaginationQuery", "max_limit": 500}`. An [Operator] holds one configured
//! operator and dispatches to it.

pub mod generic;
pub mod materials;
pub mod numeric;
pub mod pagination;
pub mod sort;
pub mod sparse_fields;
pub mod substrates;
pub mod tasks;
pub mod version;

pub use generic::{BooleanQuery, ExactMatchQuery, IdListQuery};
pub use materials::{ChemsysQuery, ElementsQuery, FormulaQuery, SymmetryQuery};
pub use numeric::{MinMaxQuery, RangeField};
pub use pagination::PaginationQuery;
pub use sort::SortQuery;
pub use sparse_fields::SparseFieldsQuery;
pub use substrates::SubstrateOrientationQuery;
pub use tasks::TaskDeprecationQuery;
pub use version::VersionQuery;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationErrors};

use crate::error::ApiError;
use crate::query::QueryFragment;
use crate::query_operator::{MetaContext, ParamSpec, QueryOperator};
use crate::query_params::QueryParams;

macro_rules! operators {
    ($($variant:ident),* $(,)?) => {
        /// A configured query operator.
        #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
        #[serde(tag = "@class")]
        pub enum Operator {
            $($variant($variant),)*
        }

        impl Operator {
            /// The wrapped operator.
            pub fn inner(&self) -> &dyn QueryOperator {
                match self {
                    $(Operator::$variant(op) => op,)*
                }
            }

            /// Class name used in configuration.
            pub fn class_name(&self) -> &'static str {
                match self {
                    $(Operator::$variant(_) => stringify!($variant),)*
                }
            }
        }

        $(
            impl From<$variant> for Operator {
                fn from(op: $variant) -> Self {
                    Operator::$variant(op)
                }
            }
        )*
    };
}

operators!(
    PaginationQuery,
    SparseFieldsQuery,
    SortQuery,
    VersionQuery,
    MinMaxQuery,
    BooleanQuery,
    IdListQuery,
    ExactMatchQuery,
    FormulaQuery,
    ChemsysQuery,
    ElementsQuery,
    SymmetryQuery,
    TaskDeprecationQuery,
    SubstrateOrientationQuery,
);

impl Validate for Operator {
    fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            Operator::PaginationQuery(op) => op.validate(),
            Operator::SparseFieldsQuery(op) => op.validate(),
            Operator::MinMaxQuery(op) => op.validate(),
            Operator::BooleanQuery(op) => op.validate(),
            Operator::IdListQuery(op) => op.validate(),
            Operator::ExactMatchQuery(op) => op.validate(),
            Operator::SortQuery(_)
            | Operator::VersionQuery(_)
            | Operator::FormulaQuery(_)
            | Operator::ChemsysQuery(_)
            | Operator::ElementsQuery(_)
            | Operator::SymmetryQuery(_)
            | Operator::TaskDeprecationQuery(_)
            | Operator::SubstrateOrientationQuery(_) => Ok(()),
        }
    }
}

impl QueryOperator for Operator {
    fn parameters(&self) -> Vec<ParamSpec> {
        self.inner().parameters()
    }

    fn query(&self, params: &QueryParams) -> Result<QueryFragment, ApiError> {
        self.inner().query(params)
    }

    fn meta(&self, context: &MetaContext) -> Map<String, Value> {
        self.inner().meta(context)
    }

    fn post_process(&self, docs: Vec<Value>, params: &QueryParams) -> Result<Vec<Value>, ApiError> {
        self.inner().post_process(docs, params)
    }

    fn ensure_indexes(&self) -> Vec<(String, bool)> {
        self.inner().ensure_indexes()
    }
}
