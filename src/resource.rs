//! Resources: a store, a document model and query operators exposed as REST routes.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::{json, Map, Value};
use tracing::{event, Level};

use crate::error::ApiError;
use crate::metrics;
use crate::models::{Meta, Response};
use crate::query::merge_queries;
use crate::query_operator::{MetaContext, ParamSpec, QueryOperator};
use crate::query_operators::{Operator, PaginationQuery, SparseFieldsQuery, VersionQuery};
use crate::query_params::QueryParams;
use crate::store::SharedStore;

/// A REST resource serving the documents of one store.
///
/// A resource mounted at `prefix` answers:
///
/// * `GET /{prefix}`: permanent redirect to `/{prefix}/`
/// * `GET /{prefix}/`: search using the query operators
/// * `GET /{prefix}/{key}/`: the document with the given key
#[derive(Debug)]
pub struct Resource {
    prefix: String,
    model: String,
    store: SharedStore,
    query_operators: Vec<Operator>,
    tags: Vec<String>,
    key_fields: Option<Vec<String>>,
    base_criteria: Map<String, Value>,
    enable_get_by_key: bool,
    enable_default_search: bool,
    include_in_schema: bool,
}

impl Resource {
    /// Return a resource with the default query operators: pagination and sparse fields
    /// defaulting to the store's key and last updated fields.
    pub fn new(prefix: &str, store: SharedStore, model: &str) -> Self {
        let default_fields = vec![store.key(), store.last_updated_field()];
        let query_operators = vec![
            PaginationQuery::default().into(),
            SparseFieldsQuery::new(model, Some(default_fields)).into(),
        ];
        Resource {
            prefix: prefix.trim_matches('/').to_string(),
            model: model.to_string(),
            store,
            query_operators,
            tags: Vec::new(),
            key_fields: None,
            base_criteria: Map::new(),
            enable_get_by_key: true,
            enable_default_search: true,
            include_in_schema: true,
        }
    }

    /// Replace the query operators. An empty list keeps the defaults.
    pub fn with_operators(mut self, query_operators: Vec<Operator>) -> Self {
        if !query_operators.is_empty() {
            self.query_operators = query_operators;
        }
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Fields returned by get-by-key when none are requested.
    pub fn with_key_fields(mut self, key_fields: Vec<String>) -> Self {
        self.key_fields = Some(key_fields);
        self
    }

    /// Criteria applied to every query.
    pub fn with_base_criteria(mut self, base_criteria: Map<String, Value>) -> Self {
        self.base_criteria = base_criteria;
        self
    }

    pub fn with_get_by_key(mut self, enable: bool) -> Self {
        self.enable_get_by_key = enable;
        self
    }

    pub fn with_default_search(mut self, enable: bool) -> Self {
        self.enable_default_search = enable;
        self
    }

    pub fn with_schema(mut self, include: bool) -> Self {
        self.include_in_schema = include;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn query_operators(&self) -> &[Operator] {
        &self.query_operators
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn enable_get_by_key(&self) -> bool {
        self.enable_get_by_key
    }

    pub fn enable_default_search(&self) -> bool {
        self.enable_default_search
    }

    pub fn include_in_schema(&self) -> bool {
        self.include_in_schema
    }

    /// The version operator, if the resource is versioned.
    pub fn version_query(&self) -> Option<&VersionQuery> {
        self.query_operators.iter().find_map(|op| match op {
            Operator::VersionQuery(version) => Some(version),
            _ => None,
        })
    }

    /// Parameters accepted by search, without duplicates.
    pub fn search_parameters(&self) -> Vec<ParamSpec> {
        let mut specs: Vec<ParamSpec> = Vec::new();
        for spec in self.query_operators.iter().flat_map(|op| op.parameters()) {
            if !specs.iter().any(|other| other.name == spec.name) {
                specs.push(spec);
            }
        }
        specs
    }

    /// Operators applied by get-by-key: sparse fields and, for versioned resources, the
    /// version.
    pub fn key_operators(&self) -> Vec<Operator> {
        let default_fields = match &self.key_fields {
            Some(fields) => fields.iter().map(String::as_str).collect(),
            None => vec![self.store.key(), self.store.last_updated_field()],
        };
        let mut operators: Vec<Operator> =
            vec![SparseFieldsQuery::new(&self.model, Some(default_fields)).into()];
        if let Some(version) = self.version_query() {
            operators.push(version.clone().into());
        }
        operators
    }

    /// Search the store.
    ///
    /// Fails if the request has parameters that no operator consumes.
    #[tracing::instrument(level = "DEBUG", skip(self, params), fields(resource = %self.prefix))]
    pub async fn search(&self, params: &QueryParams) -> Result<Response, ApiError> {
        let fragments = self
            .query_operators
            .iter()
            .map(|op| op.query(params))
            .collect::<Result<Vec<_>, _>>()?;

        let allowed = self.search_parameters();
        let unknown: Vec<String> = params
            .names()
            .into_iter()
            .filter(|name| !allowed.iter().any(|spec| spec.name == *name))
            .map(str::to_string)
            .collect();
        if !unknown.is_empty() {
            return Err(ApiError::UnknownParameters(unknown));
        }

        let mut query = merge_queries(fragments);
        let mut criteria = query.criteria();
        criteria.extend(self.base_criteria.clone());
        query.criteria = Some(criteria.clone());
        event!(Level::DEBUG, query = ?query, "searching");

        let mut docs = self.store.query(&query).await?;
        let context = MetaContext {
            total_doc: self.store.count(&criteria).await?,
        };
        let mut extra = Map::new();
        for op in &self.query_operators {
            extra.extend(op.meta(&context));
        }
        for op in &self.query_operators {
            docs = op.post_process(docs, params)?;
        }
        metrics::record_resource_query(&self.prefix, "search", docs.len());
        Ok(Response::new(docs, Meta::new(extra)))
    }

    /// Return the document with key `key`.
    #[tracing::instrument(level = "DEBUG", skip(self, params), fields(resource = %self.prefix))]
    pub async fn get_by_key(&self, key: &str, params: &QueryParams) -> Result<Response, ApiError> {
        self.find_by_key(&self.key_operators(), key, params).await
    }

    /// Look up the document with key `key`, then post-process it with `operators`.
    async fn find_by_key(
        &self,
        operators: &[Operator],
        key: &str,
        params: &QueryParams,
    ) -> Result<Response, ApiError> {
        let fragments = operators
            .iter()
            .map(|op| op.query(params))
            .collect::<Result<Vec<_>, _>>()?;
        let query = merge_queries(fragments);
        let mut criteria = query.criteria();
        criteria.extend(self.base_criteria.clone());
        criteria.insert(self.store.key().to_string(), json!(key));

        let doc = self.store.query_one(criteria, query.properties).await?;
        metrics::record_resource_query(&self.prefix, "get_by_key", usize::from(doc.is_some()));
        let Some(doc) = doc else {
            return Err(ApiError::NotFound {
                key: self.store.key().to_string(),
                value: key.to_string(),
            });
        };
        let mut docs = vec![doc];
        for op in operators {
            docs = op.post_process(docs, params)?;
        }
        Ok(Response::new(docs, Meta::new(Map::new())))
    }

    /// Build the key index and the indexes requested by the operators.
    pub async fn setup_indexes(&self) -> Result<(), ApiError> {
        self.store.ensure_index(self.store.key(), true).await?;
        for op in &self.query_operators {
            for (field, unique) in op.ensure_indexes() {
                self.store.ensure_index(&field, unique).await?;
            }
        }
        event!(Level::INFO, resource = %self.prefix, "indexes ready");
        Ok(())
    }

    /// Return a router serving this resource.
    pub fn router(self: Arc<Self>) -> Router {
        let base = format!("/{}", self.prefix);
        let mut router = Router::new().route(&base, get(redirect));
        if self.enable_default_search {
            router = router.route(&format!("{}/", base), get(search));
        }
        if self.enable_get_by_key {
            router = router
                .route(&format!("{}/:key/", base), get(get_by_key))
                .route(&format!("{}/:key", base), get(get_by_key));
        }
        router.with_state(self)
    }
}

async fn redirect(State(resource): State<Arc<Resource>>, uri: Uri) -> impl IntoResponse {
    let location = match uri.query() {
        Some(query) => format!("/{}/?{}", resource.prefix, query),
        None => format!("/{}/", resource.prefix),
    };
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)])
}

async fn search(
    State(resource): State<Arc<Resource>>,
    params: QueryParams,
) -> Result<Json<Response>, ApiError> {
    Ok(Json(resource.search(&params).await?))
}

async fn get_by_key(
    State(resource): State<Arc<Resource>>,
    Path(key): Path<String>,
    params: QueryParams,
) -> Result<Json<Response>, ApiError> {
    Ok(Json(resource.get_by_key(&key, &params).await?))
}
