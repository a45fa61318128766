//! Base rester: paged queries against one resource of the API.

use std::marker::PhantomData;
use std::time::Duration;

use reqwest::{header, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{event, Level};
use url::Url;

use super::{ClientSettings, RestError};
use crate::models::{self, Meta, Response};

/// Name of the header carrying the API key.
const API_KEY_HEADER: &str = "x-api-key";

/// Build the HTTP client shared by resters.
pub fn http_client(settings: &ClientSettings) -> Result<reqwest::Client, RestError> {
    let mut headers = header::HeaderMap::new();
    if let Some(api_key) = &settings.api_key {
        let value = header::HeaderValue::from_str(api_key)
            .map_err(|err| RestError::Config(format!("invalid API key: {}", err)))?;
        headers.insert(API_KEY_HEADER, value);
    }
    let mut builder = reqwest::Client::builder()
        .default_headers(headers)
        .timeout(settings.timeout);
    if settings.include_user_agent {
        builder = builder.user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
    }
    Ok(builder.build()?)
}

/// Client for the resource mounted at `suffix`.
#[derive(Clone, Debug)]
pub struct BaseRester {
    client: reqwest::Client,
    endpoint: Url,
    suffix: String,
    model: &'static str,
    primary_key: &'static str,
    max_retries: u32,
    chunk_size: u64,
}

impl BaseRester {
    /// Return a rester with its own HTTP client.
    pub fn new(
        settings: &ClientSettings,
        suffix: &str,
        model: &'static str,
        primary_key: &'static str,
    ) -> Result<Self, RestError> {
        Self::with_client(http_client(settings)?, settings, suffix, model, primary_key)
    }

    /// Return a rester sharing `client`.
    pub fn with_client(
        client: reqwest::Client,
        settings: &ClientSettings,
        suffix: &str,
        model: &'static str,
        primary_key: &'static str,
    ) -> Result<Self, RestError> {
        let suffix = suffix.trim_matches('/');
        let mut base = settings.endpoint.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let endpoint = Url::parse(&base)?.join(&format!("{}/", suffix))?;
        Ok(BaseRester {
            client,
            endpoint,
            suffix: suffix.to_string(),
            model,
            primary_key,
            max_retries: settings.max_retries,
            chunk_size: settings.chunk_size.max(1),
        })
    }

    /// URL of the resource, ending with a slash.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Name of the document model served by the resource.
    pub fn model(&self) -> &'static str {
        self.model
    }

    pub fn primary_key(&self) -> &'static str {
        self.primary_key
    }

    /// Fields of the document model.
    pub fn available_fields(&self) -> Vec<String> {
        models::model_info(self.model)
            .map(|model| model.fields())
            .unwrap_or_default()
    }

    /// Send a GET request, retrying rate limited requests.
    async fn get(&self, url: &Url, params: &[(String, String)]) -> Result<Value, RestError> {
        let mut attempt = 0;
        loop {
            let response = self.client.get(url.clone()).query(params).send().await?;
            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS && attempt < self.max_retries {
                attempt += 1;
                let delay = retry_after(&response).unwrap_or(Duration::from_secs(attempt as u64));
                event!(
                    Level::WARN,
                    "rate limited by {}, retrying in {:?} (attempt {})",
                    url,
                    delay,
                    attempt
                );
                tokio::time::sleep(delay).await;
                continue;
            }
            if status != StatusCode::OK {
                let url = response.url().to_string();
                let text = response.text().await.unwrap_or_default();
                return Err(RestError::Status {
                    status: status.as_u16(),
                    url,
                    message: error_message(&text),
                });
            }
            return Ok(response.json().await?);
        }
    }

    /// Query the resource, fetching pages of `chunk_size` documents until every matching
    /// document or `num_chunks` pages have been retrieved.
    ///
    /// `criteria` are query parameters of the resource. `fields` selects the fields to return;
    /// when `None` the resource's defaults apply. `suburl` is appended to the resource URL.
    #[tracing::instrument(level = "DEBUG", skip(self, criteria, fields), fields(suffix = %self.suffix))]
    pub async fn query_resource(
        &self,
        criteria: &[(String, String)],
        fields: Option<&[String]>,
        suburl: Option<&str>,
        num_chunks: Option<usize>,
        chunk_size: Option<u64>,
    ) -> Result<Response, RestError> {
        let url = match suburl {
            Some(suburl) => self
                .endpoint
                .join(&format!("{}/", suburl.trim_matches('/')))?,
            None => self.endpoint.clone(),
        };
        let chunk_size = chunk_size.unwrap_or(self.chunk_size).max(1);
        let mut params = criteria.to_vec();
        if let Some(fields) = fields {
            params.push(("fields".to_string(), fields.join(",")));
        }

        let mut data = Vec::new();
        let mut meta: Option<Meta> = None;
        let mut chunks = 0;
        loop {
            let mut page_params = params.clone();
            page_params.push(("skip".to_string(), data.len().to_string()));
            page_params.push(("limit".to_string(), chunk_size.to_string()));
            let page: Response = serde_json::from_value(self.get(&url, &page_params).await?)?;
            chunks += 1;
            let received = page.data.len();
            data.extend(page.data);
            let total = page.meta.total_doc();
            meta.get_or_insert(page.meta);

            let done = match total {
                Some(total) => data.len() as u64 >= total,
                None => true,
            };
            if done || received == 0 || num_chunks.is_some_and(|n| chunks >= n) {
                break;
            }
        }
        event!(Level::DEBUG, "retrieved {} documents in {} pages", data.len(), chunks);
        let meta = meta.ok_or_else(|| RestError::Config("no response received".to_string()))?;
        Ok(Response::new(data, meta))
    }

    /// Start a search of the resource.
    pub fn search<T: DeserializeOwned>(&self) -> Search<'_, T> {
        Search::new(self)
    }

    /// Search returning raw documents.
    pub async fn search_raw(
        &self,
        criteria: &[(String, String)],
        fields: Option<&[String]>,
        num_chunks: Option<usize>,
    ) -> Result<Vec<Value>, RestError> {
        Ok(self
            .query_resource(criteria, fields, None, num_chunks, None)
            .await?
            .data)
    }

    /// Number of documents matching `criteria`.
    pub async fn count(&self, criteria: &[(String, String)]) -> Result<u64, RestError> {
        let fields = [self.primary_key.to_string()];
        let response = self
            .query_resource(criteria, Some(&fields[..]), None, Some(1), Some(1))
            .await?;
        Ok(response
            .meta
            .total_doc()
            .unwrap_or(response.data.len() as u64))
    }

    /// Return the document with identifier `id`.
    ///
    /// All fields are returned when `fields` is `None`.
    pub async fn get_data_by_id<T: DeserializeOwned>(
        &self,
        id: &str,
        fields: Option<&[String]>,
    ) -> Result<T, RestError> {
        let url = self.endpoint.join(&format!("{}/", id))?;
        let params = match fields {
            Some(fields) => vec![("fields".to_string(), fields.join(","))],
            None => vec![("all_fields".to_string(), "true".to_string())],
        };
        let not_found = || RestError::NotFound {
            suffix: self.suffix.clone(),
            id: id.to_string(),
        };
        let value = match self.get(&url, &params).await {
            Err(RestError::Status { status: 404, .. }) => return Err(not_found()),
            result => result?,
        };
        let response: Response = serde_json::from_value(value)?;
        let doc = response.data.into_iter().next().ok_or_else(not_found)?;
        Ok(serde_json::from_value(doc)?)
    }
}

/// Delay requested by a `Retry-After` header given in seconds.
fn retry_after(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get(header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Extract the message of an error response, falling back to the raw body.
fn error_message(text: &str) -> String {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|body| {
            body.pointer("/error/message")
                .or_else(|| body.get("detail"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| text.to_string())
}

/// A search of a resource, built up parameter by parameter.
///
/// Ranges are given as `(min, max)` tuples and sent as `<name>_min` and `<name>_max`.
#[derive(Debug)]
#[must_use = "a search does nothing until sent"]
pub struct Search<'a, T> {
    rester: &'a BaseRester,
    params: Vec<(String, String)>,
    fields: Option<Vec<String>>,
    num_chunks: Option<usize>,
    chunk_size: Option<u64>,
    model: PhantomData<T>,
}

impl<'a, T: DeserializeOwned> Search<'a, T> {
    fn new(rester: &'a BaseRester) -> Self {
        Search {
            rester,
            params: Vec::new(),
            fields: None,
            num_chunks: None,
            chunk_size: None,
            model: PhantomData,
        }
    }

    /// Add a query parameter.
    pub fn param(mut self, name: &str, value: impl ToString) -> Self {
        self.params.push((name.to_string(), value.to_string()));
        self
    }

    /// Add a comma separated list parameter.
    pub fn list<S: AsRef<str>>(self, name: &str, values: &[S]) -> Self {
        let joined = values
            .iter()
            .map(|value| value.as_ref())
            .collect::<Vec<_>>()
            .join(",");
        self.param(name, joined)
    }

    /// Add `<name>_min` and `<name>_max` parameters.
    pub fn range<N: ToString>(self, name: &str, (min, max): (N, N)) -> Self {
        self.param(&format!("{}_min", name), min)
            .param(&format!("{}_max", name), max)
    }

    /// Sort by `field`.
    pub fn sort(self, field: &str, ascending: bool) -> Self {
        self.param("sort_field", field).param("ascending", ascending)
    }

    /// Fields to return. All fields are returned otherwise.
    pub fn fields<S: AsRef<str>>(mut self, fields: &[S]) -> Self {
        self.fields = Some(fields.iter().map(|f| f.as_ref().to_string()).collect());
        self
    }

    /// Maximum number of pages to retrieve.
    pub fn num_chunks(mut self, num_chunks: usize) -> Self {
        self.num_chunks = Some(num_chunks);
        self
    }

    /// Number of documents per page.
    pub fn chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }

    /// Query parameters of the search, excluding pagination.
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = self.params.clone();
        if self.fields.is_none() {
            params.push(("all_fields".to_string(), "true".to_string()));
        }
        params
    }

    /// Run the search, returning raw documents.
    pub async fn send_raw(self) -> Result<Vec<Value>, RestError> {
        let params = self.params();
        Ok(self
            .rester
            .query_resource(
                &params,
                self.fields.as_deref(),
                None,
                self.num_chunks,
                self.chunk_size,
            )
            .await?
            .data)
    }

    /// Run the search.
    pub async fn send(self) -> Result<Vec<T>, RestError> {
        self.send_raw()
            .await?
            .into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(RestError::from))
            .collect()
    }
}

/// Parameters shared by searches of composition-bearing documents.
impl<'a, T: DeserializeOwned> Search<'a, T> {
    /// Formula, anonymous formula or wildcard formula such as `Li*O3`.
    pub fn formula(self, formula: &str) -> Self {
        self.param("formula", formula)
    }

    /// Dash-delimited chemical system such as `Li-Fe-O`.
    pub fn chemsys(self, chemsys: &str) -> Self {
        self.param("chemsys", chemsys)
    }

    pub fn elements(self, elements: &[&str]) -> Self {
        self.list("elements", elements)
    }

    pub fn exclude_elements(self, elements: &[&str]) -> Self {
        self.list("exclude_elements", elements)
    }

    pub fn task_ids(self, task_ids: &[&str]) -> Self {
        self.list("task_ids", task_ids)
    }
}
