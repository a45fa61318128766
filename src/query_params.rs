//! Axum extractor providing typed access to URL query parameters

use crate::error::ApiError;

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use std::fmt::Display;
use std::str::FromStr;

/// Query parameters of a request, in the order they appear in the URL.
///
/// Empty values (`?formula=`) are treated as absent by the typed getters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Parse a raw (percent-encoded) query string.
    pub fn parse(query: &str) -> Self {
        QueryParams {
            pairs: url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    /// Build query parameters from name/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        QueryParams {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Names of all parameters, without duplicates.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for (name, _) in &self.pairs {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        names
    }

    /// Return whether the parameter `name` was given a non-empty value.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Return the last non-empty value of the parameter `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, v)| k == name && !v.trim().is_empty())
            .map(|(_, v)| v.as_str())
    }

    /// Return a comma separated parameter as a list of trimmed, non-empty items.
    pub fn get_list(&self, name: &str) -> Option<Vec<String>> {
        self.get(name).map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
    }

    /// Parse the parameter `name` as `T`.
    pub fn get_parsed<T>(&self, name: &str) -> Result<Option<T>, ApiError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.get(name)
            .map(|value| {
                value
                    .trim()
                    .parse::<T>()
                    .map_err(|err| ApiError::invalid_parameter(name, err))
            })
            .transpose()
    }

    /// Parse the parameter `name` as a boolean.
    ///
    /// Accepts `true`/`false`, `1`/`0`, `yes`/`no` and `on`/`off`, ignoring case.
    pub fn get_bool(&self, name: &str) -> Result<Option<bool>, ApiError> {
        self.get(name)
            .map(|value| match value.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(true),
                "false" | "0" | "no" | "off" => Ok(false),
                _ => Err(ApiError::invalid_parameter(
                    name,
                    format!("{} is not a valid boolean", value),
                )),
            })
            .transpose()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for QueryParams
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    /// Extract `QueryParams` from the request URI.
    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(QueryParams::parse(parts.uri.query().unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::{IntoResponse, Response},
        routing::get,
        Router,
    };
    use regex::Regex;
    use tower::ServiceExt; // for `oneshot` and `ready`

    // Handler function that accepts a QueryParams extractor.
    async fn test_handler(params: QueryParams) -> Response {
        match params.get_parsed::<u32>("bar") {
            Ok(bar) => format!("foo: {:?} bar: {:?}", params.get("foo"), bar).into_response(),
            Err(err) => err.into_response(),
        }
    }

    // Build a router and make a oneshot request.
    async fn request(uri: &str) -> Response {
        Router::new()
            .route("/", get(test_handler))
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    // Jump through the hoops to get the body as a string.
    async fn body_string(response: Response) -> String {
        String::from_utf8(
            hyper::body::to_bytes(response.into_body())
                .await
                .unwrap()
                .to_vec(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn ok() {
        let response = request("/?foo=a%20b&bar=123").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert_eq!(&body[..], "foo: Some(\"a b\") bar: Some(123)");
    }

    #[tokio::test]
    async fn no_query() {
        let response = request("/").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert_eq!(&body[..], "foo: None bar: None");
    }

    #[tokio::test]
    async fn invalid_bar() {
        let response = request("/?bar=abc").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_string(response).await;
        let re = Regex::new(r".*invalid value for query parameter bar: invalid digit.*").unwrap();
        assert!(re.is_match(&body[..]), "body: {body}")
    }

    #[test]
    fn empty_values_are_absent() {
        let params = QueryParams::parse("formula=&nsites_min=");
        assert_eq!(None, params.get("formula"));
        assert!(!params.contains("formula"));
        assert_eq!(None, params.get_parsed::<i64>("nsites_min").unwrap());
        assert_eq!(vec!["formula", "nsites_min"], params.names());
    }

    #[test]
    fn last_value_wins() {
        let params = QueryParams::parse("limit=5&limit=7");
        assert_eq!(Some(7), params.get_parsed::<i64>("limit").unwrap());
        assert_eq!(vec!["limit"], params.names());
    }

    #[test]
    fn lists() {
        let params = QueryParams::from_pairs([("task_ids", " mp-1, mp-2,,")]);
        assert_eq!(
            Some(vec!["mp-1".to_string(), "mp-2".to_string()]),
            params.get_list("task_ids")
        );
        assert_eq!(None, params.get_list("fields"));
    }

    #[test]
    fn booleans() {
        let params = QueryParams::from_pairs([("a", "True"), ("b", "0"), ("c", "maybe")]);
        assert_eq!(Some(true), params.get_bool("a").unwrap());
        assert_eq!(Some(false), params.get_bool("b").unwrap());
        assert_eq!(None, params.get_bool("d").unwrap());
        assert!(matches!(
            params.get_bool("c"),
            Err(ApiError::InvalidParameter { .. })
        ));
    }
}
