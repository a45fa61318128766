//! This crate provides a REST API server for materials science data, and a client for it.
//!
//! Documents such as computed material properties live in document stores. Each route of the
//! API is a [resource](resource::Resource) combining a store, a document model and a list of
//! [query operators](query_operator::QueryOperator). Every operator maps the request parameters
//! it understands to a fragment of a MongoDB-style query; the fragments are merged and run
//! against the store, and the matching documents are returned in a `{"data", "meta"}` envelope.
//!
//! Chemical formulas are understood natively: `formula=Fe2O3`, anonymous formulas such as
//! `formula=ABC3` and wildcards such as `formula=Li*O3` are translated into criteria on the
//! reduced composition of each material.
//!
//! The server is built on top of a number of open source components.
//!
//! * [Tokio](tokio), the most popular asynchronous Rust runtime.
//! * [Axum](axum) web framework, built by the Tokio team, on top of the [hyper] HTTP library.
//! * [Serde](serde) performs (de)serialisation of JSON documents, configuration and responses.
//! * [sled] provides an embedded persistent document store.
//! * [reqwest] is used by the [client].

pub mod app;
pub mod app_state;
pub mod cli;
pub mod client;
pub mod composition;
pub mod config;
pub mod elements;
pub mod error;
pub mod formula;
pub mod metrics;
pub mod models;
pub mod openapi;
pub mod query;
pub mod query_operator;
pub mod query_operators;
pub mod query_params;
pub mod resource;
pub mod routes;
pub mod server;
pub mod store;
#[cfg(test)]
pub mod test_utils;
pub mod tracing;
