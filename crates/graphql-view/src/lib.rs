// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Serves a GraphQL schema over HTTP without depending on any specific web framework.
//!
//! A [`GraphQLView`] takes a request (through the [`common::router::Router`] interface or
//! [`GraphQLView::process_request`]), extracts the GraphQL parameters, runs the admission checks
//! and hands the document to a [`GraphQLSchema`]. The result is returned as JSON, or as the
//! GraphiQL page when a browser asks for it.

pub mod body;
mod config;
mod context;
mod document;
mod error;
mod execution;
mod guard;
mod negotiation;
mod params;
mod response;
mod schema;
mod validation;
mod view;

#[cfg(feature = "async-graphql")]
mod async_graphql_schema;

#[cfg(test)]
mod test_support;

pub use config::{Executor, ViewConfig, ViewConfigBuilder};
pub use context::ViewRequest;
pub use document::Document;
pub use error::{
    ConfigError, ErrorEntry, ErrorLocation, ExecutionError, GraphQLError, PathSegment, ViewError,
    format_error,
};
pub use execution::{ExecutionOutcome, execute_graphql_request};
pub use guard::{Rate, RateThrottle, RequestGuard, ThrottleKey};
pub use negotiation::{ResponseFormat, negotiate};
pub use params::{GraphQLParams, get_graphql_params, get_request_id};
pub use response::{GraphQLResponse, fault_response};
pub use schema::{ExecutionRequest, ExecutionResult, GraphQLSchema};
pub use validation::{
    DisableIntrospectionValidator, DocumentDepthValidator, DocumentValidator,
    check_document_validators,
};
pub use view::GraphQLView;

#[cfg(feature = "async-graphql")]
pub use async_graphql_schema::{AsyncGraphQLSchema, RequestMiddleware};
