// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_graphql_parser::Pos;
use common::EnvError;
use common::http::Headers;
use graphiql::GraphiQLError;
use http::StatusCode;
use serde::Serialize;
use serde_json::{Map, Value, json};
use thiserror::Error;

const DEFAULT_INVALID_DOCUMENT_MESSAGE: &str = "The query document is invalid.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ErrorLocation {
    pub line: usize,
    pub column: usize,
}

impl From<Pos> for ErrorLocation {
    fn from(pos: Pos) -> Self {
        Self {
            line: pos.line,
            column: pos.column,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

/// An error reported by the GraphQL engine itself, with enough structure to point the client at the
/// offending part of the document.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct GraphQLError {
    pub message: String,
    pub locations: Vec<ErrorLocation>,
    pub path: Vec<PathSegment>,
    pub extensions: Option<Map<String, Value>>,
}

impl GraphQLError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: vec![],
            path: vec![],
            extensions: None,
        }
    }

    pub fn with_locations(mut self, locations: impl IntoIterator<Item = Pos>) -> Self {
        self.locations = locations.into_iter().map(ErrorLocation::from).collect();
        self
    }

    pub fn with_path(mut self, path: Vec<PathSegment>) -> Self {
        self.path = path;
        self
    }
}

impl From<async_graphql_parser::Error> for GraphQLError {
    fn from(error: async_graphql_parser::Error) -> Self {
        GraphQLError::new(error.to_string()).with_locations(error.positions())
    }
}

/// Anything that may go wrong while parsing or executing a document.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error(transparent)]
    GraphQL(#[from] GraphQLError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// One element of the `errors` list of a response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEntry {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<ErrorLocation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<PathSegment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Map<String, Value>>,
}

impl ErrorEntry {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: vec![],
            path: vec![],
            extensions: None,
        }
    }
}

/// Engine errors keep their locations, path and extensions; everything else is reduced to its
/// message.
pub fn format_error(error: &ExecutionError) -> ErrorEntry {
    match error {
        ExecutionError::GraphQL(error) => ErrorEntry {
            message: error.message.clone(),
            locations: error.locations.clone(),
            path: error.path.clone(),
            extensions: error.extensions.clone(),
        },
        ExecutionError::Other(error) => ErrorEntry::message(error.to_string()),
    }
}

/// Faults that abort a request (or, in batch mode, a single entry) before a result is produced.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("Must provide query string.")]
    MissingQuery,

    #[error("Variables are invalid JSON.")]
    InvalidVariables,

    #[error("Can only perform a {operation_type} operation from a POST request.")]
    MethodNotAllowed {
        method: http::Method,
        operation_type: String,
    },

    #[error("{}", .0.as_deref().unwrap_or(DEFAULT_INVALID_DOCUMENT_MESSAGE))]
    InvalidDocument(Option<String>),

    #[error("Batch requests should receive a list, but received {0}.")]
    BatchNotList(Value),

    #[error("JSON parse error - {0}")]
    MalformedBody(String),

    #[error("Unsupported media type \"{0}\" in request.")]
    UnsupportedMediaType(String),

    #[error("Method \"{0}\" not allowed.")]
    UnsupportedMethod(http::Method),

    #[error("Authentication credentials were not provided.")]
    NotAuthenticated,

    #[error("You do not have permission to perform this action.")]
    PermissionDenied,

    #[error("Request was throttled.{}", wait_suffix(.wait))]
    Throttled { wait: Option<u64> },

    #[error("Unable to render GraphiQL.")]
    GraphiQL(#[from] GraphiQLError),
}

fn wait_suffix(wait: &Option<u64>) -> String {
    match wait {
        Some(1) => " Expected available in 1 second.".to_string(),
        Some(wait) => format!(" Expected available in {wait} seconds."),
        None => String::new(),
    }
}

impl ViewError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ViewError::MissingQuery
            | ViewError::InvalidVariables
            | ViewError::InvalidDocument(_)
            | ViewError::BatchNotList(_)
            | ViewError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ViewError::MethodNotAllowed { .. } | ViewError::UnsupportedMethod(_) => {
                StatusCode::METHOD_NOT_ALLOWED
            }
            ViewError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ViewError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            ViewError::PermissionDenied => StatusCode::FORBIDDEN,
            ViewError::Throttled { .. } => StatusCode::TOO_MANY_REQUESTS,
            ViewError::GraphiQL(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Headers that must accompany the fault response.
    pub fn headers(&self) -> Headers {
        let mut headers = Headers::new();
        match self {
            ViewError::MethodNotAllowed { .. } => {
                headers.insert("allow".into(), "POST".into());
            }
            ViewError::UnsupportedMethod(_) => {
                headers.insert("allow".into(), "GET, POST".into());
            }
            ViewError::Throttled { wait: Some(wait) } => {
                headers.insert("retry-after".into(), wait.to_string());
            }
            _ => {}
        }
        headers
    }

    pub fn to_entry(&self) -> ErrorEntry {
        ErrorEntry::message(self.to_string())
    }

    /// The `{"errors": [{"message": ...}]}` envelope shared by every fault.
    pub fn to_envelope(&self) -> Value {
        json!({ "errors": [self.to_entry()] })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Use either graphiql or batch processing")]
    GraphiQLWithBatch,

    #[error(transparent)]
    Env(#[from] EnvError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_keep_their_structure() {
        let error = ExecutionError::GraphQL(
            GraphQLError::new("Unknown field \"titel\"")
                .with_locations([Pos { line: 1, column: 3 }])
                .with_path(vec![
                    PathSegment::Field("books".into()),
                    PathSegment::Index(0),
                ]),
        );

        insta::assert_json_snapshot!(format_error(&error), @r#"
        {
          "message": "Unknown field \"titel\"",
          "locations": [
            {
              "line": 1,
              "column": 3
            }
          ],
          "path": [
            "books",
            0
          ]
        }
        "#);
    }

    #[test]
    fn other_errors_are_reduced_to_message() {
        let error = ExecutionError::Other(anyhow::anyhow!("connection reset"));

        assert_eq!(
            serde_json::to_value(format_error(&error)).unwrap(),
            json!({"message": "connection reset"})
        );
    }

    #[test]
    fn fault_envelopes() {
        assert_eq!(
            ViewError::MissingQuery.to_envelope(),
            json!({"errors": [{"message": "Must provide query string."}]})
        );
        assert_eq!(
            ViewError::InvalidDocument(None).to_string(),
            "The query document is invalid."
        );
        assert_eq!(
            ViewError::InvalidDocument(Some("Too deep.".into())).to_string(),
            "Too deep."
        );

        let method_not_allowed = ViewError::MethodNotAllowed {
            method: http::Method::GET,
            operation_type: "mutation".into(),
        };
        assert_eq!(
            method_not_allowed.to_string(),
            "Can only perform a mutation operation from a POST request."
        );
        assert_eq!(method_not_allowed.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            method_not_allowed.headers().get("allow"),
            Some("POST".to_string())
        );
    }

    #[test]
    fn throttle_message() {
        let throttled = ViewError::Throttled { wait: Some(42) };
        assert_eq!(
            throttled.to_string(),
            "Request was throttled. Expected available in 42 seconds."
        );
        assert_eq!(throttled.headers().get("retry-after"), Some("42".into()));
        assert_eq!(throttled.status_code(), StatusCode::TOO_MANY_REQUESTS);

        assert_eq!(
            ViewError::Throttled { wait: Some(1) }.to_string(),
            "Request was throttled. Expected available in 1 second."
        );
        assert_eq!(
            ViewError::Throttled { wait: None }.to_string(),
            "Request was throttled."
        );
    }
}
