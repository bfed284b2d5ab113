// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::context::ViewRequest;
use crate::document::Document;
use crate::error::{ExecutionError, GraphQLError};

/// The GraphQL engine a view delegates parsing and execution to.
#[async_trait]
pub trait GraphQLSchema: Send + Sync + 'static {
    type RootValue: Send + Sync;
    type Middleware: Send + Sync;

    fn parse(&self, query: &str) -> Result<Document, GraphQLError> {
        Document::parse(query)
    }

    /// Execute a parsed document. Errors raised while resolving may either be reported in the
    /// returned result or returned as `Err`; the view treats the latter as an invalid result.
    async fn execute(
        &self,
        document: &Document,
        request: ExecutionRequest<'_, Self::RootValue, Self::Middleware>,
    ) -> Result<ExecutionResult, ExecutionError>;
}

pub struct ExecutionRequest<'a, R, M> {
    pub root_value: Option<&'a R>,
    pub variables: Option<&'a Map<String, Value>>,
    pub operation_name: Option<&'a str>,
    pub context: &'a ViewRequest,
    pub middleware: &'a [M],
}

#[derive(Debug, Default)]
pub struct ExecutionResult {
    pub data: Option<Value>,
    pub errors: Vec<ExecutionError>,
    /// Set when the document could not run at all, as opposed to a partial failure.
    pub invalid: bool,
}

impl ExecutionResult {
    pub fn data(data: Value) -> Self {
        Self {
            data: Some(data),
            errors: vec![],
            invalid: false,
        }
    }

    pub fn invalid(error: impl Into<ExecutionError>) -> Self {
        Self {
            data: None,
            errors: vec![error.into()],
            invalid: true,
        }
    }
}
