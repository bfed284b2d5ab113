// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use async_graphql::{ObjectType, Schema, ServerError, SubscriptionType, Variables};
use async_trait::async_trait;
use serde_json::Value;

use crate::context::ViewRequest;
use crate::document::Document;
use crate::error::{ExecutionError, GraphQLError, PathSegment};
use crate::schema::{ExecutionRequest, ExecutionResult, GraphQLSchema};

/// Adjusts an `async_graphql` request before it runs, for example to attach data derived from the
/// HTTP request.
pub trait RequestMiddleware: Send + Sync {
    fn prepare(
        &self,
        request: async_graphql::Request,
        context: &ViewRequest,
    ) -> async_graphql::Request;
}

/// Serves an `async_graphql` schema. The [`ViewRequest`] is available to resolvers as context
/// data.
pub struct AsyncGraphQLSchema<Query, Mutation, Subscription> {
    schema: Schema<Query, Mutation, Subscription>,
}

impl<Query, Mutation, Subscription> AsyncGraphQLSchema<Query, Mutation, Subscription> {
    pub fn new(schema: Schema<Query, Mutation, Subscription>) -> Self {
        Self { schema }
    }
}

#[async_trait]
impl<Query, Mutation, Subscription> GraphQLSchema
    for AsyncGraphQLSchema<Query, Mutation, Subscription>
where
    Query: ObjectType + 'static,
    Mutation: ObjectType + 'static,
    Subscription: SubscriptionType + 'static,
{
    type RootValue = ();
    type Middleware = Arc<dyn RequestMiddleware>;

    async fn execute(
        &self,
        document: &Document,
        request: ExecutionRequest<'_, Self::RootValue, Self::Middleware>,
    ) -> Result<ExecutionResult, ExecutionError> {
        let mut graphql_request = async_graphql::Request::new(document.source());

        if let Some(operation_name) = request.operation_name {
            graphql_request = graphql_request.operation_name(operation_name);
        }
        if let Some(variables) = request.variables {
            graphql_request =
                graphql_request.variables(Variables::from_json(Value::Object(variables.clone())));
        }
        graphql_request = graphql_request.data(request.context.clone());

        for middleware in request.middleware {
            graphql_request = middleware.prepare(graphql_request, request.context);
        }

        let response = self.schema.execute(graphql_request).await;

        // Validation failures come back as null data with errors; nothing ran.
        let invalid =
            response.data == async_graphql::Value::Null && !response.errors.is_empty();

        let data = if invalid {
            None
        } else {
            Some(
                response
                    .data
                    .into_json()
                    .map_err(|e| ExecutionError::Other(e.into()))?,
            )
        };

        Ok(ExecutionResult {
            data,
            errors: response
                .errors
                .into_iter()
                .map(|error| ExecutionError::GraphQL(server_error(error)))
                .collect(),
            invalid,
        })
    }
}

fn server_error(error: ServerError) -> GraphQLError {
    let path = error
        .path
        .into_iter()
        .map(|segment| match segment {
            async_graphql::PathSegment::Field(name) => PathSegment::Field(name),
            async_graphql::PathSegment::Index(index) => PathSegment::Index(index),
        })
        .collect();

    let extensions = error
        .extensions
        .and_then(|extensions| serde_json::to_value(extensions).ok())
        .and_then(|extensions| match extensions {
            Value::Object(extensions) if !extensions.is_empty() => Some(extensions),
            _ => None,
        });

    GraphQLError {
        message: error.message,
        locations: error.locations.into_iter().map(Into::into).collect(),
        path,
        extensions,
    }
}
