// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_graphql_parser::types::OperationType;
use tracing::instrument;

use crate::config::ViewConfig;
use crate::context::ViewRequest;
use crate::error::{ExecutionError, GraphQLError, ViewError};
use crate::params::GraphQLParams;
use crate::schema::{ExecutionRequest, ExecutionResult, GraphQLSchema};
use crate::validation::check_document_validators;

/// What happened to a request that made it past the pre-execution checks.
#[derive(Debug)]
pub enum ExecutionOutcome {
    Executed(ExecutionResult),
    ParseFailed(GraphQLError),
    ExecutionFailed(ExecutionError),
    /// Nothing ran, so that GraphiQL can show the request to the user instead.
    NotExecuted,
}

impl ExecutionOutcome {
    pub fn into_result(self) -> Option<ExecutionResult> {
        match self {
            ExecutionOutcome::Executed(result) => Some(result),
            ExecutionOutcome::ParseFailed(error) => Some(ExecutionResult::invalid(error)),
            ExecutionOutcome::ExecutionFailed(error) => Some(ExecutionResult::invalid(error)),
            ExecutionOutcome::NotExecuted => None,
        }
    }
}

/// Parse, check and execute one request.
///
/// Parse and execution failures are part of the outcome. Missing queries, mutations over GET and
/// rejected documents are returned as faults, except that when GraphiQL is shown the first two
/// simply leave the request unexecuted.
#[instrument(
    name = "execution::execute_graphql_request"
    skip_all
    fields(operation_name = ?params.operation_name)
)]
pub async fn execute_graphql_request<S: GraphQLSchema>(
    config: &ViewConfig<S>,
    request: &ViewRequest,
    params: &GraphQLParams,
    show_graphiql: bool,
) -> Result<ExecutionOutcome, ViewError> {
    let query = match params.query.as_deref() {
        Some(query) => query,
        None if show_graphiql => return Ok(ExecutionOutcome::NotExecuted),
        None => return Err(ViewError::MissingQuery),
    };

    let document = match config.schema.parse(query) {
        Ok(document) => document,
        Err(error) => {
            tracing::debug!("Query failed to parse: {}", error);
            return Ok(ExecutionOutcome::ParseFailed(error));
        }
    };

    if request.is_read_only() {
        let operation_type = document
            .operation_type(params.operation_name.as_deref())
            .filter(|operation_type| *operation_type != OperationType::Query);

        if let Some(operation_type) = operation_type {
            if show_graphiql {
                return Ok(ExecutionOutcome::NotExecuted);
            }

            return Err(ViewError::MethodNotAllowed {
                method: request.method.clone(),
                operation_type: operation_type.to_string(),
            });
        }
    }

    check_document_validators(&config.validators, &document, request)?;

    let execution_request = ExecutionRequest {
        root_value: config.root_value.as_ref(),
        variables: params.variables.as_ref(),
        operation_name: params.operation_name.as_deref(),
        context: request,
        middleware: &config.middleware,
    };

    match config.schema.execute(&document, execution_request).await {
        Ok(result) => Ok(ExecutionOutcome::Executed(result)),
        Err(error) => {
            tracing::warn!("Query execution failed: {}", error);
            Ok(ExecutionOutcome::ExecutionFailed(error))
        }
    }
}
