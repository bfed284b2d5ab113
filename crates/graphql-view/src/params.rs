// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde_json::{Map, Value};

use crate::error::ViewError;

/// The parameters of one GraphQL request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphQLParams {
    pub query: Option<String>,
    pub variables: Option<Map<String, Value>>,
    pub operation_name: Option<String>,
    /// Client-supplied identifier, echoed back in batch responses.
    pub id: Option<Value>,
}

/// Extract the request parameters, preferring the query string over the body.
///
/// Empty values (`""`, `null`, `{}`, ...) count as absent, so an empty query-string parameter
/// falls through to the body. A body that isn't an object contributes nothing.
pub fn get_graphql_params(
    query_string: &Map<String, Value>,
    body: &Value,
) -> Result<GraphQLParams, ViewError> {
    let param = |key: &str| lookup(query_string, body, key);

    let query = param("query").map(value_to_string);

    let variables = match param("variables") {
        Some(Value::String(variables)) => decode_variables(
            serde_json::from_str(variables).map_err(|_| ViewError::InvalidVariables)?,
        )?,
        Some(variables) => decode_variables(variables.clone())?,
        None => None,
    };

    // Some clients send the literal string "null" when no operation is selected.
    let operation_name = param("operationName")
        .map(value_to_string)
        .filter(|operation_name| operation_name != "null");

    let id = get_request_id(query_string, body);

    Ok(GraphQLParams {
        query,
        variables,
        operation_name,
        id,
    })
}

/// The client-supplied request id, looked up like the other parameters. Available even when the
/// rest of the parameters don't decode.
pub fn get_request_id(query_string: &Map<String, Value>, body: &Value) -> Option<Value> {
    lookup(query_string, body, "id").cloned()
}

fn lookup<'a>(
    query_string: &'a Map<String, Value>,
    body: &'a Value,
    key: &str,
) -> Option<&'a Value> {
    [
        query_string.get(key),
        body.as_object().and_then(|body| body.get(key)),
    ]
    .into_iter()
    .flatten()
    .find(|value| is_present(value))
}

/// Whether the request asks for the raw JSON response instead of the interactive tool.
pub fn raw_requested(query_string: &Map<String, Value>, body: &Value) -> bool {
    query_string.contains_key("raw")
        || body
            .as_object()
            .map(|body| body.contains_key("raw"))
            .unwrap_or(false)
}

fn decode_variables(variables: Value) -> Result<Option<Map<String, Value>>, ViewError> {
    match variables {
        Value::Object(variables) if variables.is_empty() => Ok(None),
        Value::Object(variables) => Ok(Some(variables)),
        Value::Null => Ok(None),
        _ => Err(ViewError::InvalidVariables),
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
