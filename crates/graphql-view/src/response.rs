// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use common::http::{Headers, ResponseBody, ResponsePayload};
use http::StatusCode;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ErrorEntry, ViewError, format_error};
use crate::schema::ExecutionResult;

/// The JSON body for one request (or one batch entry).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQLResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ErrorEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Batch mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Batch mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl GraphQLResponse {
    /// The batch entry reporting a fault raised while handling that entry.
    pub fn batch_fault(error: &ViewError, id: Option<Value>) -> Self {
        Self {
            errors: Some(vec![error.to_entry()]),
            data: None,
            id: Some(id.unwrap_or(Value::Null)),
            status: Some(error.status_code().as_u16()),
        }
    }
}

/// Turn an execution result into a response body and status.
///
/// No result (GraphiQL is shown instead) is `(None, 200)`. An invalid result is a 400 without
/// `data`; otherwise `data` is always present, possibly `null`.
pub fn shape_response(
    result: Option<ExecutionResult>,
    id: Option<Value>,
    batch: bool,
) -> (Option<GraphQLResponse>, StatusCode) {
    let Some(result) = result else {
        return (None, StatusCode::OK);
    };

    let status_code = if result.invalid {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    };

    let errors = (!result.errors.is_empty())
        .then(|| result.errors.iter().map(format_error).collect());

    let data = (!result.invalid).then(|| result.data.unwrap_or(Value::Null));

    let (id, status) = if batch {
        (
            Some(id.unwrap_or(Value::Null)),
            Some(status_code.as_u16()),
        )
    } else {
        (None, None)
    };

    (
        Some(GraphQLResponse {
            errors,
            data,
            id,
            status,
        }),
        status_code,
    )
}

/// The status of a whole batch: the highest entry status, or 200 for an empty batch.
pub fn aggregate_status(statuses: impl IntoIterator<Item = StatusCode>) -> StatusCode {
    statuses
        .into_iter()
        .max_by_key(StatusCode::as_u16)
        .unwrap_or(StatusCode::OK)
}

/// Serialize `body` as JSON, indented by two spaces when `pretty` is set.
pub fn json_bytes<T: Serialize>(body: &T, pretty: bool) -> Result<Vec<u8>, serde_json::Error> {
    if pretty {
        serde_json::to_vec_pretty(body)
    } else {
        serde_json::to_vec(body)
    }
}

pub fn json_response(body: Vec<u8>, status_code: StatusCode) -> ResponsePayload {
    let mut headers = Headers::new();
    headers.insert("content-type".into(), "application/json".into());

    ResponsePayload {
        body: ResponseBody::Bytes(body),
        headers,
        status_code,
    }
}

/// The `{"errors": [...]}` response for a fault, with whatever headers the fault requires.
pub fn fault_response(error: &ViewError, pretty: bool) -> ResponsePayload {
    let body = json_bytes(&error.to_envelope(), pretty).unwrap_or_else(|e| {
        tracing::error!("Unable to serialize error response: {}", e);
        br#"{"errors": [{"message": "Internal server error"}]}"#.to_vec()
    });

    let mut response = json_response(body, error.status_code());
    for (key, value) in error.headers() {
        response.headers.insert(key, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::{ExecutionError, GraphQLError};

    fn shaped(result: ExecutionResult, batch: bool) -> (Value, StatusCode) {
        let (response, status) = shape_response(Some(result), Some(json!("q1")), batch);
        (serde_json::to_value(response.unwrap()).unwrap(), status)
    }

    #[test]
    fn successful_result_has_no_errors() {
        let (body, status) = shaped(ExecutionResult::data(json!({"books": []})), false);

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"data": {"books": []}}));
    }

    #[test]
    fn partial_failure_keeps_data() {
        let result = ExecutionResult {
            data: Some(json!({"book": null})),
            errors: vec![ExecutionError::GraphQL(GraphQLError::new("Not found"))],
            invalid: false,
        };

        let (body, status) = shaped(result, false);

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"errors": [{"message": "Not found"}], "data": {"book": null}})
        );
    }

    #[test]
    fn invalid_result_has_no_data() {
        let (body, status) = shaped(
            ExecutionResult::invalid(GraphQLError::new("Syntax Error")),
            false,
        );

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"errors": [{"message": "Syntax Error"}]}));
    }

    #[test]
    fn valid_result_without_data_reports_null() {
        let (body, _) = shaped(ExecutionResult::default(), false);
        assert_eq!(body, json!({"data": null}));
    }

    #[test]
    fn batch_entries_carry_id_and_status() {
        let (body, _) = shaped(ExecutionResult::data(json!({"a": 1})), true);
        insta::assert_json_snapshot!(body, @r#"
        {
          "data": {
            "a": 1
          },
          "id": "q1",
          "status": 200
        }
        "#);

        let fault = GraphQLResponse::batch_fault(&ViewError::MissingQuery, None);
        assert_eq!(
            serde_json::to_value(fault).unwrap(),
            json!({"errors": [{"message": "Must provide query string."}], "id": null, "status": 400})
        );
    }

    #[test]
    fn no_result() {
        assert_eq!(shape_response(None, None, false), (None, StatusCode::OK));
    }

    #[test]
    fn batch_status_is_the_maximum() {
        assert_eq!(aggregate_status(Vec::new()), StatusCode::OK);
        assert_eq!(
            aggregate_status([StatusCode::OK, StatusCode::BAD_REQUEST, StatusCode::OK]),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            aggregate_status([StatusCode::METHOD_NOT_ALLOWED, StatusCode::BAD_REQUEST]),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[test]
    fn fault_responses() {
        let response = fault_response(&ViewError::Throttled { wait: Some(3) }, true);

        assert_eq!(response.status_code, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers.get("retry-after"), Some("3".to_string()));
        assert_eq!(
            response.headers.get("content-type"),
            Some("application/json".to_string())
        );
        assert_eq!(
            std::str::from_utf8(response.body.as_bytes()).unwrap(),
            "{\n  \"errors\": [\n    {\n      \"message\": \"Request was throttled. Expected available in 3 seconds.\"\n    }\n  ]\n}"
        );
    }
}
