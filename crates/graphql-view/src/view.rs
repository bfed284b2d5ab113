// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use async_trait::async_trait;
use common::http::{
    Headers, RequestHead, RequestPayload, ResponseBody, ResponsePayload, strip_trailing_slash,
};
use common::router::Router;
use futures::future::join_all;
use graphiql::GraphiQLContext;
use http::StatusCode;
use serde_json::Value;
use tracing::instrument;

use crate::body::parse_body;
use crate::config::{Executor, ViewConfig};
use crate::context::ViewRequest;
use crate::error::ViewError;
use crate::execution::execute_graphql_request;
use crate::negotiation::{ResponseFormat, negotiate};
use crate::params::{get_graphql_params, get_request_id, raw_requested};
use crate::response::{
    GraphQLResponse, aggregate_status, fault_response, json_bytes, json_response, shape_response,
};
use crate::schema::GraphQLSchema;

/// Serves GraphQL requests for one schema at one path.
pub struct GraphQLView<S: GraphQLSchema> {
    config: Arc<ViewConfig<S>>,
}

impl<S: GraphQLSchema> GraphQLView<S> {
    pub fn new(config: ViewConfig<S>) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ViewConfig<S> {
        &self.config
    }

    fn suitable(&self, request_head: &(dyn RequestHead + Send + Sync)) -> bool {
        strip_trailing_slash(&request_head.get_path())
            == strip_trailing_slash(&self.config.http_path)
    }

    /// Whether the request asks for pretty-printed JSON, either through configuration or a
    /// non-empty `pretty` query parameter.
    pub fn pretty(&self, request: &ViewRequest) -> bool {
        self.config.pretty
            || request
                .query_param("pretty")
                .map(|pretty| match pretty {
                    Value::String(pretty) => !pretty.is_empty(),
                    Value::Null | Value::Bool(false) => false,
                    _ => true,
                })
                .unwrap_or(false)
    }

    /// Handle a request whose body has already been decoded.
    pub async fn process_request(&self, request: &ViewRequest, data: Value) -> ResponsePayload {
        self.respond(request, move || Ok(data)).await
    }

    /// The body is decoded only once the method and the guards have accepted the request.
    #[instrument(
        name = "GraphQLView::respond"
        skip_all
        fields(method = %request.method, path = %request.path)
    )]
    async fn respond(
        &self,
        request: &ViewRequest,
        decode_body: impl FnOnce() -> Result<Value, ViewError> + Send,
    ) -> ResponsePayload {
        let pretty = self.pretty(request);

        match self.try_process_request(request, decode_body, pretty).await {
            Ok(response) => response,
            Err(error) => {
                tracing::debug!("Request failed: {}", error);
                fault_response(&error, pretty)
            }
        }
    }

    async fn try_process_request(
        &self,
        request: &ViewRequest,
        decode_body: impl FnOnce() -> Result<Value, ViewError> + Send,
        pretty: bool,
    ) -> Result<ResponsePayload, ViewError> {
        if request.method != http::Method::GET && request.method != http::Method::POST {
            return Err(ViewError::UnsupportedMethod(request.method.clone()));
        }

        for guard in &self.config.guards {
            guard.check(request)?;
        }

        let data = &decode_body()?;

        let format = negotiate(&request.query, request.header("accept").as_deref());
        let show_graphiql = self.config.graphiql
            && format == ResponseFormat::Html
            && !raw_requested(&request.query, data);

        if self.config.batch {
            let (results, status_code) = self.batch_responses(request, data).await?;
            return Ok(self.render_json(&results, status_code, pretty));
        }

        let (result, status_code) =
            get_response(&self.config, request, data, show_graphiql).await?;

        if show_graphiql {
            self.render_graphiql(request, data, result.as_ref())
        } else {
            Ok(self.render_json(&result, status_code, pretty))
        }
    }

    async fn batch_responses(
        &self,
        request: &ViewRequest,
        data: &Value,
    ) -> Result<(Vec<GraphQLResponse>, StatusCode), ViewError> {
        let Value::Array(entries) = data else {
            return Err(ViewError::BatchNotList(data.clone()));
        };

        let responses = match self.config.executor {
            Executor::Sequential => {
                let mut responses = Vec::with_capacity(entries.len());
                for entry in entries {
                    responses.push(self.batch_entry(request, entry).await);
                }
                responses
            }
            Executor::Concurrent => {
                join_all(
                    entries
                        .iter()
                        .map(|entry| self.batch_entry(request, entry)),
                )
                .await
            }
        };

        let status_code = aggregate_status(responses.iter().map(|(_, status_code)| *status_code));
        let results = responses.into_iter().map(|(response, _)| response).collect();

        Ok((results, status_code))
    }

    /// A fault in one entry is reported in that entry, the rest of the batch still runs.
    async fn batch_entry(
        &self,
        request: &ViewRequest,
        entry: &Value,
    ) -> (GraphQLResponse, StatusCode) {
        let id = || get_request_id(&request.query, entry).unwrap_or(Value::Null);

        match get_response(&self.config, request, entry, false).await {
            Ok((Some(response), status_code)) => (response, status_code),
            Ok((None, status_code)) => (
                GraphQLResponse {
                    errors: None,
                    data: None,
                    id: Some(id()),
                    status: Some(status_code.as_u16()),
                },
                status_code,
            ),
            Err(error) => {
                tracing::debug!("Batch entry failed: {}", error);
                (
                    GraphQLResponse::batch_fault(&error, Some(id())),
                    error.status_code(),
                )
            }
        }
    }

    fn render_json<T: serde::Serialize>(
        &self,
        body: &T,
        status_code: StatusCode,
        pretty: bool,
    ) -> ResponsePayload {
        match json_bytes(body, pretty) {
            Ok(bytes) => json_response(bytes, status_code),
            Err(e) => {
                tracing::error!("Unable to serialize response: {}", e);
                ResponsePayload {
                    body: ResponseBody::None,
                    headers: Headers::new(),
                    status_code: StatusCode::INTERNAL_SERVER_ERROR,
                }
            }
        }
    }

    fn render_graphiql(
        &self,
        request: &ViewRequest,
        data: &Value,
        result: Option<&GraphQLResponse>,
    ) -> Result<ResponsePayload, ViewError> {
        let params = get_graphql_params(&request.query, data)?;

        let context = GraphiQLContext {
            assets: self.config.graphiql_assets.clone(),
            subscription_path: self.config.subscription_path.clone(),
            graphiql_header_editor_enabled: self.config.graphiql_header_editor_enabled,
            query: params.query.unwrap_or_default(),
            variables: to_json(&params.variables),
            operation_name: params.operation_name.unwrap_or_default(),
            result: to_json(&result),
        };

        let page = graphiql::render(&context)?;

        let mut headers = Headers::new();
        headers.insert("content-type".into(), "text/html; charset=utf-8".into());

        Ok(ResponsePayload {
            body: ResponseBody::Bytes(page.into_bytes()),
            headers,
            status_code: StatusCode::OK,
        })
    }
}

/// Extract, execute and shape one request (or one batch entry).
async fn get_response<S: GraphQLSchema>(
    config: &ViewConfig<S>,
    request: &ViewRequest,
    data: &Value,
    show_graphiql: bool,
) -> Result<(Option<GraphQLResponse>, StatusCode), ViewError> {
    let params = get_graphql_params(&request.query, data)?;

    let outcome = execute_graphql_request(config, request, &params, show_graphiql).await?;

    Ok(shape_response(outcome.into_result(), params.id, config.batch))
}

/// Echoed into GraphiQL's editors; absent values become `null`.
fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

#[async_trait]
impl<S: GraphQLSchema> Router for GraphQLView<S> {
    async fn route(
        &self,
        request: &(dyn RequestPayload + Send + Sync),
    ) -> Option<ResponsePayload> {
        let head = request.get_head();

        if !self.suitable(head) {
            return None;
        }

        let view_request = ViewRequest::from_head(head);
        let is_post = view_request.method == http::Method::POST;
        let content_type = view_request.header("content-type");
        let body = request.take_body();

        // Bodies of other methods are never read.
        let decode_body = move || {
            if is_post {
                parse_body(content_type.as_deref(), &body)
            } else {
                Ok(Value::Null)
            }
        };

        Some(self.respond(&view_request, decode_body).await)
    }
}
