// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! A small schema answering queries from a fixed JSON tree, and a request double to drive views
//! through the router interface.

use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_graphql_parser::Positioned;
use async_graphql_parser::types::{
    ExecutableDocument, Field, OperationDefinition, OperationType, Selection, SelectionSet,
};
use async_trait::async_trait;
use common::http::{Headers, RequestHead, RequestPayload};
use serde_json::{Map, Value, json};

use crate::context::ViewRequest;
use crate::document::Document;
use crate::error::{ExecutionError, GraphQLError, PathSegment};
use crate::schema::{ExecutionRequest, ExecutionResult, GraphQLSchema};

pub fn view_request(method: http::Method) -> ViewRequest {
    ViewRequest {
        method,
        path: "/graphql".to_string(),
        headers: Headers::new(),
        query: Map::new(),
        ip: None,
    }
}

/// Rewrites the resolved data.
pub type DataMiddleware = Arc<dyn Fn(&mut Value) + Send + Sync>;

/// Resolves selections by looking up fields in a JSON tree with `query` and `mutation` roots.
///
/// A field with an `id` argument picks the matching element of the plural list (`book(id: 1)`
/// reads `books`). Selecting `fail` makes the whole execution fail.
pub struct StaticSchema {
    root: Value,
    executions: AtomicUsize,
}

impl StaticSchema {
    pub fn new(root: Value) -> Self {
        Self {
            root,
            executions: AtomicUsize::new(0),
        }
    }

    pub fn catalog() -> Self {
        Self::new(json!({
            "query": {
                "books": [
                    {"id": 1, "title": "Dune", "author": {"name": "Frank Herbert"}},
                    {"id": 2, "title": "Emma", "author": {"name": "Jane Austen"}}
                ]
            },
            "mutation": {
                "addBook": {"id": 3, "title": "Emma"}
            }
        }))
    }

    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }
}

struct Resolver<'a> {
    executable: &'a ExecutableDocument,
    variables: Option<&'a Map<String, Value>>,
    errors: Vec<ExecutionError>,
}

impl Resolver<'_> {
    fn resolve_selection_set(
        &mut self,
        source: &Value,
        selection_set: &SelectionSet,
        path: &[PathSegment],
        output: &mut Map<String, Value>,
    ) -> Result<(), ExecutionError> {
        for selection in &selection_set.items {
            match &selection.node {
                Selection::Field(field) => {
                    let field = &field.node;
                    let key = field
                        .alias
                        .as_ref()
                        .unwrap_or(&field.name)
                        .node
                        .to_string();

                    let mut field_path = path.to_vec();
                    field_path.push(PathSegment::Field(key.clone()));

                    let value = self.resolve_field(source, field, &field_path)?;
                    output.insert(key, value);
                }
                Selection::InlineFragment(fragment) => {
                    self.resolve_selection_set(
                        source,
                        &fragment.node.selection_set.node,
                        path,
                        output,
                    )?;
                }
                Selection::FragmentSpread(spread) => {
                    let fragment = self
                        .executable
                        .fragments
                        .get(&spread.node.fragment_name.node)
                        .ok_or_else(|| {
                            GraphQLError::new(format!(
                                "Unknown fragment \"{}\".",
                                spread.node.fragment_name.node
                            ))
                        })?;
                    self.resolve_selection_set(
                        source,
                        &fragment.node.selection_set.node,
                        path,
                        output,
                    )?;
                }
            }
        }

        Ok(())
    }

    fn resolve_field(
        &mut self,
        source: &Value,
        field: &Field,
        path: &[PathSegment],
    ) -> Result<Value, ExecutionError> {
        let name = field.name.node.as_str();

        if name == "fail" {
            return Err(anyhow!("Resolver failed").into());
        }

        let id = field
            .arguments
            .iter()
            .find(|(argument, _)| argument.node.as_str() == "id")
            .map(|(_, value)| self.argument_value(&value.node));

        let value = match id {
            Some(id) => source
                .get(format!("{name}s"))
                .and_then(Value::as_array)
                .and_then(|items| items.iter().find(|item| item.get("id") == Some(&id))),
            None => source.get(name),
        };

        let Some(value) = value else {
            self.errors.push(ExecutionError::GraphQL(
                GraphQLError::new(format!("Cannot query field \"{name}\"."))
                    .with_locations([field.name.pos])
                    .with_path(path.to_vec()),
            ));
            return Ok(Value::Null);
        };

        self.complete(value, &field.selection_set, path)
    }

    fn complete(
        &mut self,
        value: &Value,
        selection_set: &Positioned<SelectionSet>,
        path: &[PathSegment],
    ) -> Result<Value, ExecutionError> {
        if selection_set.node.items.is_empty() {
            return Ok(value.clone());
        }

        match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    let mut item_path = path.to_vec();
                    item_path.push(PathSegment::Index(index));
                    self.complete(item, selection_set, &item_path)
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Value::Object(_) => {
                let mut output = Map::new();
                self.resolve_selection_set(value, &selection_set.node, path, &mut output)?;
                Ok(Value::Object(output))
            }
            _ => Ok(Value::Null),
        }
    }

    fn argument_value(&self, value: &async_graphql_value::Value) -> Value {
        match value {
            async_graphql_value::Value::Variable(name) => self
                .variables
                .and_then(|variables| variables.get(name.as_str()))
                .cloned()
                .unwrap_or(Value::Null),
            other => other
                .clone()
                .into_const()
                .and_then(|value| value.into_json().ok())
                .unwrap_or(Value::Null),
        }
    }
}

fn select_operation<'a>(
    document: &'a Document,
    operation_name: Option<&str>,
) -> Result<&'a OperationDefinition, GraphQLError> {
    let operations = document.operations();

    match operation_name {
        Some(operation_name) => operations
            .into_iter()
            .find(|(name, _)| *name == Some(operation_name))
            .map(|(_, operation)| operation)
            .ok_or_else(|| {
                GraphQLError::new(format!("Unknown operation named \"{operation_name}\"."))
            }),
        None => match operations.as_slice() {
            [(_, operation)] => Ok(*operation),
            _ => Err(GraphQLError::new(
                "Must provide operation name if query contains multiple operations.",
            )),
        },
    }
}

#[async_trait]
impl GraphQLSchema for StaticSchema {
    type RootValue = Value;
    type Middleware = DataMiddleware;

    async fn execute(
        &self,
        document: &Document,
        request: ExecutionRequest<'_, Self::RootValue, Self::Middleware>,
    ) -> Result<ExecutionResult, ExecutionError> {
        self.executions.fetch_add(1, Ordering::SeqCst);

        let operation = match select_operation(document, request.operation_name) {
            Ok(operation) => operation,
            Err(error) => return Ok(ExecutionResult::invalid(error)),
        };

        let root = request.root_value.unwrap_or(&self.root);
        let source = match operation.ty {
            OperationType::Query => root.get("query"),
            OperationType::Mutation => root.get("mutation"),
            OperationType::Subscription => None,
        }
        .cloned()
        .unwrap_or_else(|| json!({}));

        let mut resolver = Resolver {
            executable: document.executable(),
            variables: request.variables,
            errors: vec![],
        };

        let mut data = Map::new();
        resolver.resolve_selection_set(&source, &operation.selection_set.node, &[], &mut data)?;

        let mut data = Value::Object(data);
        for middleware in request.middleware {
            middleware(&mut data);
        }

        Ok(ExecutionResult {
            data: Some(data),
            errors: resolver.errors,
            invalid: false,
        })
    }
}

pub struct MockRequestPayload {
    method: http::Method,
    path: String,
    headers: Headers,
    query: Map<String, Value>,
    ip: Option<IpAddr>,
    body: Mutex<Vec<u8>>,
}

impl MockRequestPayload {
    pub fn new(method: http::Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            headers: Headers::new(),
            query: Map::new(),
            ip: None,
            body: Mutex::new(vec![]),
        }
    }

    pub fn get(query: &[(&str, &str)]) -> Self {
        Self::new(http::Method::GET, "/graphql").with_query(query)
    }

    pub fn post(body: Value) -> Self {
        Self::new(http::Method::POST, "/graphql").with_body("application/json", body.to_string())
    }

    pub fn with_query(mut self, query: &[(&str, &str)]) -> Self {
        for (key, value) in query {
            self.query
                .insert(key.to_string(), Value::String(value.to_string()));
        }
        self
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_ip(mut self, ip: &str) -> Self {
        self.ip = ip.parse().ok();
        self
    }

    pub fn with_body(self, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: Mutex::new(body.into()),
            ..self.with_header("content-type", content_type)
        }
    }
}

impl RequestHead for MockRequestPayload {
    fn get_headers(&self, key: &str) -> Vec<String> {
        self.headers
            .iter()
            .filter(|(k, _)| *k == key.to_lowercase())
            .map(|(_, v)| v.to_string())
            .collect()
    }

    fn get_all_headers(&self) -> Headers {
        self.headers.clone()
    }

    fn get_ip(&self) -> Option<IpAddr> {
        self.ip
    }

    fn get_path(&self) -> String {
        self.path.clone()
    }

    fn get_query(&self) -> Value {
        Value::Object(self.query.clone())
    }

    fn get_method(&self) -> http::Method {
        self.method.clone()
    }
}

impl RequestPayload for MockRequestPayload {
    fn get_head(&self) -> &(dyn RequestHead + Send + Sync) {
        self
    }

    fn take_body(&self) -> Vec<u8> {
        std::mem::take(&mut *self.body.lock().unwrap())
    }
}
