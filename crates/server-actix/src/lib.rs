// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

pub mod catalog;
mod request;

use std::sync::{Arc, Mutex};

use actix_web::{
    HttpRequest, HttpResponse,
    web::{self, ServiceConfig},
};
use common::env::{EnvError, Environment};
use common::env_const::{get_batch_http_path, get_graphql_http_path};
use common::http::{ResponseBody, ResponsePayload};
use common::router::{CompositeRouter, Router};
use graphql_view::{ConfigError, GraphQLView, ViewConfigBuilder};
use serde_json::{Map, Value};
use thiserror::Error;

use request::{ActixRequestHead, ActixRequestPayload};

macro_rules! error_msg {
    ($msg:literal) => {
        concat!("{\"errors\": [{\"message\":\"", $msg, "\"}]}").as_bytes()
    };
}

#[derive(Error, Debug)]
pub enum ServerInitError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Env(#[from] EnvError),
}

/// The catalog served at the GraphQL path (with GraphiQL) and at the batch path.
pub fn create_router(env: &dyn Environment) -> Result<CompositeRouter, ServerInitError> {
    let schema = Arc::new(catalog::schema());

    let graphql_config = ViewConfigBuilder::from_shared(schema.clone())
        .http_path(get_graphql_http_path(env))
        .graphiql(true)
        .with_env(env)?
        .build()?;

    let batch_config = ViewConfigBuilder::from_shared(schema)
        .http_path(get_batch_http_path(env))
        .with_env(env)?
        .graphiql(false)
        .batch(true)
        .build()?;

    Ok(CompositeRouter::new(vec![
        Box::new(GraphQLView::new(graphql_config)),
        Box::new(GraphQLView::new(batch_config)),
    ]))
}

pub fn configure_router(router: web::Data<CompositeRouter>) -> impl FnOnce(&mut ServiceConfig) {
    move |app| {
        app.app_data(router).default_service(web::to(resolve));
    }
}

async fn resolve(
    http_request: HttpRequest,
    body: web::Bytes,
    router: web::Data<CompositeRouter>,
) -> HttpResponse {
    let query = match query_map(http_request.query_string()) {
        Ok(query) => query,
        Err(err) => {
            tracing::debug!("Invalid query string: {}", err);
            return HttpResponse::BadRequest().body(error_msg!("Invalid query string"));
        }
    };

    let head = match ActixRequestHead::from_request(&http_request, query) {
        Ok(head) => head,
        Err(err) => {
            tracing::error!("Unsupported method: {}", err);
            return HttpResponse::MethodNotAllowed().body(error_msg!("Unsupported method"));
        }
    };

    let request = ActixRequestPayload {
        head,
        body: Mutex::new(body.to_vec()),
    };

    match router.route(&request).await {
        Some(response) => to_http_response(response),
        None => HttpResponse::InternalServerError().body(error_msg!("Error resolving request")),
    }
}

fn query_map(query_string: &str) -> Result<Value, serde_urlencoded::de::Error> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query_string)?;

    let mut query = Map::new();
    for (key, value) in pairs {
        // The first occurrence of a repeated parameter wins.
        query.entry(key).or_insert(Value::String(value));
    }

    Ok(Value::Object(query))
}

fn to_http_response(response: ResponsePayload) -> HttpResponse {
    let ResponsePayload {
        body,
        headers,
        status_code,
    } = response;

    let actix_status_code = match to_actix_status_code(status_code) {
        Ok(status_code) => status_code,
        Err(err) => {
            tracing::error!("Invalid status code: {}", err);
            return HttpResponse::InternalServerError().body(error_msg!("Invalid status code"));
        }
    };

    let mut builder = HttpResponse::build(actix_status_code);

    for header in headers.into_iter() {
        builder.append_header(header);
    }

    match body {
        ResponseBody::Bytes(bytes) => builder.body(bytes),
        ResponseBody::None => builder.body(""),
    }
}

fn to_actix_status_code(
    status_code: http::StatusCode,
) -> Result<actix_web::http::StatusCode, String> {
    actix_web::http::StatusCode::from_u16(status_code.as_u16())
        .map_err(|_| "Invalid status code".to_string())
}
