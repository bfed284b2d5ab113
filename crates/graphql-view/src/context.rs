// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::net::IpAddr;

use common::http::{Headers, RequestHead};
use serde_json::{Map, Value};

/// The request as seen by validators, guards and the engine.
///
/// Owned, so that it can be handed to the engine as per-request context data.
#[derive(Debug, Clone)]
pub struct ViewRequest {
    pub method: http::Method,
    pub path: String,
    pub headers: Headers,
    pub query: Map<String, Value>,
    pub ip: Option<IpAddr>,
}

impl ViewRequest {
    pub fn from_head(head: &(dyn RequestHead + Send + Sync)) -> Self {
        let query = match head.get_query() {
            Value::Object(query) => query,
            _ => Map::new(),
        };

        Self {
            method: head.get_method(),
            path: head.get_path(),
            headers: head.get_all_headers(),
            query,
            ip: head.get_ip(),
        }
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.headers.get(name)
    }

    pub fn query_param(&self, name: &str) -> Option<&Value> {
        self.query.get(name)
    }

    /// Only GET is treated as read-only; everything else may carry a mutation.
    pub fn is_read_only(&self) -> bool {
        self.method == http::Method::GET
    }
}
