// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::net::{IpAddr, SocketAddr};
use std::sync::{Mutex, PoisonError};

use actix_web::{HttpRequest, dev::ConnectionInfo, http::header::HeaderMap};
use common::http::{Headers, RequestHead, RequestPayload};
use serde_json::Value;

pub struct ActixRequestHead {
    // we cannot refer to HttpRequest directly, as it holds an Rc (and therefore does
    // not impl Send or Sync)
    headers: HeaderMap,
    connection_info: ConnectionInfo,
    method: http::Method,
    path: String,
    query: Value,
}

impl ActixRequestHead {
    pub fn from_request(
        req: &HttpRequest,
        query: Value,
    ) -> Result<ActixRequestHead, http::method::InvalidMethod> {
        // Actix uses http-0.2, the rest of the system uses http-1.x.
        let method = http::Method::from_bytes(req.method().as_str().as_bytes())?;

        Ok(ActixRequestHead {
            headers: req.headers().clone(),
            connection_info: req.connection_info().clone(),
            method,
            path: req.path().to_string(),
            query,
        })
    }
}

impl RequestHead for ActixRequestHead {
    fn get_headers(&self, key: &str) -> Vec<String> {
        self.headers
            .get_all(key.to_lowercase())
            .filter_map(|h| h.to_str().ok())
            .map(|h| h.to_string())
            .collect()
    }

    fn get_all_headers(&self) -> Headers {
        Headers::from_vec(
            self.headers
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|value| (name.to_string(), value.to_string()))
                })
                .collect(),
        )
    }

    fn get_ip(&self) -> Option<IpAddr> {
        self.connection_info
            .realip_remote_addr()
            .and_then(|realip| {
                realip
                    .parse::<IpAddr>()
                    .ok()
                    .or_else(|| realip.parse::<SocketAddr>().ok().map(|addr| addr.ip()))
            })
    }

    fn get_method(&self) -> http::Method {
        self.method.clone()
    }

    fn get_path(&self) -> String {
        self.path.clone()
    }

    fn get_query(&self) -> Value {
        self.query.clone()
    }
}

pub struct ActixRequestPayload {
    pub head: ActixRequestHead,
    pub body: Mutex<Vec<u8>>,
}

impl RequestPayload for ActixRequestPayload {
    fn get_head(&self) -> &(dyn RequestHead + Send + Sync) {
        &self.head
    }

    fn take_body(&self) -> Vec<u8> {
        std::mem::take(&mut *self.body.lock().unwrap_or_else(PoisonError::into_inner))
    }
}
