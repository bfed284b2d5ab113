// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::env::Environment;

pub const GQL_LOG: &str = "GQL_LOG";

pub const GQL_SERVER_HOST: &str = "GQL_SERVER_HOST";
pub const GQL_SERVER_PORT: &str = "GQL_SERVER_PORT";

pub const GQL_GRAPHQL_HTTP_PATH: &str = "GQL_GRAPHQL_HTTP_PATH";
pub const GQL_BATCH_HTTP_PATH: &str = "GQL_BATCH_HTTP_PATH";

pub const GQL_GRAPHIQL: &str = "GQL_GRAPHIQL";
pub const GQL_GRAPHIQL_HEADER_EDITOR: &str = "GQL_GRAPHIQL_HEADER_EDITOR";
pub const GQL_SUBSCRIPTION_PATH: &str = "GQL_SUBSCRIPTION_PATH";
pub const GQL_PRETTY: &str = "GQL_PRETTY";

pub const GQL_INTROSPECTION: &str = "GQL_INTROSPECTION";
pub const GQL_MAX_QUERY_DEPTH: &str = "GQL_MAX_QUERY_DEPTH";
pub const GQL_BATCH_EXECUTOR: &str = "GQL_BATCH_EXECUTOR"; // "sequential" (default) or "concurrent"

pub const DEFAULT_SERVER_PORT: u16 = 9876;

pub fn get_graphql_http_path(env: &dyn Environment) -> String {
    env.get(GQL_GRAPHQL_HTTP_PATH)
        .unwrap_or_else(|| "/graphql".to_string())
}

pub fn get_batch_http_path(env: &dyn Environment) -> String {
    env.get(GQL_BATCH_HTTP_PATH)
        .unwrap_or_else(|| "/graphql/batch".to_string())
}
