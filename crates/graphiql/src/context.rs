// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde::Serialize;

use crate::assets::GraphiQLAssets;

/// Everything the GraphiQL page needs to render a request.
///
/// `variables` and `result` are already JSON-encoded, since the editor panes display them as text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphiQLContext {
    #[serde(flatten)]
    pub assets: GraphiQLAssets,

    pub subscription_path: Option<String>,
    pub graphiql_header_editor_enabled: bool,

    pub query: String,
    pub variables: String,
    pub operation_name: String,
    pub result: String,
}
