// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde::Serialize;
use thiserror::Error;

use crate::context::GraphiQLContext;

static GRAPHIQL_TEMPLATE: &str = include_str!("../templates/graphiql.html");

const CONFIG_PLACEHOLDER: &str = "window.graphiqlConfig = {}";

#[derive(Debug, Error)]
pub enum GraphiQLError {
    #[error("Unable to serialize the GraphiQL configuration: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Page configuration read by the template's script. Field names match what the script expects.
#[derive(Serialize)]
struct PageConfig<'a> {
    subscription_path: Option<&'a str>,
    graphiql_header_editor_enabled: bool,
    query: &'a str,
    variables: &'a str,
    operation_name: &'a str,
    result: &'a str,
}

/// Render the GraphiQL page for the given context.
pub fn render(context: &GraphiQLContext) -> Result<String, GraphiQLError> {
    let assets = &context.assets;

    let page_config = PageConfig {
        subscription_path: context.subscription_path.as_deref(),
        graphiql_header_editor_enabled: context.graphiql_header_editor_enabled,
        query: &context.query,
        variables: &context.variables,
        operation_name: &context.operation_name,
        result: &context.result,
    };

    let replacements = [
        ("%%WHATWG_FETCH_VERSION%%", &assets.whatwg_fetch_version),
        ("%%WHATWG_FETCH_SRI%%", &assets.whatwg_fetch_sri),
        ("%%REACT_VERSION%%", &assets.react_version),
        ("%%REACT_SRI%%", &assets.react_sri),
        ("%%REACT_DOM_SRI%%", &assets.react_dom_sri),
        ("%%GRAPHIQL_VERSION%%", &assets.graphiql_version),
        ("%%GRAPHIQL_SRI%%", &assets.graphiql_sri),
        ("%%GRAPHIQL_CSS_SRI%%", &assets.graphiql_css_sri),
        (
            "%%SUBSCRIPTIONS_TRANSPORT_WS_VERSION%%",
            &assets.subscriptions_transport_ws_version,
        ),
        (
            "%%SUBSCRIPTIONS_TRANSPORT_WS_SRI%%",
            &assets.subscriptions_transport_ws_sri,
        ),
    ];

    let page = replacements
        .iter()
        .fold(GRAPHIQL_TEMPLATE.to_string(), |page, (placeholder, value)| {
            page.replace(placeholder, &escape_attribute(value))
        });

    Ok(page.replace(
        CONFIG_PLACEHOLDER,
        &format!(
            "window.graphiqlConfig = {}",
            script_safe_json(&serde_json::to_string(&page_config)?)
        ),
    ))
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

// The echoed query and result are user-controlled; a literal `</script>` inside them must not
// terminate the inline script.
fn script_safe_json(json: &str) -> String {
    json.replace("</", "<\\/").replace("<!--", "<\\!--")
}
