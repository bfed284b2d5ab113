// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde::Serialize;

/// Versions and subresource-integrity hashes of the scripts the GraphiQL page loads.
///
/// Bumping a version requires bumping the matching hash, otherwise the browser refuses to run the
/// script.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphiQLAssets {
    // Polyfill for window.fetch.
    pub whatwg_fetch_version: String,
    pub whatwg_fetch_sri: String,

    pub react_version: String,
    pub react_sri: String,
    pub react_dom_sri: String,

    pub graphiql_version: String,
    pub graphiql_sri: String,
    pub graphiql_css_sri: String,

    // The websocket transport library for subscriptions.
    pub subscriptions_transport_ws_version: String,
    pub subscriptions_transport_ws_sri: String,
}

impl Default for GraphiQLAssets {
    fn default() -> Self {
        Self {
            whatwg_fetch_version: "3.2.0".into(),
            whatwg_fetch_sri: "sha256-l6HCB9TT2v89oWbDdo2Z3j+PSVypKNLA/nqfzSbM8mo=".into(),

            react_version: "16.13.1".into(),
            react_sri: "sha256-yUhvEmYVhZ/GGshIQKArLvySDSh6cdmdcIx0spR3UP4=".into(),
            react_dom_sri: "sha256-vFt3l+illeNlwThbDUdoPTqF81M8WNSZZZt3HEjsbSU=".into(),

            graphiql_version: "1.0.3".into(),
            graphiql_sri: "sha256-VR4buIDY9ZXSyCNFHFNik6uSe0MhigCzgN4u7moCOTk=".into(),
            graphiql_css_sri: "sha256-LwqxjyZgqXDYbpxQJ5zLQeNcf7WVNSJ+r8yp2rnWE/E=".into(),

            subscriptions_transport_ws_version: "0.9.17".into(),
            subscriptions_transport_ws_sri: "sha256-kCDzver8iRaIQ/SVlfrIwxaBQ/avXf9GQFJRLlErBnk="
                .into(),
        }
    }
}
