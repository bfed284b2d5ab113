// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The in-browser GraphiQL tool served by the GraphQL view when a browser asks for HTML.
//!
//! The page is a single template that pulls GraphiQL and its dependencies from a CDN (pinned by
//! version and subresource-integrity hash) and is seeded with the request the user made, so the
//! editor opens with the query, variables, and result already filled in.

mod assets;
mod context;
mod render;

pub use assets::GraphiQLAssets;
pub use context::GraphiQLContext;
pub use render::{GraphiQLError, render};
