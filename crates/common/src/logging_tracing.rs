// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! # Tracing configuration setup.
//!
//! The view and the servers are instrumented with Rust's `tracing` framework.
//!
//! Calling the `init` function will initialize a global tracing subscriber based on the value of
//! the `GQL_LOG` environment variable which follows the same conventions as `RUST_LOG`
//! (for example `GQL_LOG=graphql_view=debug,info`). Without it, only warnings and errors are
//! printed.

use tracing_subscriber::{EnvFilter, filter::LevelFilter, prelude::*};

pub use tracing_subscriber::util::TryInitError;

use crate::env_const::GQL_LOG;

/// Initialize the tracing subscriber with a compact `fmt` layer.
///
/// Returns an error if a global subscriber has already been installed.
pub fn init() -> Result<(), TryInitError> {
    let fmt_layer = tracing_subscriber::fmt::layer().compact();
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var(GQL_LOG)
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
}
