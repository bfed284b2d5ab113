// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Framework-neutral plumbing shared by the GraphQL view and the servers that host it.

pub mod env;
pub mod env_const;
pub mod http;
pub mod logging_tracing;
pub mod router;

pub use env::EnvError;
