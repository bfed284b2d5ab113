// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use actix_web::{App, HttpServer, middleware, web};

use server_actix::{ServerInitError, configure_router, create_router};
use thiserror::Error;
use tracing_actix_web::TracingLogger;

use std::io::ErrorKind;
use std::net::SocketAddr;
use std::time;

use common::{
    env::{EnvError, Environment, SystemEnvironment, get_parsed},
    env_const::{
        DEFAULT_SERVER_PORT, GQL_SERVER_HOST, GQL_SERVER_PORT, get_batch_http_path,
        get_graphql_http_path,
    },
    logging_tracing,
};

#[derive(Error)]
enum ServerError {
    #[error("Port {0} is already in use. Check if there is another process running at that port.")]
    PortInUse(u16),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    EnvError(#[from] EnvError),
    #[error("{0}")]
    ServerInitError(#[from] ServerInitError),
    #[error("Unable to initialize logging: {0}")]
    Logging(#[from] logging_tracing::TryInitError),
}

// A custom `Debug` implementation for `ServerError` (that delegate to the `Display` impl), so that
// we don't print the default `Debug` implementation's message when the server exits.
impl std::fmt::Debug for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

/// Serve the book catalog
#[actix_web::main]
async fn main() -> Result<(), ServerError> {
    let start_time = time::SystemTime::now();

    logging_tracing::init()?;

    let env = SystemEnvironment;

    let router = web::Data::new(create_router(&env)?);

    let server_port = get_parsed::<u16>(&env, GQL_SERVER_PORT)?.unwrap_or(DEFAULT_SERVER_PORT);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(middleware::NormalizePath::new(
                middleware::TrailingSlash::Trim,
            ))
            .configure(configure_router(router.clone()))
    });

    // "localhost" binds both the IPv4 and IPv6 loopback addresses. Set GQL_SERVER_HOST=0.0.0.0 to
    // accept connections from outside the host (for example, inside a container).
    let server_host = env.get_or_else(GQL_SERVER_HOST, "localhost");

    match server.bind((server_host, server_port)) {
        Ok(server) => {
            let pretty_addr = pretty_addr(&server.addrs());

            println!(
                "Started server on {} in {:.2} ms",
                pretty_addr,
                start_time
                    .elapsed()
                    .map(|elapsed| elapsed.as_micros() as f64 / 1000.0)
                    .unwrap_or_default()
            );
            println!("- GraphQL endpoint hosted at:");
            println!("\thttp://{pretty_addr}{}", get_graphql_http_path(&env));
            println!("- Batch endpoint hosted at:");
            println!("\thttp://{pretty_addr}{}", get_batch_http_path(&env));

            Ok(server.run().await?)
        }
        Err(e) => Err(if e.kind() == ErrorKind::AddrInUse {
            ServerError::PortInUse(server_port)
        } else {
            ServerError::Io(e)
        }),
    }
}

fn pretty_addr(addrs: &[SocketAddr]) -> String {
    let loopback_addr = addrs.iter().find(|addr| addr.ip().is_loopback());

    match loopback_addr {
        Some(addr) => format!("localhost:{}", addr.port()),
        None => match addrs {
            // Print single address without square brackets
            [addr] => format!("{addr}"),
            _ => {
                format!("{addrs:?}")
            }
        },
    }
}
