// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::str::FromStr;
use std::sync::Arc;

use common::env::{Environment, get_parsed};
use common::env_const::{
    GQL_BATCH_EXECUTOR, GQL_GRAPHIQL, GQL_GRAPHIQL_HEADER_EDITOR, GQL_INTROSPECTION,
    GQL_MAX_QUERY_DEPTH, GQL_PRETTY, GQL_SUBSCRIPTION_PATH,
};
use graphiql::GraphiQLAssets;

use crate::error::ConfigError;
use crate::guard::RequestGuard;
use crate::schema::GraphQLSchema;
use crate::validation::{DisableIntrospectionValidator, DocumentDepthValidator, DocumentValidator};

const DEFAULT_HTTP_PATH: &str = "/graphql";

/// How the entries of a batch are run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Executor {
    /// One after the other, in request order.
    #[default]
    Sequential,
    /// All at once on the current task. Responses keep the request order.
    Concurrent,
}

impl FromStr for Executor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sequential" => Ok(Executor::Sequential),
            "concurrent" => Ok(Executor::Concurrent),
            _ => Err("must be one of 'sequential' or 'concurrent'".to_string()),
        }
    }
}

/// Everything a view needs, fixed at construction.
pub struct ViewConfig<S: GraphQLSchema> {
    pub schema: Arc<S>,
    pub executor: Executor,
    pub middleware: Vec<S::Middleware>,
    pub root_value: Option<S::RootValue>,
    pub batch: bool,
    pub pretty: bool,
    pub graphiql: bool,
    pub graphiql_header_editor_enabled: bool,
    pub graphiql_assets: GraphiQLAssets,
    pub subscription_path: Option<String>,
    pub validators: Vec<Arc<dyn DocumentValidator>>,
    pub guards: Vec<Arc<dyn RequestGuard>>,
    pub http_path: String,
}

pub struct ViewConfigBuilder<S: GraphQLSchema> {
    config: ViewConfig<S>,
}

impl<S: GraphQLSchema> ViewConfigBuilder<S> {
    pub fn new(schema: S) -> Self {
        Self::from_shared(Arc::new(schema))
    }

    /// Build a configuration around a schema shared with other views.
    pub fn from_shared(schema: Arc<S>) -> Self {
        Self {
            config: ViewConfig {
                schema,
                executor: Executor::default(),
                middleware: vec![],
                root_value: None,
                batch: false,
                pretty: false,
                graphiql: false,
                graphiql_header_editor_enabled: false,
                graphiql_assets: GraphiQLAssets::default(),
                subscription_path: None,
                validators: vec![],
                guards: vec![],
                http_path: DEFAULT_HTTP_PATH.to_string(),
            },
        }
    }

    /// Apply settings from the environment on top of what is already configured. Validators from
    /// the environment are appended after explicitly added ones.
    pub fn with_env(mut self, env: &dyn Environment) -> Result<Self, ConfigError> {
        let config = &mut self.config;

        config.graphiql = env.enabled(GQL_GRAPHIQL, config.graphiql)?;
        config.pretty = env.enabled(GQL_PRETTY, config.pretty)?;
        config.graphiql_header_editor_enabled = env.enabled(
            GQL_GRAPHIQL_HEADER_EDITOR,
            config.graphiql_header_editor_enabled,
        )?;

        if let Some(subscription_path) = env.get(GQL_SUBSCRIPTION_PATH) {
            config.subscription_path = Some(subscription_path);
        }

        if let Some(executor) = get_parsed::<Executor>(env, GQL_BATCH_EXECUTOR)? {
            config.executor = executor;
        }

        if let Some(max_depth) = get_parsed::<usize>(env, GQL_MAX_QUERY_DEPTH)? {
            config
                .validators
                .push(Arc::new(DocumentDepthValidator::new(max_depth)));
        }

        if !env.enabled(GQL_INTROSPECTION, true)? {
            config
                .validators
                .push(Arc::new(DisableIntrospectionValidator));
        }

        Ok(self)
    }

    pub fn executor(mut self, executor: Executor) -> Self {
        self.config.executor = executor;
        self
    }

    pub fn middleware(mut self, middleware: S::Middleware) -> Self {
        self.config.middleware.push(middleware);
        self
    }

    pub fn root_value(mut self, root_value: S::RootValue) -> Self {
        self.config.root_value = Some(root_value);
        self
    }

    pub fn batch(mut self, batch: bool) -> Self {
        self.config.batch = batch;
        self
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.config.pretty = pretty;
        self
    }

    pub fn graphiql(mut self, graphiql: bool) -> Self {
        self.config.graphiql = graphiql;
        self
    }

    pub fn graphiql_header_editor(mut self, enabled: bool) -> Self {
        self.config.graphiql_header_editor_enabled = enabled;
        self
    }

    pub fn graphiql_assets(mut self, assets: GraphiQLAssets) -> Self {
        self.config.graphiql_assets = assets;
        self
    }

    pub fn subscription_path(mut self, subscription_path: impl Into<String>) -> Self {
        self.config.subscription_path = Some(subscription_path.into());
        self
    }

    pub fn validator(mut self, validator: impl DocumentValidator + 'static) -> Self {
        self.config.validators.push(Arc::new(validator));
        self
    }

    pub fn guard(mut self, guard: impl RequestGuard + 'static) -> Self {
        self.config.guards.push(Arc::new(guard));
        self
    }

    pub fn http_path(mut self, http_path: impl Into<String>) -> Self {
        self.config.http_path = http_path.into();
        self
    }

    pub fn build(self) -> Result<ViewConfig<S>, ConfigError> {
        // The interactive tool has no way to show a list of responses.
        if self.config.graphiql && self.config.batch {
            return Err(ConfigError::GraphiQLWithBatch);
        }

        Ok(self.config)
    }
}
