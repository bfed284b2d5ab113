// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Admission checks run against a parsed document before it is executed.

mod depth;
mod introspection;

use std::sync::Arc;

use tracing::instrument;

use crate::context::ViewRequest;
use crate::document::Document;
use crate::error::ViewError;

pub use depth::DocumentDepthValidator;
pub use introspection::DisableIntrospectionValidator;

pub trait DocumentValidator: Send + Sync {
    fn allow(&self, document: &Document, request: &ViewRequest) -> bool;

    /// Reported to the client on rejection. A generic message is used when absent.
    fn message(&self) -> Option<String> {
        None
    }
}

/// Run the validators in order, stopping at the first rejection.
#[instrument(name = "validation::check_document_validators", skip_all)]
pub fn check_document_validators(
    validators: &[Arc<dyn DocumentValidator>],
    document: &Document,
    request: &ViewRequest,
) -> Result<(), ViewError> {
    for validator in validators {
        if !validator.allow(document, request) {
            let message = validator.message();
            tracing::debug!(?message, "Document rejected by validator");
            return Err(ViewError::InvalidDocument(message));
        }
    }

    Ok(())
}
