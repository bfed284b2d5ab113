// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_graphql_parser::types::{Selection, SelectionSet};

use super::DocumentValidator;
use crate::context::ViewRequest;
use crate::document::Document;

/// Rejects documents that select `__schema` or `__type`. `__typename` is still allowed.
#[derive(Default)]
pub struct DisableIntrospectionValidator;

impl DocumentValidator for DisableIntrospectionValidator {
    fn allow(&self, document: &Document, _request: &ViewRequest) -> bool {
        let executable = document.executable();

        let operations_clean = document
            .operations()
            .iter()
            .all(|(_, operation)| !selects_introspection(&operation.selection_set.node));

        let fragments_clean = executable
            .fragments
            .values()
            .all(|fragment| !selects_introspection(&fragment.node.selection_set.node));

        operations_clean && fragments_clean
    }

    fn message(&self) -> Option<String> {
        Some("Introspection queries are disabled.".to_string())
    }
}

fn selects_introspection(selection_set: &SelectionSet) -> bool {
    selection_set
        .items
        .iter()
        .any(|selection| match &selection.node {
            Selection::Field(field) => {
                matches!(field.node.name.node.as_str(), "__schema" | "__type")
                    || selects_introspection(&field.node.selection_set.node)
            }
            Selection::InlineFragment(inline) => {
                selects_introspection(&inline.node.selection_set.node)
            }
            // Fragment definitions are checked on their own.
            Selection::FragmentSpread(_) => false,
        })
}
