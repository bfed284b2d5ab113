// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::HashMap;

use async_graphql_parser::{
    Positioned,
    types::{FragmentDefinition, Selection, SelectionSet},
};
use async_graphql_value::Name;

use super::DocumentValidator;
use crate::context::ViewRequest;
use crate::document::Document;

/// Deep enough for the query GraphiQL sends to load the schema.
const DEFAULT_INTROSPECTION_MAX_DEPTH: usize = 15;

type Fragments = HashMap<Name, Positioned<FragmentDefinition>>;

/// Rejects documents whose field nesting exceeds a limit.
///
/// Root fields are at depth 1. Fragment spreads and inline fragments don't add a level, the fields
/// they contribute are counted where the fragment is used. Root fields `__schema` and `__type`
/// are measured against a separate (usually larger) limit.
pub struct DocumentDepthValidator {
    max_depth: usize,
    introspection_max_depth: usize,
}

impl DocumentDepthValidator {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            introspection_max_depth: DEFAULT_INTROSPECTION_MAX_DEPTH,
        }
    }

    pub fn with_introspection_max_depth(mut self, introspection_max_depth: usize) -> Self {
        self.introspection_max_depth = introspection_max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl DocumentValidator for DocumentDepthValidator {
    fn allow(&self, document: &Document, _request: &ViewRequest) -> bool {
        let mut walker = DepthWalker::new(&document.executable().fragments);

        document.operations().iter().all(|(_, operation)| {
            let depths = walker.root_depths(&operation.selection_set.node);
            depths.regular <= self.max_depth && depths.introspection <= self.introspection_max_depth
        })
    }

    fn message(&self) -> Option<String> {
        Some(format!(
            "Query depth exceeds the maximum allowed depth of {}.",
            self.max_depth
        ))
    }
}

/// Deepest root fields of a selection set, with fragments at the root flattened.
#[derive(Clone, Copy, Default)]
struct RootDepths {
    regular: usize,
    introspection: usize,
}

impl RootDepths {
    fn merge(self, other: RootDepths) -> RootDepths {
        RootDepths {
            regular: self.regular.max(other.regular),
            introspection: self.introspection.max(other.introspection),
        }
    }
}

/// Each fragment is measured once per document, however often it is spread.
struct DepthWalker<'a> {
    fragments: &'a Fragments,
    visiting: Vec<&'a str>,
    fragment_depths: HashMap<&'a str, usize>,
    fragment_root_depths: HashMap<&'a str, RootDepths>,
}

impl<'a> DepthWalker<'a> {
    fn new(fragments: &'a Fragments) -> Self {
        Self {
            fragments,
            visiting: vec![],
            fragment_depths: HashMap::new(),
            fragment_root_depths: HashMap::new(),
        }
    }

    fn root_depths(&mut self, selection_set: &'a SelectionSet) -> RootDepths {
        let mut depths = RootDepths::default();

        for selection in &selection_set.items {
            let selection_depths = match &selection.node {
                Selection::Field(field) => {
                    let depth = 1 + self.selection_set_depth(&field.node.selection_set.node);
                    match field.node.name.node.as_str() {
                        "__schema" | "__type" => RootDepths {
                            regular: 0,
                            introspection: depth,
                        },
                        _ => RootDepths {
                            regular: depth,
                            introspection: 0,
                        },
                    }
                }
                Selection::InlineFragment(inline) => {
                    self.root_depths(&inline.node.selection_set.node)
                }
                Selection::FragmentSpread(spread) => {
                    self.fragment_root_depths(&spread.node.fragment_name.node)
                }
            };
            depths = depths.merge(selection_depths);
        }

        depths
    }

    fn fragment_root_depths(&mut self, name: &'a Name) -> RootDepths {
        if let Some(depths) = self.fragment_root_depths.get(name.as_str()) {
            return *depths;
        }
        let Some(fragment) = self.enter_fragment(name) else {
            return RootDepths::default();
        };

        let depths = self.root_depths(&fragment.selection_set.node);
        self.visiting.pop();
        self.fragment_root_depths.insert(name.as_str(), depths);
        depths
    }

    fn selection_set_depth(&mut self, selection_set: &'a SelectionSet) -> usize {
        let mut depth = 0;

        for selection in &selection_set.items {
            let selection_depth = match &selection.node {
                Selection::Field(field) => {
                    1 + self.selection_set_depth(&field.node.selection_set.node)
                }
                Selection::InlineFragment(inline) => {
                    self.selection_set_depth(&inline.node.selection_set.node)
                }
                Selection::FragmentSpread(spread) => {
                    self.fragment_depth(&spread.node.fragment_name.node)
                }
            };
            depth = depth.max(selection_depth);
        }

        depth
    }

    fn fragment_depth(&mut self, name: &'a Name) -> usize {
        if let Some(depth) = self.fragment_depths.get(name.as_str()) {
            return *depth;
        }
        let Some(fragment) = self.enter_fragment(name) else {
            return 0;
        };

        let depth = self.selection_set_depth(&fragment.selection_set.node);
        self.visiting.pop();
        self.fragment_depths.insert(name.as_str(), depth);
        depth
    }

    /// Look up a fragment that isn't already being expanded on the current path, and mark it as
    /// being expanded. A cyclic spread is invalid GraphQL that the engine reports; here it only
    /// must not loop.
    fn enter_fragment(&mut self, name: &'a Name) -> Option<&'a FragmentDefinition> {
        if self.visiting.contains(&name.as_str()) {
            return None;
        }
        let fragments = self.fragments;
        let fragment = fragments.get(name)?;
        self.visiting.push(name.as_str());
        Some(&fragment.node)
    }
}
