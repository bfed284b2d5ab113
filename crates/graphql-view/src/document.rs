// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_graphql_parser::{
    parse_query,
    types::{DocumentOperations, ExecutableDocument, OperationDefinition, OperationType},
};

use crate::error::GraphQLError;

/// A parsed query document together with the text it was parsed from.
#[derive(Debug, Clone)]
pub struct Document {
    source: String,
    executable: ExecutableDocument,
}

impl Document {
    pub fn parse(source: &str) -> Result<Self, GraphQLError> {
        let executable = parse_query(source)?;

        Ok(Self {
            source: source.to_string(),
            executable,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn executable(&self) -> &ExecutableDocument {
        &self.executable
    }

    /// Every operation in the document, with its name if it has one.
    pub fn operations(&self) -> Vec<(Option<&str>, &OperationDefinition)> {
        match &self.executable.operations {
            DocumentOperations::Single(operation) => vec![(None, &operation.node)],
            DocumentOperations::Multiple(operations) => operations
                .iter()
                .map(|(name, operation)| (Some(name.as_str()), &operation.node))
                .collect(),
        }
    }

    /// The type of the operation that would run for `operation_name`.
    ///
    /// Without a name, a document with several operations reports a mutating type if any of its
    /// operations is one, so that a read-only request can never slip a mutation through. An unknown
    /// name yields `None`; the engine reports that case itself.
    pub fn operation_type(&self, operation_name: Option<&str>) -> Option<OperationType> {
        let operations = self.operations();

        match operation_name {
            Some(operation_name) => operations
                .iter()
                .find(|(name, _)| *name == Some(operation_name))
                .map(|(_, operation)| operation.ty),
            None => match operations.as_slice() {
                [] => None,
                [(_, operation)] => Some(operation.ty),
                _ => Some(
                    operations
                        .iter()
                        .map(|(_, operation)| operation.ty)
                        .find(|ty| *ty != OperationType::Query)
                        .unwrap_or(OperationType::Query),
                ),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_anonymous_operation() {
        let document = Document::parse("{ books { title } }").unwrap();

        assert_eq!(document.source(), "{ books { title } }");
        assert_eq!(document.operation_type(None), Some(OperationType::Query));
        assert_eq!(
            document.operation_type(Some("Unknown")),
            None,
            "an anonymous operation cannot be selected by name"
        );
    }

    #[test]
    fn named_operations() {
        let document = Document::parse(
            r#"
            query Books { books { title } }
            mutation AddBook { addBook(title: "Dune") { id } }
            "#,
        )
        .unwrap();

        assert_eq!(
            document.operation_type(Some("Books")),
            Some(OperationType::Query)
        );
        assert_eq!(
            document.operation_type(Some("AddBook")),
            Some(OperationType::Mutation)
        );
        assert_eq!(document.operation_type(Some("Missing")), None);
        assert_eq!(document.operation_type(None), Some(OperationType::Mutation));
    }

    #[test]
    fn single_named_subscription() {
        let document = Document::parse("subscription OnBook { bookAdded { id } }").unwrap();

        assert_eq!(
            document.operation_type(None),
            Some(OperationType::Subscription)
        );
        assert_eq!(document.operation_type(None).unwrap().to_string(), "subscription");
    }

    #[test]
    fn parse_failure_reports_position() {
        let error = Document::parse("{ books { title }").unwrap_err();

        assert!(!error.message.is_empty());
        assert!(!error.locations.is_empty());
        assert_eq!(error.locations[0].line, 1);
    }
}
