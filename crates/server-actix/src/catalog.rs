// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The in-memory book catalog served by the bundled server.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_graphql::{Context, EmptySubscription, Object, Schema, SimpleObject};
use graphql_view::AsyncGraphQLSchema;

pub type CatalogSchema = AsyncGraphQLSchema<QueryRoot, MutationRoot, EmptySubscription>;

#[derive(SimpleObject, Clone)]
pub struct Book {
    id: i32,
    title: String,
    author: Option<String>,
}

struct Catalog {
    books: Mutex<Vec<Book>>,
}

impl Catalog {
    fn seeded() -> Self {
        let book = |id, title: &str, author: &str| Book {
            id,
            title: title.to_string(),
            author: Some(author.to_string()),
        };

        Self {
            books: Mutex::new(vec![
                book(1, "Dune", "Frank Herbert"),
                book(2, "Emma", "Jane Austen"),
            ]),
        }
    }

    fn books(&self) -> MutexGuard<'_, Vec<Book>> {
        self.books.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn books(&self, ctx: &Context<'_>) -> Vec<Book> {
        ctx.data_unchecked::<Catalog>().books().clone()
    }

    async fn book(&self, ctx: &Context<'_>, id: i32) -> Option<Book> {
        ctx.data_unchecked::<Catalog>()
            .books()
            .iter()
            .find(|book| book.id == id)
            .cloned()
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn add_book(&self, ctx: &Context<'_>, title: String, author: Option<String>) -> Book {
        let mut books = ctx.data_unchecked::<Catalog>().books();

        let book = Book {
            id: books.iter().map(|book| book.id).max().unwrap_or(0) + 1,
            title,
            author,
        };
        books.push(book.clone());

        tracing::info!(id = book.id, "Added book");
        book
    }
}

pub fn schema() -> CatalogSchema {
    AsyncGraphQLSchema::new(
        Schema::build(QueryRoot, MutationRoot, EmptySubscription)
            .data(Catalog::seeded())
            .finish(),
    )
}
