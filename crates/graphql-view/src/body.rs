// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use mediatype::{
    MediaType,
    names::{APPLICATION, JSON, PLAIN, TEXT},
};
use serde_json::{Map, Value};

use crate::error::ViewError;

/// Decode a request body according to its content type.
///
/// - `application/json`: any JSON value (an object, or a list in batch mode)
/// - `application/graphql` and `text/plain`: the body is the query text
/// - `application/x-www-form-urlencoded`: a map of strings
///
/// An empty body is `null` whatever its declared type.
pub fn parse_body(content_type: Option<&str>, body: &[u8]) -> Result<Value, ViewError> {
    if body.is_empty() {
        return Ok(Value::Null);
    }

    let content_type = content_type.unwrap_or_default().trim();
    let media_type = MediaType::parse(content_type)
        .map_err(|_| ViewError::UnsupportedMediaType(content_type.to_string()))?;

    let application = media_type.ty == APPLICATION;

    if application && media_type.subty == JSON {
        serde_json::from_slice(body).map_err(|e| ViewError::MalformedBody(e.to_string()))
    } else if (application && media_type.subty.as_str().eq_ignore_ascii_case("graphql"))
        || (media_type.ty == TEXT && media_type.subty == PLAIN)
    {
        let query =
            std::str::from_utf8(body).map_err(|e| ViewError::MalformedBody(e.to_string()))?;

        let mut data = Map::new();
        data.insert("query".to_string(), Value::String(query.to_string()));
        Ok(Value::Object(data))
    } else if application
        && media_type
            .subty
            .as_str()
            .eq_ignore_ascii_case("x-www-form-urlencoded")
    {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
            .map_err(|e| ViewError::MalformedBody(e.to_string()))?;

        Ok(Value::Object(
            pairs
                .into_iter()
                .map(|(key, value)| (key, Value::String(value)))
                .collect(),
        ))
    } else {
        Err(ViewError::UnsupportedMediaType(essence(&media_type)))
    }
}

/// The media type without its parameters, as named in errors.
fn essence(media_type: &MediaType) -> String {
    let mut essence = format!("{}/{}", media_type.ty, media_type.subty);
    if let Some(suffix) = &media_type.suffix {
        essence.push('+');
        essence.push_str(suffix.as_str());
    }
    essence.to_lowercase()
}
