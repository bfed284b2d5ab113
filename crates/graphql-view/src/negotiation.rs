// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use mediatype::{
    MediaTypeList, Name, ReadParams,
    names::{_STAR, APPLICATION, HTML, JSON, TEXT},
};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Json,
    /// The browsable format, served as GraphiQL when it is enabled.
    Html,
}

/// Pick the response format from the `format` query parameter, falling back to the `Accept`
/// header. Anything undecidable is JSON.
pub fn negotiate(query: &Map<String, Value>, accept: Option<&str>) -> ResponseFormat {
    match query.get("format").and_then(Value::as_str) {
        Some("json") => return ResponseFormat::Json,
        Some("html") => return ResponseFormat::Html,
        _ => {}
    }

    let Some(accept) = accept else {
        return ResponseFormat::Json;
    };

    // (quality, specificity, format); the first of equally ranked ranges wins.
    let mut best: Option<(f32, u8, ResponseFormat)> = None;

    for media_type in MediaTypeList::new(accept).filter_map(Result::ok) {
        let (ty, subty) = (&media_type.ty, &media_type.subty);
        let (format, specificity) = if *ty == APPLICATION && *subty == JSON {
            (ResponseFormat::Json, 2)
        } else if *ty == TEXT && *subty == HTML {
            (ResponseFormat::Html, 2)
        } else if *ty == APPLICATION && *subty == _STAR {
            (ResponseFormat::Json, 1)
        } else if *ty == TEXT && *subty == _STAR {
            (ResponseFormat::Html, 1)
        } else if *ty == _STAR && *subty == _STAR {
            (ResponseFormat::Json, 0)
        } else {
            continue;
        };

        let quality = Name::new("q")
            .and_then(|q| media_type.get_param(q))
            .and_then(|q| q.as_str().parse::<f32>().ok())
            .unwrap_or(1.0);

        if quality <= 0.0 {
            continue;
        }

        let better = match best {
            None => true,
            Some((best_quality, best_specificity, _)) => {
                quality > best_quality
                    || (quality == best_quality && specificity > best_specificity)
            }
        };

        if better {
            best = Some((quality, specificity, format));
        }
    }

    best.map(|(_, _, format)| format)
        .unwrap_or(ResponseFormat::Json)
}
