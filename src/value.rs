//! Conversions from listing types into template [`Value`]s. Every string that
//! comes from the post document is HTML-escaped here, so templates can
//! substitute fields directly.

use crate::render::{TagButton, Tile};
use gtmpl_value::Value;
use pulldown_cmark::escape::escape_html;
use std::collections::HashMap;

/// Escapes `s` for use in HTML text or a quoted attribute.
pub fn escaped(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    // writing into a `String` can't fail
    let _ = escape_html(&mut out, s);
    out
}

impl From<&Tile<'_>> for Value {
    fn from(tile: &Tile) -> Value {
        let post = tile.post;
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("slug".to_owned(), Value::String(escaped(&post.slug)));
        m.insert("href".to_owned(), Value::String(escaped(&tile.href)));
        m.insert("title".to_owned(), Value::String(escaped(&post.title)));
        m.insert("subtitle".to_owned(), Value::String(escaped(&post.subtitle)));
        m.insert("date".to_owned(), Value::String(escaped(&post.date)));
        m.insert(
            "reading_time".to_owned(),
            Value::String(escaped(&post.reading_time)),
        );
        m.insert("icon".to_owned(), Value::String(escaped(&post.icon)));
        m.insert(
            "tags".to_owned(),
            Value::Array(
                post.tags
                    .iter()
                    .map(|t| Value::String(escaped(t)))
                    .collect(),
            ),
        );
        Value::Object(m)
    }
}

impl From<&TagButton<'_>> for Value {
    fn from(button: &TagButton) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("tag".to_owned(), Value::String(escaped(button.tag)));
        m.insert("active".to_owned(), Value::Bool(button.active));
        Value::Object(m)
    }
}
