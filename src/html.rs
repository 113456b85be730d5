//! HTML building - Just enough to emit img/figure fragments
//!
//! Attribute values and text are always escaped; attributes whose value is
//! `None` are omitted.

use serde::Serialize;
use std::fmt;

/// A rendered HTML fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Html(String);

impl Html {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Html {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub type Attrs<'a> = [(&'a str, Option<&'a str>)];

pub fn text(content: &str) -> Html {
    Html(html_escape::encode_text(content).into_owned())
}

/// Element without children or closing tag, e.g. `<img ...>`.
pub fn void_element(tag: &str, attrs: &Attrs<'_>) -> Html {
    Html(format!("<{}{}>", tag, render_attrs(attrs)))
}

pub fn element(tag: &str, attrs: &Attrs<'_>, children: &[Html]) -> Html {
    let inner: String = children.iter().map(Html::as_str).collect();
    Html(format!("<{}{}>{}</{}>", tag, render_attrs(attrs), inner, tag))
}

fn render_attrs(attrs: &Attrs<'_>) -> String {
    attrs
        .iter()
        .filter_map(|(name, value)| {
            value.map(|v| format!(" {}=\"{}\"", name, html_escape::encode_double_quoted_attribute(v)))
        })
        .collect()
}
