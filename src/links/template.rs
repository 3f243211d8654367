//
//  git-weblinks
//  links/template.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Template Engine
//!
//! Thin layer over [`tera`] used for every string a handler definition
//! describes: link URLs, selection suffixes, dynamic server addresses and the
//! reverse file/server/selection extraction.
//!
//! A [`TemplateContext`] carries named variables and, optionally, the
//! captures of a regex match. Named groups are exposed as
//! `captures.<name>`, numbered groups as the `groups` array. A group that
//! did not take part in the match is present as an empty string, so a
//! template referencing it renders to nothing instead of failing;
//! [`Template::render_optional`] then reports that as `None`.
//!
//! Two filters are registered on top of tera's built-ins:
//!
//! | Filter | Encodes |
//! |--------|---------|
//! | `encode_uri` | everything but unreserved characters and `/` |
//! | `encode_uri_component` | everything but unreserved characters |
//!
//! ## Example
//!
//! ```rust
//! use git_weblinks::links::{Template, TemplateContext};
//!
//! let template = Template::parse("{{ base }}/blob/{{ ref | encode_uri }}").unwrap();
//! let mut context = TemplateContext::new();
//! context.insert("base", "https://github.com/acme/widgets");
//! context.insert("ref", "feature/a b");
//!
//! assert_eq!(
//!     template.render(&context).unwrap(),
//!     "https://github.com/acme/widgets/blob/feature/a%20b"
//! );
//! ```

use std::collections::HashMap;
use std::fmt;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::{Captures, Regex};
use serde::Serialize;
use tera::{Context, Tera, Value};

const TEMPLATE_NAME: &str = "template";

/// Characters left alone by `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const PATH: &AsciiSet = &COMPONENT.remove(b'/');

/// Percent-encodes a single path segment or query value.
pub fn encode_uri_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Percent-encodes a value, keeping `/` so it can span path segments.
pub fn encode_uri(value: &str) -> String {
    utf8_percent_encode(value, PATH).to_string()
}

/// Decodes percent escapes; invalid UTF-8 is replaced rather than rejected.
pub fn decode_uri(value: &str) -> String {
    percent_decode_str(value).decode_utf8_lossy().into_owned()
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn filter_encode_uri(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(encode_uri(&value_text(value))))
}

fn filter_encode_uri_component(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(encode_uri_component(&value_text(value))))
}

/// A compiled template.
///
/// Parsing happens once, when a definition is loaded, so syntax errors never
/// surface at render time.
#[derive(Clone)]
pub struct Template {
    source: String,
    tera: Tera,
}

impl Template {
    /// Compiles `source`.
    pub fn parse(source: &str) -> tera::Result<Self> {
        let mut tera = Tera::default();
        tera.register_filter("encode_uri", filter_encode_uri);
        tera.register_filter("encode_uri_component", filter_encode_uri_component);
        tera.add_raw_template(TEMPLATE_NAME, source)?;
        Ok(Self {
            source: source.to_string(),
            tera,
        })
    }

    /// The template text as written in the definition.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Renders the template. Surrounding whitespace is trimmed, since none
    /// of the strings produced here may carry any.
    ///
    /// Referencing a variable that is not in the context is an error.
    pub fn render(&self, context: &TemplateContext) -> tera::Result<String> {
        let rendered = self.tera.render(TEMPLATE_NAME, &context.inner)?;
        Ok(rendered.trim().to_string())
    }

    /// Renders the template, mapping an empty result to `None`.
    pub fn render_optional(&self, context: &TemplateContext) -> tera::Result<Option<String>> {
        let rendered = self.render(context)?;
        Ok(if rendered.is_empty() {
            None
        } else {
            Some(rendered)
        })
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Template").field(&self.source).finish()
    }
}

/// Variables available to a template.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    inner: Context,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a variable.
    pub fn insert<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        self.inner.insert(key, value);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with<T: Serialize + ?Sized>(mut self, key: &str, value: &T) -> Self {
        self.insert(key, value);
        self
    }

    /// Exposes the groups of `captures` (a match of `pattern`).
    ///
    /// Every named group of the pattern is inserted, matched or not.
    pub fn insert_captures(&mut self, pattern: &Regex, captures: &Captures<'_>) {
        let named: HashMap<&str, &str> = pattern
            .capture_names()
            .flatten()
            .map(|name| (name, captures.name(name).map_or("", |m| m.as_str())))
            .collect();
        let groups: Vec<&str> = (0..captures.len())
            .map(|i| captures.get(i).map_or("", |m| m.as_str()))
            .collect();
        self.inner.insert("captures", &named);
        self.inner.insert("groups", &groups);
    }

    /// Fills the capture variables of `pattern` with a placeholder value.
    ///
    /// Used to check, at load time, that a template only refers to groups
    /// its pattern defines.
    pub fn insert_probe_captures(&mut self, pattern: &Regex) {
        let named: HashMap<&str, &str> = pattern
            .capture_names()
            .flatten()
            .map(|name| (name, "1"))
            .collect();
        let groups = vec!["1"; pattern.captures_len()];
        self.inner.insert("captures", &named);
        self.inner.insert("groups", &groups);
    }
}
