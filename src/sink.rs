//! Output surfaces the renderer writes slots into.

use std::collections::BTreeMap;

use lol_html::html_content::ContentType;
use lol_html::{element, rewrite_str, RewriteStrSettings, Selector};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SinkError {
    #[error("no element with id {0:?} on the page")]
    MissingSlot(String),

    #[error("id {0:?} cannot be selected: {1}")]
    Selector(String, String),

    #[error("failed to rewrite page: {0}")]
    Rewrite(String),
}

/// A named set of insertion points receiving formatted markup.
pub trait OutputSink {
    fn set_field(&mut self, id: &str, markup: &str) -> Result<(), SinkError>;
}

/// Slots kept in memory, ordered by id.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SlotMap {
    slots: BTreeMap<String, String>,
}

impl SlotMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.slots.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl OutputSink for SlotMap {
    fn set_field(&mut self, id: &str, markup: &str) -> Result<(), SinkError> {
        self.slots.insert(id.to_string(), markup.to_string());
        Ok(())
    }
}

/// An HTML page whose elements are filled by `id`.
///
/// Only the inner content of the matching element is replaced; the rest of
/// the page is kept byte for byte.
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlPage {
    html: String,
}

impl HtmlPage {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.html
    }
}

impl OutputSink for HtmlPage {
    fn set_field(&mut self, id: &str, markup: &str) -> Result<(), SinkError> {
        let selector = format!("[id=\"{}\"]", id.replace('\\', "\\\\").replace('"', "\\\""));
        selector
            .parse::<Selector>()
            .map_err(|err| SinkError::Selector(id.to_string(), err.to_string()))?;

        let mut found = false;
        let filled = rewrite_str(
            &self.html,
            RewriteStrSettings {
                element_content_handlers: vec![element!(selector, |el| {
                    // ids are unique; a repeated one keeps its content
                    if !found {
                        el.set_inner_content(markup, ContentType::Html);
                        found = true;
                    }
                    Ok(())
                })],
                ..RewriteStrSettings::new()
            },
        )
        .map_err(|err| SinkError::Rewrite(err.to_string()))?;

        if !found {
            return Err(SinkError::MissingSlot(id.to_string()));
        }
        self.html = filled;
        Ok(())
    }
}
