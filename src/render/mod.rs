//! Render target capability and the element ids a quiz widget uses.
//!
//! The presenter only touches elements under its own question container
//! through [`RenderTarget`]; it never sees the whole document.

#[cfg(feature = "headless")]
pub mod headless;

#[cfg(feature = "headless")]
pub use headless::HeadlessPage;

use crate::{Error, Result};

/// Minimal DOM surface needed to show questions and load the player library
pub trait RenderTarget: Send + Sync {
    fn has_element(&self, id: &str) -> bool;

    /// Create an empty top-level `<div>` with this id unless one exists.
    fn ensure_container(&self, id: &str);

    /// Replace the children of `id` with the parsed `html` fragment.
    fn set_inner_html(&self, id: &str, html: &str) -> Result<()>;

    /// Replace the children of `id` with a single text node.
    fn set_text(&self, id: &str, text: &str) -> Result<()>;

    fn set_attribute(&self, id: &str, name: &str, value: &str) -> Result<()>;

    /// Removing an absent attribute is not an error.
    fn remove_attribute(&self, id: &str, name: &str) -> Result<()>;

    /// Add a `<script src=...>` to the page.
    fn inject_script(&self, src: &str);

    fn set_disabled(&self, id: &str, disabled: bool) -> Result<()> {
        if disabled {
            self.set_attribute(id, "disabled", "")
        } else {
            self.remove_attribute(id, "disabled")
        }
    }
}

/// Deterministic element ids for one widget, so several widgets can share a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementIds {
    prefix: String,
    pub player: String,
    pub question: String,
    pub form: String,
    pub prompt: String,
    pub answer_input: String,
    pub solution: String,
    pub submit: String,
    pub continue_button: String,
}

impl ElementIds {
    pub fn for_video(video_id: &str) -> Self {
        let id = |suffix: &str| format!("{}-{}", video_id, suffix);
        Self {
            prefix: video_id.to_string(),
            player: id("player"),
            question: id("question"),
            form: id("question-form"),
            prompt: id("prompt"),
            answer_input: id("answer"),
            solution: id("solution"),
            submit: id("question-submit"),
            continue_button: id("continue"),
        }
    }

    /// Radio input for choice `index`
    pub fn choice(&self, index: usize) -> String {
        format!("{}-choice{}", self.prefix, index)
    }

    /// Label wrapping choice `index`
    pub fn choice_label(&self, index: usize) -> String {
        format!("{}-choice{}-label", self.prefix, index)
    }
}

/// Check that `video_id` can prefix element ids: non-empty ASCII letters,
/// digits, `-` and `_`, the alphabet of player video ids.
pub fn validate_video_id(video_id: &str) -> Result<()> {
    if video_id.is_empty() {
        return Err(Error::InvalidVideoId("video id must not be empty".into()));
    }
    match video_id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        Some(c) => Err(Error::InvalidVideoId(format!(
            "{:?} contains {:?}; only letters, digits, '-' and '_' are allowed",
            video_id, c
        ))),
        None => Ok(()),
    }
}

/// Escape text for use in element content or a quoted attribute value.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
