//! HTML output writer.
//!
//! Wraps the output sink and tracks the last written character so that
//! independent renderers can ask for line breaks without producing blank lines.

use std::borrow::Cow;
use std::fmt;

use crate::attributes::Attributes;

/// Low-level HTML writer handed to node renderers.
pub struct HtmlWriter<'a> {
    out: &'a mut dyn fmt::Write,
    last_char: Option<char>,
}

impl<'a> HtmlWriter<'a> {
    /// Create a writer appending to `out`.
    pub fn new(out: &'a mut dyn fmt::Write) -> Self {
        Self {
            out,
            last_char: None,
        }
    }

    /// Write `text` as-is.
    pub fn raw(&mut self, text: &str) -> fmt::Result {
        if let Some(last) = text.chars().next_back() {
            self.out.write_str(text)?;
            self.last_char = Some(last);
        }
        Ok(())
    }

    /// Write `text` with HTML special characters escaped.
    pub fn text(&mut self, text: &str) -> fmt::Result {
        self.raw(&escape_html(text))
    }

    /// Write an opening tag.
    pub fn tag(&mut self, name: &str, attributes: &Attributes) -> fmt::Result {
        self.open(name, attributes)?;
        self.raw(">")
    }

    /// Write a void element such as `<br />`.
    pub fn void_tag(&mut self, name: &str, attributes: &Attributes) -> fmt::Result {
        self.open(name, attributes)?;
        self.raw(" />")
    }

    /// Write a closing tag.
    pub fn close_tag(&mut self, name: &str) -> fmt::Result {
        self.raw("</")?;
        self.raw(name)?;
        self.raw(">")
    }

    /// Start a new line unless the output is empty or already at a line start.
    pub fn line(&mut self) -> fmt::Result {
        match self.last_char {
            Some(last) if last != '\n' => self.raw("\n"),
            _ => Ok(()),
        }
    }

    /// Last character written, if any.
    #[must_use]
    pub fn last_char(&self) -> Option<char> {
        self.last_char
    }

    fn open(&mut self, name: &str, attributes: &Attributes) -> fmt::Result {
        self.raw("<")?;
        self.raw(name)?;
        for (key, value) in attributes {
            self.raw(" ")?;
            self.raw(&escape_html(key))?;
            self.raw("=\"")?;
            self.raw(&escape_html(value))?;
            self.raw("\"")?;
        }
        Ok(())
    }
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"']) {
        return Cow::Borrowed(s);
    }
    let mut result = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}
