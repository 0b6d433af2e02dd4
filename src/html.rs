// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! The safe-HTML fragment type produced by rendering.
//!
//! [`Html`] wraps a string that is known to be safe to embed in an HTML
//! document without further escaping. Values constructed via [`Html::raw`]
//! are trusted verbatim (this is how template literals and `{% raw %}`-style
//! escape hatches reach the output); values constructed via [`Html::escape`]
//! have had `&`, `<`, `>`, `"`, and `'` replaced with their entity forms.

use std::fmt;

/// An HTML fragment known to be safe for direct output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Html(String);

impl Html {
    /// Wraps `s` as HTML without escaping it.
    ///
    /// Callers are responsible for ensuring `s` does not contain untrusted
    /// content; this is the engine's only escape hatch (used for literal
    /// template text, which is authoritative HTML, and for the built-in
    /// `raw` function).
    pub fn raw(s: impl Into<String>) -> Self {
        Html(s.into())
    }

    /// Escapes `s` and wraps the result as HTML.
    pub fn escape(s: &str) -> Self {
        let mut out = String::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#39;"),
                c => out.push(c),
            }
        }
        Html(out)
    }

    /// An empty fragment.
    pub fn empty() -> Self {
        Html(String::new())
    }

    /// Appends `other` to the end of this fragment.
    pub fn append(&mut self, other: &Html) {
        self.0.push_str(&other.0);
    }

    /// Returns the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the fragment, returning the underlying string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Html {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Html> for String {
    fn from(h: Html) -> Self {
        h.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_all_five_entities() {
        let h = Html::escape(r#"<a href="x">&'b'</a>"#);
        assert_eq!(
            h.as_str(),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;b&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn raw_is_not_escaped() {
        let h = Html::raw("<b>hi</b>");
        assert_eq!(h.as_str(), "<b>hi</b>");
    }

    #[test]
    fn append_concatenates() {
        let mut h = Html::raw("a");
        h.append(&Html::raw("b"));
        assert_eq!(h.as_str(), "ab");
    }
}
