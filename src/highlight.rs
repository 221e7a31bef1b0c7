//! Rendering highlighted stages
//!
//! A [`Renderer`] turns a token sequence and a [`RenderStyle`] into output.
//! Renderers are pure: the same tokens and style always produce the same
//! output, so the session can re-render any pane at any time without
//! tracking what was drawn before. Changing the highlight style simply
//! re-renders every pane with the new palette.
//!
//! Two renderers ship with the crate:
//!
//! - [`TerminalRenderer`] builds ratatui [`Text`](ratatui::text::Text) for
//!   the interactive viewer.
//! - [`HtmlRenderer`] builds a `<pre>` block, either class-based and scoped
//!   to a [`SessionId`], or with inline styles for embedding.

pub mod html;
pub mod palette;
pub mod terminal;

pub use html::HtmlRenderer;
pub use palette::{Palette, Rgb, TokenStyle};
pub use terminal::TerminalRenderer;

use crate::tokenizer::Token;
use rand::Rng;
use std::fmt;

/// Display options shared by every renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderStyle {
    /// Palette name, see [`Palette::by_name`]
    pub highlight_style: String,
    pub show_line_numbers: bool,
    /// Inline all styling instead of referring to a stylesheet
    pub embedded: bool,
}

impl RenderStyle {
    /// Resolve the palette, falling back to the default for unknown names
    pub fn palette(&self) -> &'static Palette {
        Palette::by_name(&self.highlight_style).unwrap_or_else(Palette::default_palette)
    }
}

impl Default for RenderStyle {
    fn default() -> Self {
        RenderStyle {
            highlight_style: Palette::default_palette().name.to_string(),
            show_line_numbers: true,
            embedded: false,
        }
    }
}

/// Turns tokens into displayable output
pub trait Renderer {
    type Output;

    fn render(&self, tokens: &[Token<'_>], style: &RenderStyle) -> Self::Output;
}

/// Per-session identifier used to scope generated style names.
///
/// Created once when a session starts and passed to anything that emits
/// stylesheet class names, so two sessions on one page never share rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    const LEN: usize = 9;
    const ALPHABET: &'static [u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

    /// A fresh random id of nine ASCII letters
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let id = (0..Self::LEN)
            .map(|_| Self::ALPHABET[rng.random_range(0..Self::ALPHABET.len())] as char)
            .collect();
        SessionId(id)
    }

    /// A fixed id, for reproducible output
    pub fn fixed(id: impl Into<String>) -> Self {
        SessionId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// CSS class that scopes this session's rules
    pub fn css_class(&self) -> String {
        format!("highlight_{}", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Split tokens into lines, cutting any token that spans a newline.
///
/// The newline itself is dropped; each returned line holds `(token, slice)`
/// pairs whose slices concatenate to the line's text.
pub(crate) fn split_lines<'t, 'src>(
    tokens: &'t [Token<'src>],
) -> Vec<Vec<(&'t Token<'src>, &'src str)>> {
    let mut lines = vec![Vec::new()];
    for token in tokens {
        let mut pieces = token.text.split('\n');
        if let Some(first) = pieces.next().filter(|piece| !piece.is_empty()) {
            if let Some(line) = lines.last_mut() {
                line.push((token, first));
            }
        }
        for piece in pieces {
            let mut line = Vec::new();
            if !piece.is_empty() {
                line.push((token, piece));
            }
            lines.push(line);
        }
    }
    // A final newline terminates the last line rather than opening a new one
    if lines.len() > 1 && lines.last().is_some_and(Vec::is_empty) {
        lines.pop();
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    #[test]
    fn test_session_id_shape() {
        let id = SessionId::generate();
        assert_eq!(id.as_str().len(), 9);
        assert!(id.as_str().chars().all(|c| c.is_ascii_alphabetic()));
        assert_eq!(id.css_class(), format!("highlight_{id}"));
    }

    #[test]
    fn test_unknown_style_falls_back_to_default() {
        let style = RenderStyle {
            highlight_style: "no-such-style".into(),
            ..RenderStyle::default()
        };
        assert_eq!(style.palette().name, "default");
    }

    #[test]
    fn test_split_lines_cuts_whitespace_tokens() {
        let tokens = tokenize("a\n\nb");
        let lines = split_lines(&tokens);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].iter().map(|(_, s)| *s).collect::<String>(), "a");
        assert!(lines[1].is_empty());
        assert_eq!(lines[2].iter().map(|(_, s)| *s).collect::<String>(), "b");
    }

    #[test]
    fn test_split_lines_trailing_newline() {
        assert_eq!(split_lines(&tokenize("a\n")).len(), 1);
        assert_eq!(split_lines(&tokenize("a\n\n")).len(), 2);
        assert_eq!(split_lines(&tokenize("")).len(), 1);
    }
}
