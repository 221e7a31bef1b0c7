//! HTML renderer
//!
//! Class-based output wraps the code in `<div class="highlight_<id>">` and
//! relies on [`HtmlRenderer::style_defs`] for colours, so a style change only
//! needs a new stylesheet. Embedded output inlines every style on its span
//! and needs no stylesheet at all.

use super::palette::Palette;
use super::{split_lines, RenderStyle, Renderer, SessionId};
use crate::tokenizer::{Token, TokenKind};
use std::fmt::Write;

/// Renders tokens as an HTML `<pre>` block scoped to one session
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    session: SessionId,
}

impl HtmlRenderer {
    pub fn new(session: SessionId) -> Self {
        HtmlRenderer { session }
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    /// Stylesheet rules for `palette`, scoped to this session's class
    pub fn style_defs(&self, palette: &Palette) -> String {
        let scope = format!(".{}", self.session.css_class());
        let mut css = String::new();
        let _ = writeln!(
            css,
            "{scope} {{ background: {}; color: {} }}",
            palette.background.hex(),
            palette.foreground.hex()
        );
        let _ = writeln!(
            css,
            "{scope} .linenos {{ color: {}; padding-right: 0.5em }}",
            palette.gutter.hex()
        );
        for kind in TokenKind::ALL {
            let decls = palette.style(kind).css();
            if !decls.is_empty() {
                let _ = writeln!(css, "{scope} .{} {{ {decls} }}", kind.css_class());
            }
        }
        css
    }
}

/// Escape text for HTML element content and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

impl Renderer for HtmlRenderer {
    type Output = String;

    fn render(&self, tokens: &[Token<'_>], style: &RenderStyle) -> String {
        let palette = style.palette();
        let lines = split_lines(tokens);
        let width = lines.len().to_string().len();
        let mut html = String::new();

        if style.embedded {
            let _ = write!(
                html,
                "<div style=\"background: {}; color: {}\"><pre>",
                palette.background.hex(),
                palette.foreground.hex()
            );
        } else {
            let _ = write!(html, "<div class=\"{}\"><pre>", self.session.css_class());
        }

        for (row, pieces) in lines.into_iter().enumerate() {
            if row > 0 {
                html.push('\n');
            }
            if style.show_line_numbers {
                let number = format!("{:>width$}", row + 1);
                if style.embedded {
                    let _ = write!(
                        html,
                        "<span style=\"color: {}; padding-right: 0.5em\">{number}</span>",
                        palette.gutter.hex()
                    );
                } else {
                    let _ = write!(html, "<span class=\"linenos\">{number}</span>");
                }
            }
            for (token, text) in pieces {
                let text = escape(text);
                if token.kind == TokenKind::Whitespace {
                    html.push_str(&text);
                } else if style.embedded {
                    let decls = palette.style(token.kind).css();
                    if decls.is_empty() {
                        html.push_str(&text);
                    } else {
                        let _ = write!(html, "<span style=\"{decls}\">{text}</span>");
                    }
                } else {
                    let _ = write!(html, "<span class=\"{}\">{text}</span>", token.kind.css_class());
                }
            }
        }

        html.push_str("</pre></div>");
        html
    }
}
