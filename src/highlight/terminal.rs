//! Ratatui renderer for the interactive viewer

use super::palette::{Rgb, TokenStyle};
use super::{split_lines, RenderStyle, Renderer};
use crate::tokenizer::Token;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};

/// Renders tokens as styled ratatui text, one [`Line`] per source line
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalRenderer;

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

fn span_style(token_style: TokenStyle) -> Style {
    let mut style = Style::default();
    if let Some(fg) = token_style.fg {
        style = style.fg(color(fg));
    }
    if token_style.bold {
        style = style.add_modifier(Modifier::BOLD);
    }
    if token_style.italic {
        style = style.add_modifier(Modifier::ITALIC);
    }
    style
}

impl Renderer for TerminalRenderer {
    type Output = Text<'static>;

    fn render(&self, tokens: &[Token<'_>], style: &RenderStyle) -> Text<'static> {
        let palette = style.palette();
        let lines = split_lines(tokens);
        let width = lines.len().to_string().len();

        let rendered: Vec<Line<'static>> = lines
            .into_iter()
            .enumerate()
            .map(|(row, pieces)| {
                let mut spans = Vec::with_capacity(pieces.len() + 1);
                if style.show_line_numbers {
                    spans.push(Span::styled(
                        format!("{:>width$} ", row + 1),
                        Style::default().fg(color(palette.gutter)),
                    ));
                }
                spans.extend(pieces.into_iter().map(|(token, text)| {
                    Span::styled(text.to_string(), span_style(palette.style(token.kind)))
                }));
                Line::from(spans)
            })
            .collect();

        Text::from(rendered).style(Style::default().fg(color(palette.foreground)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_line_numbers_are_right_aligned() {
        let source = (1..=10).map(|i| format!("%{i}\n")).collect::<String>();
        let tokens = tokenize(&source);
        let text = TerminalRenderer.render(&tokens, &RenderStyle::default());

        assert_eq!(text.lines.len(), 10);
        assert_eq!(line_text(&text.lines[0]), " 1 %1");
        assert_eq!(line_text(&text.lines[9]), "10 %10");
    }

    #[test]
    fn test_without_line_numbers() {
        let tokens = tokenize("return %0");
        let style = RenderStyle {
            show_line_numbers: false,
            ..RenderStyle::default()
        };
        let text = TerminalRenderer.render(&tokens, &style);
        assert_eq!(line_text(&text.lines[0]), "return %0");
    }

    #[test]
    fn test_keyword_is_bold_in_default_palette() {
        let tokens = tokenize("return");
        let style = RenderStyle {
            show_line_numbers: false,
            ..RenderStyle::default()
        };
        let text = TerminalRenderer.render(&tokens, &style);
        let span = &text.lines[0].spans[0];
        assert!(span.style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(span.style.fg, Some(Color::Rgb(0x00, 0x80, 0x00)));
    }
}
