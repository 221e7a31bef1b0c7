//! Named highlight palettes
//!
//! A palette assigns a foreground colour and emphasis to every [`TokenKind`].
//! Palettes are plain constants; both renderers read from the same table so
//! terminal and HTML output agree.

use crate::tokenizer::TokenKind;

/// 24-bit colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// `#rrggbb`
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// How one token kind is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenStyle {
    /// `None` inherits the palette foreground
    pub fg: Option<Rgb>,
    pub bold: bool,
    pub italic: bool,
}

impl TokenStyle {
    const PLAIN: TokenStyle = TokenStyle {
        fg: None,
        bold: false,
        italic: false,
    };

    const fn fg(rgb: Rgb) -> Self {
        TokenStyle {
            fg: Some(rgb),
            bold: false,
            italic: false,
        }
    }

    const fn bold(self) -> Self {
        TokenStyle { bold: true, ..self }
    }

    const fn italic(self) -> Self {
        TokenStyle {
            italic: true,
            ..self
        }
    }

    /// Inline CSS declarations for this style
    pub fn css(&self) -> String {
        let mut decls = Vec::new();
        if let Some(fg) = self.fg {
            decls.push(format!("color: {}", fg.hex()));
        }
        if self.bold {
            decls.push("font-weight: bold".to_string());
        }
        if self.italic {
            decls.push("font-style: italic".to_string());
        }
        decls.join("; ")
    }
}

/// A named colour scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub name: &'static str,
    pub background: Rgb,
    pub foreground: Rgb,
    /// Line-number gutter colour
    pub gutter: Rgb,
    /// Indexed in [`TokenKind::ALL`] order
    styles: [TokenStyle; 11],
}

impl Palette {
    /// Style for a token kind
    pub fn style(&self, kind: TokenKind) -> TokenStyle {
        self.styles[kind as usize]
    }

    /// Look up a palette by name (case-insensitive)
    pub fn by_name(name: &str) -> Option<&'static Palette> {
        PALETTES
            .iter()
            .find(|palette| palette.name.eq_ignore_ascii_case(name))
    }

    /// The palette used when none is configured
    pub fn default_palette() -> &'static Palette {
        &PALETTES[0]
    }

    pub fn names() -> impl Iterator<Item = &'static str> {
        PALETTES.iter().map(|palette| palette.name)
    }
}

pub static PALETTES: [Palette; 4] = [
    Palette {
        name: "default",
        background: Rgb(0xf8, 0xf8, 0xf8),
        foreground: Rgb(0x00, 0x00, 0x00),
        gutter: Rgb(0x99, 0x99, 0x99),
        styles: [
            TokenStyle::PLAIN,
            TokenStyle::fg(Rgb(0x3d, 0x7b, 0x7b)).italic(),
            TokenStyle::fg(Rgb(0xba, 0x21, 0x21)),
            TokenStyle::fg(Rgb(0x76, 0x76, 0x00)),
            TokenStyle::fg(Rgb(0x00, 0x80, 0x00)).bold(),
            TokenStyle::fg(Rgb(0xb0, 0x00, 0x40)),
            TokenStyle::fg(Rgb(0x00, 0x00, 0xff)),
            TokenStyle::fg(Rgb(0x19, 0x17, 0x7c)),
            TokenStyle::fg(Rgb(0x66, 0x66, 0x66)),
            TokenStyle::PLAIN,
            TokenStyle::PLAIN,
        ],
    },
    Palette {
        name: "monokai",
        background: Rgb(0x27, 0x28, 0x22),
        foreground: Rgb(0xf8, 0xf8, 0xf2),
        gutter: Rgb(0x75, 0x71, 0x5e),
        styles: [
            TokenStyle::PLAIN,
            TokenStyle::fg(Rgb(0x75, 0x71, 0x5e)).italic(),
            TokenStyle::fg(Rgb(0xe6, 0xdb, 0x74)),
            TokenStyle::fg(Rgb(0xa6, 0xe2, 0x2e)),
            TokenStyle::fg(Rgb(0x66, 0xd9, 0xef)),
            TokenStyle::fg(Rgb(0x66, 0xd9, 0xef)).italic(),
            TokenStyle::fg(Rgb(0xa6, 0xe2, 0x2e)),
            TokenStyle::fg(Rgb(0xfd, 0x97, 0x1f)),
            TokenStyle::fg(Rgb(0xae, 0x81, 0xff)),
            TokenStyle::fg(Rgb(0xf9, 0x26, 0x72)),
            TokenStyle::PLAIN,
        ],
    },
    Palette {
        name: "solarized-dark",
        background: Rgb(0x00, 0x2b, 0x36),
        foreground: Rgb(0x83, 0x94, 0x96),
        gutter: Rgb(0x58, 0x6e, 0x75),
        styles: [
            TokenStyle::PLAIN,
            TokenStyle::fg(Rgb(0x58, 0x6e, 0x75)).italic(),
            TokenStyle::fg(Rgb(0x2a, 0xa1, 0x98)),
            TokenStyle::fg(Rgb(0xcb, 0x4b, 0x16)),
            TokenStyle::fg(Rgb(0x85, 0x99, 0x00)),
            TokenStyle::fg(Rgb(0xb5, 0x89, 0x00)),
            TokenStyle::fg(Rgb(0x26, 0x8b, 0xd2)),
            TokenStyle::fg(Rgb(0x6c, 0x71, 0xc4)),
            TokenStyle::fg(Rgb(0xd3, 0x36, 0x82)),
            TokenStyle::PLAIN,
            TokenStyle::PLAIN,
        ],
    },
    Palette {
        name: "bw",
        background: Rgb(0xff, 0xff, 0xff),
        foreground: Rgb(0x00, 0x00, 0x00),
        gutter: Rgb(0x00, 0x00, 0x00),
        styles: [
            TokenStyle::PLAIN,
            TokenStyle::PLAIN.italic(),
            TokenStyle::PLAIN.italic(),
            TokenStyle::PLAIN,
            TokenStyle::PLAIN.bold(),
            TokenStyle::PLAIN.bold(),
            TokenStyle::PLAIN,
            TokenStyle::PLAIN,
            TokenStyle::PLAIN,
            TokenStyle::PLAIN,
            TokenStyle::PLAIN,
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(Palette::by_name("Monokai").unwrap().name, "monokai");
        assert!(Palette::by_name("nope").is_none());
    }

    #[test]
    fn test_default_palette_is_listed_first() {
        assert_eq!(Palette::names().next(), Some("default"));
        assert_eq!(Palette::default_palette().name, "default");
    }

    #[test]
    fn test_style_indexing_follows_kind_order() {
        let palette = Palette::by_name("default").unwrap();
        assert!(palette.style(TokenKind::Keyword).bold);
        assert!(palette.style(TokenKind::Comment).italic);
        assert_eq!(palette.style(TokenKind::Whitespace), TokenStyle::PLAIN);
    }

    #[test]
    fn test_css() {
        let style = TokenStyle::fg(Rgb(0, 0x80, 0)).bold();
        assert_eq!(style.css(), "color: #008000; font-weight: bold");
    }
}
