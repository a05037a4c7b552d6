//! Terminal colors derived from a config's theme.

use ratatui::style::Color;
use tessera_types::Theme;

/// Resolved colors for one mounted config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: Color::Cyan,
            secondary: Color::DarkGray,
            accent: Color::Green,
        }
    }
}

impl Palette {
    /// Resolve theme colors; unset or malformed entries keep the defaults.
    pub fn from_theme(theme: Option<&Theme>) -> Self {
        let defaults = Self::default();
        let Some(theme) = theme else {
            return defaults;
        };
        let pick = |value: &Option<String>, fallback: Color| {
            value.as_deref().and_then(parse_hex).unwrap_or(fallback)
        };
        Self {
            primary: pick(&theme.primary, defaults.primary),
            secondary: pick(&theme.secondary, defaults.secondary),
            accent: pick(&theme.accent, defaults.accent),
        }
    }
}

/// Parse `#RRGGBB` or `#RGB`.
pub fn parse_hex(value: &str) -> Option<Color> {
    let hex = value.trim().strip_prefix('#')?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        6 => Some(Color::Rgb(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        3 => {
            let expand = |i: usize| channel(&hex[i..i + 1]).map(|c| c * 17);
            Some(Color::Rgb(expand(0)?, expand(1)?, expand(2)?))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#0099FF"), Some(Color::Rgb(0, 0x99, 0xFF)));
        assert_eq!(parse_hex("#fff"), Some(Color::Rgb(255, 255, 255)));
        assert_eq!(parse_hex("0099FF"), None);
        assert_eq!(parse_hex("#zz99FF"), None);
    }

    #[test]
    fn test_palette_falls_back_per_color() {
        let theme = Theme {
            primary: Some("#10B981".to_string()),
            secondary: Some("teal".to_string()),
            accent: None,
        };
        let palette = Palette::from_theme(Some(&theme));
        assert_eq!(palette.primary, Color::Rgb(0x10, 0xB9, 0x81));
        assert_eq!(palette.secondary, Palette::default().secondary);
        assert_eq!(palette.accent, Palette::default().accent);
    }
}
