//! Terminal styling and number formatting.
//!
//! Colour output honours `NO_COLOR` and `TERM=dumb`.

/// ANSI escape codes used by the text renderer.
pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    /// Section headings.
    pub const WHITE_BOLD: &str = "\x1b[1;97m";
    /// Secondary text such as factor bases and units.
    pub const GRAY: &str = "\x1b[90m";
    pub const CYAN: &str = "\x1b[36m";
    /// Savings and satisfied coverage.
    pub const GREEN: &str = "\x1b[32m";
    /// Similar-cost outcomes.
    pub const YELLOW: &str = "\x1b[33m";
    /// Cost increases and insufficient wall.
    pub const RED: &str = "\x1b[31m";
}

/// Resolved colour codes; empty strings when colour is disabled.
#[derive(Debug, Clone, Copy)]
pub struct ColorPalette {
    pub reset: &'static str,
    pub white_bold: &'static str,
    pub gray: &'static str,
    pub cyan: &'static str,
    pub green: &'static str,
    pub yellow: &'static str,
    pub red: &'static str,
}

impl ColorPalette {
    #[must_use]
    pub const fn colored() -> Self {
        Self {
            reset: colors::RESET,
            white_bold: colors::WHITE_BOLD,
            gray: colors::GRAY,
            cyan: colors::CYAN,
            green: colors::GREEN,
            yellow: colors::YELLOW,
            red: colors::RED,
        }
    }

    #[must_use]
    pub const fn plain() -> Self {
        Self {
            reset: "",
            white_bold: "",
            gray: "",
            cyan: "",
            green: "",
            yellow: "",
            red: "",
        }
    }

    /// Colored when the terminal supports it, plain otherwise.
    #[must_use]
    pub fn detect() -> Self {
        if supports_color() {
            Self::colored()
        } else {
            Self::plain()
        }
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::detect()
    }
}

/// Check if the terminal supports ANSI color codes.
#[must_use]
pub fn supports_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if let Ok(term) = std::env::var("TERM") {
        if term.eq_ignore_ascii_case("dumb") {
            return false;
        }
    }
    true
}

/// Format a number with thousand separators (commas).
///
/// ```
/// # use heatene_cli::terminal::format_with_separators;
/// assert_eq!(format_with_separators(999), "999");
/// assert_eq!(format_with_separators(1234567), "1,234,567");
/// ```
#[must_use]
pub fn format_with_separators(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// Symbol printed before amounts in `currency`.
#[must_use]
pub fn currency_symbol(currency: &str) -> &str {
    match currency {
        "GBP" => "£",
        "USD" => "$",
        "EUR" => "€",
        other => other,
    }
}

/// Format a money amount rounded to whole units, e.g. `£1,234` or `-$56`.
#[must_use]
pub fn format_money(currency: &str, amount: f64) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!(
        "{sign}{}{}",
        currency_symbol(currency),
        format_with_separators(rounded.abs() as u64)
    )
}
