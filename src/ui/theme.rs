//! Visual theme and styling.

use console::Style;

/// Styles used across command output.
#[derive(Debug, Clone)]
pub struct StrataTheme {
    /// Success messages (green).
    pub success: Style,
    /// Warnings (yellow).
    pub warning: Style,
    /// Errors (red bold).
    pub error: Style,
    /// Secondary text (dim).
    pub dim: Style,
    /// Emphasis (bold).
    pub highlight: Style,
    /// Headers (cyan bold).
    pub header: Style,
    /// Key labels in key-value displays (bold).
    pub key: Style,
    /// Template ids and versions (cyan).
    pub id: Style,
    /// Hints (cyan dim).
    pub hint: Style,
}

impl Default for StrataTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl StrataTheme {
    /// Create the colored theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().yellow(),
            error: Style::new().red().bold(),
            dim: Style::new().dim(),
            highlight: Style::new().bold(),
            header: Style::new().cyan().bold(),
            key: Style::new().bold(),
            id: Style::new().cyan(),
            hint: Style::new().cyan().dim(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            dim: Style::new(),
            highlight: Style::new(),
            header: Style::new(),
            key: Style::new(),
            id: Style::new(),
            hint: Style::new(),
        }
    }

    /// Format a success message (icon + text in green).
    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    /// Format a warning message.
    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    /// Format an error message.
    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    /// Format a header banner.
    pub fn format_header(&self, title: &str) -> String {
        format!(
            "{} {}",
            self.header.apply_to("▤"),
            self.highlight.apply_to(title)
        )
    }

    /// Format a hint line.
    pub fn format_hint(&self, hint: &str) -> String {
        format!("{}", self.hint.apply_to(format!("→ {}", hint)))
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    console::Term::stdout().is_term()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_theme_formats_messages() {
        let theme = StrataTheme::plain();
        assert_eq!(theme.format_success("Done"), "✓ Done");
        assert_eq!(theme.format_warning("Careful"), "⚠ Careful");
        assert_eq!(theme.format_error("Failed"), "✗ Failed");
        assert_eq!(theme.format_hint("strata list"), "→ strata list");
    }

    #[test]
    fn header_contains_title() {
        let msg = StrataTheme::plain().format_header("ios-base@1.0.0");
        assert!(msg.contains("ios-base@1.0.0"));
    }

    #[test]
    fn default_impl_matches_new() {
        assert_eq!(
            StrataTheme::default().format_success("x"),
            StrataTheme::new().format_success("x")
        );
    }
}
