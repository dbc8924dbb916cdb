//! Terminal capability detection and styling

use owo_colors::{colors::css, OwoColorize};

/// Whether stdout should receive colored output.
pub fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Terminal width in columns, if stdout is a terminal.
pub fn width() -> Option<usize> {
    terminal_size::terminal_size().map(|(w, _)| usize::from(w.0))
}

/// Extension trait for styling output text.
///
/// Styling is dropped when the terminal does not support color, so the
/// result is always safe to print.
pub trait Colorize {
    /// Green, for completed actions.
    fn success(&self) -> String;
    /// Amber, for things that need attention.
    fn warning(&self) -> String;
    /// Bold blue, for table headers and titles.
    fn heading(&self) -> String;
    /// Dimmed, for secondary details.
    fn dim(&self) -> String;
}

impl<T: AsRef<str> + ?Sized> Colorize for T {
    fn success(&self) -> String {
        paint(self.as_ref(), |text| text.fg::<css::Green>().to_string())
    }

    fn warning(&self) -> String {
        paint(self.as_ref(), |text| text.fg::<css::Orange>().to_string())
    }

    fn heading(&self) -> String {
        paint(self.as_ref(), |text| text.fg::<css::LightBlue>().bold().to_string())
    }

    fn dim(&self) -> String {
        paint(self.as_ref(), |text| text.dimmed().to_string())
    }
}

fn paint(text: &str, style: impl FnOnce(&str) -> String) -> String {
    if supports_color() {
        style(text)
    } else {
        text.to_string()
    }
}
