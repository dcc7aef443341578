//! CLI-visible text (spec.md §6).
//!
//! All stdout is line-prefixed with `git-sync-world: `; errors additionally
//! carry `ERROR - `. Narrowed from the teacher's `styling.rs` (`ERROR`,
//! `ERROR_EMOJI` constants rendered ahead of a message) to a single bold-red
//! prefix — no emoji, no hyperlinks, since the wire format here is a plain
//! prefixed line rather than a rich terminal UI.

use anstyle::{AnsiColor, Color, Style};

const ERROR_STYLE: Style = Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Red)));

pub fn announce(message: &str) {
    println!("git-sync-world: {message}");
}

pub fn error(message: &str) {
    println!(
        "git-sync-world: {}ERROR - {message}{}",
        ERROR_STYLE.render(),
        ERROR_STYLE.render_reset()
    );
}

/// Renders a world/local revision id for display; the pre-tracking
/// sentinel (empty string) is shown as a label rather than blank.
pub fn display_id(id: &str) -> &str {
    if id.is_empty() {
        "(pre-tracking)"
    } else {
        id
    }
}
