//! Usage listing and diagnostics for the driver itself
//!
//! Rendering is a pure function of the listing, so the same registry always
//! produces the same bytes.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::registry::{CommandListing, ListedCommand};

/// Left margin for listed names and the gap before descriptions
pub const INDENT: usize = 4;

/// Assumed terminal width
pub const TERMINAL_WIDTH: usize = 80;

/// Render the driver usage screen.
///
/// ```text
/// Usage: mytool <command> [<args>]
///
/// The currently available commands are:
///     alpha    First command
///
/// The following commands could not be loaded:
///     beta     bad metadata
///
/// See 'mytool help <command>' for more information on a specific command.
/// ```
pub fn render_usage(driver_name: &str, listing: &CommandListing) -> String {
    let name_width = listing.max_name_width();
    let desc_column = INDENT + name_width + INDENT;
    let desc_width = TERMINAL_WIDTH.saturating_sub(desc_column);

    let mut lines = vec![
        format!("Usage: {} <command> [<args>]", driver_name),
        String::new(),
        "The currently available commands are:".to_string(),
    ];

    for command in &listing.valid {
        let brief = command.text.lines().next().unwrap_or("");
        lines.push(listing_line(
            command,
            name_width,
            &truncate_to_width(brief, desc_width),
        ));
    }

    if !listing.invalid.is_empty() {
        lines.push(String::new());
        lines.push("The following commands could not be loaded:".to_string());
        for command in &listing.invalid {
            let mut text = command.text.lines();
            let first = text.next().unwrap_or("");
            lines.push(listing_line(command, name_width, first));
            for rest in text {
                lines.push(format!("{}{}", " ".repeat(desc_column), rest).trim_end().to_string());
            }
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "See '{} help <command>' for more information on a specific command.",
        driver_name
    ));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn listing_line(command: &ListedCommand, name_width: usize, text: &str) -> String {
    let pad = name_width.saturating_sub(command.name.width());
    format!(
        "{indent}{name}{pad}{indent}{text}",
        indent = " ".repeat(INDENT),
        name = command.name,
        pad = " ".repeat(pad),
        text = text,
    )
    .trim_end()
    .to_string()
}

/// Explanation printed after `Unrecognized command: <name>`.
pub fn render_unknown_command(driver_name: &str, module_id: &str, command: &str) -> String {
    let explanation = format!(
        "'{}' is not a command in the '{}' command configuration. It may be \
         misspelled, or its descriptor may not be installed. To see a list of \
         all available commands, run:",
        command, module_id
    );

    let mut lines = wrap_text(&explanation, TERMINAL_WIDTH);
    lines.push(String::new());
    lines.push(format!("{}{} help", " ".repeat(INDENT), driver_name));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Greedy word wrap to `width` display columns. Words wider than `width`
/// get a line of their own.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.width() + 1 + word.width() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Cut `text` to at most `width` display columns, without ellipsis.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    let mut used = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> CommandListing {
        CommandListing {
            valid: vec![ListedCommand {
                name: "alpha".into(),
                text: "First command".into(),
            }],
            invalid: vec![ListedCommand {
                name: "beta".into(),
                text: "bad metadata".into(),
            }],
        }
    }

    #[test]
    fn test_render_usage_layout() {
        let text = render_usage("mytool", &listing());
        let expected = "\
Usage: mytool <command> [<args>]

The currently available commands are:
    alpha    First command

The following commands could not be loaded:
    beta     bad metadata

See 'mytool help <command>' for more information on a specific command.
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_invalid_section_only_when_needed() {
        let mut listing = listing();
        listing.invalid.clear();
        let text = render_usage("mytool", &listing);
        assert!(!text.contains("could not be loaded"));
        assert!(text.contains("    alpha    First command\n"));
    }

    #[test]
    fn test_descriptions_truncated_errors_not() {
        let long = "x".repeat(200);
        let listing = CommandListing {
            valid: vec![ListedCommand {
                name: "alpha".into(),
                text: long.clone(),
            }],
            invalid: vec![ListedCommand {
                name: "beta".into(),
                text: long.clone(),
            }],
        };
        let text = render_usage("mytool", &listing);
        let alpha = text.lines().find(|l| l.contains("alpha")).unwrap();
        assert_eq!(alpha.width(), TERMINAL_WIDTH);
        assert!(text.contains(&long));
    }

    #[test]
    fn test_multiline_error_is_indented_to_column() {
        let listing = CommandListing {
            valid: vec![],
            invalid: vec![ListedCommand {
                name: "beta".into(),
                text: "first line\nsecond line".into(),
            }],
        };
        let text = render_usage("mytool", &listing);
        assert!(text.contains("    beta    first line\n            second line\n"));
    }

    #[test]
    fn test_render_is_deterministic() {
        assert_eq!(
            render_usage("mytool", &listing()),
            render_usage("mytool", &listing())
        );
    }

    #[test]
    fn test_unknown_command_hint() {
        let text = render_unknown_command("mytool", "mytool.commands", "nonexistent");
        assert!(text.contains("'nonexistent'"));
        assert!(text.ends_with("\n\n    mytool help\n"));
        assert!(text.lines().all(|l| l.width() <= TERMINAL_WIDTH));
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("a bb ccc", 4), vec!["a bb", "ccc"]);
        assert_eq!(wrap_text("averylongword x", 4), vec!["averylongword", "x"]);
        assert!(wrap_text("   ", 10).is_empty());
    }

    #[test]
    fn test_truncate_by_display_width() {
        assert_eq!(truncate_to_width("hello", 3), "hel");
        assert_eq!(truncate_to_width("日本語", 4), "日本");
        assert_eq!(truncate_to_width("hi", 0), "");
    }
}
