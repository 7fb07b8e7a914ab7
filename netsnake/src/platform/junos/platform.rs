//! Junos CLI session setup and output handling.

/// Sent once after login so output is neither paged nor wrapped.
pub const ON_OPEN_COMMANDS: [&str; 2] = ["set cli screen-length 0", "set cli screen-width 511"];

/// PTY size requested from the device.
pub const TERMINAL_WIDTH: u32 = 511;
pub const TERMINAL_HEIGHT: u32 = 24;

const FAILURE_PATTERNS: [&str; 8] = [
    "unknown command",
    "syntax error",
    "error:",
    "missing argument",
    "is ambiguous",
    "No valid completions",
    "missing mandatory argument",
    "invalid numeric value",
];

/// Context lines Junos prints right above the prompt,
/// e.g. `[edit]` or `{master:0}[edit]`.
fn is_banner(line: &str) -> bool {
    (line.starts_with("[edit") && line.ends_with(']'))
        || (line.starts_with('{') && (line.ends_with('}') || line.ends_with(']')))
}

/// Drop trailing blank lines and the context banner above the prompt.
///
/// Diff hunks carry their own `[edit ...]` headers, so only the tail is
/// touched.
pub fn post_process_output(output: &str) -> String {
    let mut lines: Vec<&str> = output.lines().collect();
    while lines
        .last()
        .is_some_and(|last| last.trim().is_empty() || is_banner(last.trim()))
    {
        lines.pop();
    }
    lines.join("\n")
}

/// The line or pattern that marks `output` as a failed command.
///
/// A `load ... terminal` that hit errors still ends with `load complete`,
/// so its error count is checked first.
pub fn detect_failure(output: &str) -> Option<String> {
    output
        .lines()
        .find(|line| line.contains("load complete (") && line.contains("error"))
        .map(|line| line.trim().to_string())
        .or_else(|| {
            FAILURE_PATTERNS
                .iter()
                .find(|pattern| output.contains(*pattern))
                .map(|pattern| pattern.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_process_output() {
        let output = "Hostname: sw1\nModel: ex4300-48p";
        assert_eq!(post_process_output(output), output);

        assert_eq!(post_process_output("commit complete\n\n[edit]"), "commit complete");
        assert_eq!(post_process_output("commit complete\n{master:0}[edit]"), "commit complete");

        let output = "[edit interfaces ge-0/0/1]\n-   description old;\n+   description new;\n\n[edit]";
        assert_eq!(
            post_process_output(output),
            "[edit interfaces ge-0/0/1]\n-   description old;\n+   description new;"
        );
    }

    #[test]
    fn test_detect_load_errors() {
        assert_eq!(
            detect_failure("terminal:3:(8) syntax error\nload complete (1 errors)"),
            Some("load complete (1 errors)".to_string())
        );
        assert_eq!(detect_failure("load complete"), None);
    }

    #[test]
    fn test_detect_failure_patterns() {
        assert_eq!(
            detect_failure("                  ^\nunknown command."),
            Some("unknown command".to_string())
        );
        assert_eq!(
            detect_failure("error: configuration check-out failed"),
            Some("error:".to_string())
        );
        assert_eq!(detect_failure("Hostname: sw1"), None);
    }
}
