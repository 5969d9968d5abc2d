//! Human-readable rendering of a [`ValidationResult`].

use std::fmt::Write;

use crate::core::ValidationResult;
use crate::diagnostics::Diagnostic;

/// Render a result as a plain-text summary. Pure function of the result.
pub fn render_text(result: &ValidationResult) -> String {
    let mut out = String::new();

    if result.valid {
        out.push_str("Circuit is valid\n");
    } else {
        out.push_str("Circuit is NOT valid\n");
    }

    if result.total_issues() == 0 {
        out.push_str("  No issues found\n");
        return out;
    }

    render_section(&mut out, "ERRORS", &result.errors);
    render_section(&mut out, "WARNINGS", &result.warnings);

    out.push_str("\n  Summary:\n");
    let _ = writeln!(out, "    Errors:   {}", result.errors.len());
    let _ = writeln!(out, "    Warnings: {}", result.warnings.len());
    out
}

fn render_section(out: &mut String, title: &str, diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n  {}:", title);
    for diagnostic in diagnostics {
        let _ = writeln!(out, "    - [{}] {}", diagnostic.code(), diagnostic.message);
        if diagnostic.location != "circuit" {
            let _ = writeln!(out, "      Location: {}", diagnostic.location);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticKind;

    #[test]
    fn test_clean_result() {
        let result = ValidationResult::from_diagnostics(vec![], false);
        let text = render_text(&result);
        assert!(text.starts_with("Circuit is valid"));
        assert!(text.contains("No issues found"));
    }

    #[test]
    fn test_sections_and_locations() {
        let result = ValidationResult::from_diagnostics(
            vec![
                Diagnostic::new(
                    "r1",
                    DiagnosticKind::InvalidResistorPlacement { pin_count: 3 },
                    "Resistor 'r1' must have exactly 2 placed pins, found 3",
                ),
                Diagnostic::circuit(DiagnosticKind::NoConnections, "Circuit has components but no wires"),
            ],
            false,
        );

        let text = render_text(&result);
        assert!(text.starts_with("Circuit is NOT valid"));
        assert!(text.contains("ERRORS:"));
        assert!(text.contains("[INVALID_RESISTOR_PLACEMENT]"));
        assert!(text.contains("Location: r1"));
        assert!(text.contains("WARNINGS:"));
        assert!(!text.contains("Location: circuit"));
        assert!(text.contains("Errors:   1"));
    }
}
