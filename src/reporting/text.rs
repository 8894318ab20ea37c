use crate::reporting::aggregate::{classify_line, ScanReport, ScanResult};
use crate::reporting::model::Severity;
use unicode_width::UnicodeWidthStr;

// ==============================
// BOX CONFIGURATION
// ==============================

const BOX_WIDTH: usize = 70;
const INNER_WIDTH: usize = BOX_WIDTH - 2;

// ==============================
// WIDTH HANDLING
// ==============================

fn visual_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

// ==============================
// BOX RENDERING HELPERS
// ==============================

fn top_border() -> String {
    format!("╔{}╗", "═".repeat(INNER_WIDTH))
}

fn middle_border() -> String {
    format!("╠{}╣", "═".repeat(INNER_WIDTH))
}

fn bottom_border() -> String {
    format!("╚{}╝", "═".repeat(INNER_WIDTH))
}

/// Left-aligned box line (emoji-safe)
fn box_line(content: &str) -> String {
    let safe_content = format!(" {} ", content);
    let width = visual_width(&safe_content);

    let padding = INNER_WIDTH.saturating_sub(width);
    format!("║{}{}║", safe_content, " ".repeat(padding))
}

/// Centered box line (emoji-safe)
fn box_line_centered(content: &str) -> String {
    let safe_content = format!(" {} ", content);
    let width = visual_width(&safe_content);

    if width >= INNER_WIDTH {
        return box_line(content);
    }

    let remaining = INNER_WIDTH - width;
    let left = remaining / 2;
    let right = remaining - left;

    format!(
        "║{}{}{}║",
        " ".repeat(left),
        safe_content,
        " ".repeat(right)
    )
}

fn marker(severity: Severity) -> &'static str {
    match severity {
        Severity::High => "[!]",
        Severity::Medium => "[?]",
        Severity::Low => "[-]",
        Severity::Info => "[+]",
    }
}

// ==============================
// MAIN REPORT RENDERER
// ==============================

pub fn render(reports: &[ScanReport]) -> String {
    let mut out: Vec<String> = Vec::new();

    for report in reports {
        let tally = report.tally();

        // ------------------------------
        // SUMMARY BOX
        // ------------------------------
        out.push(String::new());
        out.push(top_border());
        if tally.issues() == 0 {
            out.push(box_line_centered("🎉 SCAN COMPLETE"));
        } else {
            out.push(box_line_centered("SECURITY ISSUES DETECTED"));
        }
        out.push(middle_border());
        out.push(box_line(&format!("Target: {}", report.target)));
        out.push(box_line(&format!("Scans run: {}", report.results.len())));

        if tally.issues() == 0 {
            out.push(box_line("✅ No vulnerabilities detected"));
        }
        if tally.high > 0 {
            out.push(box_line(&format!("{}: {}", Severity::High, tally.high)));
        }
        if tally.medium > 0 {
            out.push(box_line(&format!("{}: {}", Severity::Medium, tally.medium)));
        }
        if tally.low > 0 {
            out.push(box_line(&format!("{}: {}", Severity::Low, tally.low)));
        }
        out.push(bottom_border());

        // ------------------------------
        // PER-SCAN SECTIONS
        // ------------------------------
        for (scan_type, result) in &report.results {
            out.push(String::new());
            out.push("═".repeat(BOX_WIDTH));
            out.push(format!("{} ({})", scan_type.label(), scan_type));
            out.push("═".repeat(BOX_WIDTH));

            match result {
                ScanResult::Findings(lines) => {
                    for line in lines {
                        out.push(format!("  {} {}", marker(classify_line(line)), line));
                    }
                }
                ScanResult::Headers(headers) => {
                    out.push(format!(
                        "  Vulnerable:           {}",
                        if headers.vulnerable { "Yes" } else { "No" }
                    ));
                    out.push(format!(
                        "  X-Frame-Options:      {}",
                        headers.x_frame_options.as_deref().unwrap_or("(absent)")
                    ));
                    out.push(format!(
                        "  CSP frame-ancestors:  {}",
                        headers.csp_frame_ancestors.as_deref().unwrap_or("(absent)")
                    ));
                    for detail in &headers.details {
                        out.push(format!("  - {}", detail));
                    }
                }
            }
        }
    }

    out.push(String::new());
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::capability::ScanType;

    #[test]
    fn test_box_lines_have_fixed_width() {
        for line in [top_border(), box_line("✅ ok"), box_line_centered("🎉 done")] {
            assert_eq!(visual_width(&line), BOX_WIDTH);
        }
    }

    #[test]
    fn test_render_lists_each_scan() {
        let mut report = ScanReport::new("http://t.test/");
        report.results.push((
            ScanType::Lfi,
            ScanResult::Findings(vec!["No LFI vulnerabilities found".to_string()]),
        ));
        report.results.push((
            ScanType::XssReflected,
            ScanResult::Findings(vec![
                "Reflected XSS found in URL parameter 'q' with payload: x".to_string(),
            ]),
        ));

        let text = render(&[report]);
        assert!(text.contains("SECURITY ISSUES DETECTED"));
        assert!(text.contains("LFI (lfi)"));
        assert!(text.contains("  [+] No LFI vulnerabilities found"));
        assert!(text.contains("  [!] Reflected XSS found in URL parameter 'q'"));
    }
}
