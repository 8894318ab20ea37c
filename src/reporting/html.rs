use crate::reporting::aggregate::{classify_line, ScanReport, ScanResult};
use crate::reporting::model::Severity;

const STYLE: &str = r#"
body { font-family: 'Segoe UI', Tahoma, sans-serif; background: #f5f5f5; color: #333; margin: 0; }
.container { max-width: 1100px; margin: 0 auto; padding: 20px; background: #fff; }
header { background: #2c3e50; color: #fff; padding: 20px; border-radius: 5px; }
header h1 { margin: 0; }
.summary { display: flex; gap: 16px; margin: 20px 0; }
.summary div { flex: 1; padding: 12px; border-radius: 5px; background: #ecf0f1; text-align: center; }
.summary b { display: block; font-size: 1.8em; }
section { margin-bottom: 24px; }
h3 { border-bottom: 2px solid #3498db; padding-bottom: 6px; }
li { margin: 4px 0; }
.high { color: #e74c3c; font-weight: bold; }
.medium { color: #f39c12; }
.low { color: #7f8c8d; }
.info { color: #2ecc71; }
table { border-collapse: collapse; }
td { padding: 4px 12px 4px 0; }
"#;

/// Escape text for use in element content and quoted attributes.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn css_class(severity: Severity) -> &'static str {
    match severity {
        Severity::High => "high",
        Severity::Medium => "medium",
        Severity::Low => "low",
        Severity::Info => "info",
    }
}

fn render_result(result: &ScanResult, out: &mut Vec<String>) {
    match result {
        ScanResult::Findings(lines) => {
            out.push("<ul>".to_string());
            for line in lines {
                out.push(format!(
                    "<li class=\"{}\">{}</li>",
                    css_class(classify_line(line)),
                    escape(line)
                ));
            }
            out.push("</ul>".to_string());
        }
        ScanResult::Headers(report) => {
            let verdict = if report.vulnerable {
                "<span class=\"high\">Yes</span>"
            } else {
                "<span class=\"info\">No</span>"
            };
            let absent = "(absent)".to_string();
            out.push("<table>".to_string());
            out.push(format!("<tr><td>Vulnerable</td><td>{}</td></tr>", verdict));
            out.push(format!(
                "<tr><td>X-Frame-Options</td><td>{}</td></tr>",
                escape(report.x_frame_options.as_ref().unwrap_or(&absent))
            ));
            out.push(format!(
                "<tr><td>CSP frame-ancestors</td><td>{}</td></tr>",
                escape(report.csp_frame_ancestors.as_ref().unwrap_or(&absent))
            ));
            out.push("</table>".to_string());
            out.push("<ul>".to_string());
            for detail in &report.details {
                out.push(format!("<li>{}</li>", escape(detail)));
            }
            out.push("</ul>".to_string());
        }
    }
}

pub fn render(reports: &[ScanReport]) -> String {
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let mut out: Vec<String> = vec![
        "<!DOCTYPE html>".to_string(),
        "<html lang=\"en\">".to_string(),
        "<head>".to_string(),
        "<meta charset=\"UTF-8\">".to_string(),
        format!("<title>CyberNexus Scan Report - {}</title>", timestamp),
        format!("<style>{}</style>", STYLE),
        "</head>".to_string(),
        "<body><div class=\"container\">".to_string(),
        "<header><h1>CyberNexus Scan Report</h1>".to_string(),
        format!("<p>Generated {}</p></header>", timestamp),
    ];

    for report in reports {
        let tally = report.tally();
        out.push(format!("<h2>{}</h2>", escape(&report.target)));
        out.push("<div class=\"summary\">".to_string());
        for (label, count, class) in [
            ("High", tally.high, "high"),
            ("Medium", tally.medium, "medium"),
            ("Low", tally.low, "low"),
            ("Info", tally.info, "info"),
        ] {
            out.push(format!(
                "<div class=\"{}\"><b>{}</b>{}</div>",
                class, count, label
            ));
        }
        out.push("</div>".to_string());

        for (scan_type, result) in &report.results {
            out.push("<section>".to_string());
            out.push(format!(
                "<h3>{} <small>({})</small></h3>",
                escape(scan_type.label()),
                scan_type
            ));
            render_result(result, &mut out);
            out.push("</section>".to_string());
        }
    }

    out.push("</div></body></html>".to_string());
    out.join("\n")
}
