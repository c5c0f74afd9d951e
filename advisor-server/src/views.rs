//! HTML rendering for the single-page form

use std::fmt::Write;

use potability_core::logic::features::{guideline_for, GUIDELINES};
use potability_core::Verdict;

use crate::models::FormState;

const STYLE: &str = "body{font-family:sans-serif;max-width:960px;margin:2rem auto;padding:0 1rem}\
label{display:block;margin-top:.6rem}\
.error{color:#b00020}\
.potable{color:#1b5e20}\
.not-potable{color:#b00020}\
table{border-collapse:collapse}td,th{border:1px solid #ccc;padding:.25rem .6rem}";

/// Escape text for element content and quoted attributes
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

/// Full page. `verdict` is only present after a successful check.
pub fn render_page(form: &FormState, verdict: Option<&Verdict>) -> String {
    let mut html = String::with_capacity(8 * 1024);

    html.push_str("<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">");
    html.push_str("<title>Water Potability Check</title>");
    let _ = write!(html, "<style>{}</style></head><body>", STYLE);
    html.push_str("<h1>Water Potability Check</h1>");
    html.push_str(
        "<p>Enter the nine water-quality measurements and press <em>Check</em>. \
         Nothing is evaluated until you do.</p>",
    );

    render_guidelines(&mut html);
    render_form(&mut html, form);

    if let Some(verdict) = verdict {
        render_verdict(&mut html, verdict);
    }

    html.push_str("</body></html>");
    html
}

fn render_guidelines(html: &mut String) {
    html.push_str("<details><summary>Drinking-water guidelines</summary><table>");
    html.push_str("<tr><th>Parameter</th><th>Safe range</th><th>Risk</th></tr>");
    for g in GUIDELINES {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&g.field.spec().display_label()),
            escape(g.safe_range),
            escape(g.risk)
        );
    }
    html.push_str("</table></details>");
}

fn render_form(html: &mut String, form: &FormState) {
    if form.has_errors() {
        html.push_str("<div class=\"error\" role=\"alert\"><strong>Please fix the highlighted values.</strong><ul>");
        for message in form.errors() {
            let _ = write!(html, "<li>{}</li>", escape(message));
        }
        html.push_str("</ul></div>");
    }

    html.push_str("<form method=\"post\" action=\"/check\">");
    for entry in form.entries() {
        let spec = entry.field.spec();
        let key = entry.field.key();
        let _ = write!(
            html,
            "<label for=\"{key}\">{label}</label>\
             <input type=\"number\" id=\"{key}\" name=\"{key}\" value=\"{value}\" \
             min=\"{min}\" max=\"{max}\" step=\"{step}\" required>",
            key = key,
            label = escape(&spec.display_label()),
            value = escape(&entry.raw),
            min = spec.min,
            max = spec.max,
            step = spec.step,
        );
        if let Some(help) = spec.help {
            let _ = write!(html, " <small>{}</small>", escape(help));
        }
        if let Some(error) = &entry.error {
            let _ = write!(html, " <span class=\"error\">{}</span>", escape(error));
        }
    }
    html.push_str("<p><button type=\"submit\">Check</button></p></form>");
}

fn render_verdict(html: &mut String, verdict: &Verdict) {
    let class = if verdict.is_potable() { "potable" } else { "not-potable" };

    let _ = write!(
        html,
        "<section id=\"verdict\"><h2 class=\"{}\">{}</h2><p>{}</p>",
        class,
        escape(verdict.headline()),
        escape(verdict.conclusion())
    );
    let _ = write!(
        html,
        "<p>Model confidence: <strong>{}</strong></p>\
         <progress max=\"100\" value=\"{}\"></progress>",
        escape(&verdict.confidence_display()),
        verdict.progress()
    );

    html.push_str(
        "<h3>Submitted values</h3><table>\
         <tr><th>Parameter</th><th>Value</th><th>Guideline</th></tr>",
    );
    for (field, value) in verdict.sample.named_values() {
        let note = match guideline_for(field) {
            Some(g) if g.is_within(value) => format!("within {}", escape(g.safe_range)),
            Some(g) => format!(
                "<span class=\"error\">outside {}</span>",
                escape(g.safe_range)
            ),
            None => String::new(),
        };
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&field.spec().display_label()),
            value,
            note
        );
    }
    html.push_str("</table></section>");
}

/// Generic failure page for the form route; details stay in the log
pub fn render_error_page() -> String {
    let mut html = String::with_capacity(1024);
    html.push_str("<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">");
    html.push_str("<title>Water Potability Check</title>");
    let _ = write!(html, "<style>{}</style></head><body>", STYLE);
    html.push_str("<h1>Water Potability Check</h1>");
    html.push_str(
        "<p class=\"error\" role=\"alert\">The check could not be completed. \
         Please try again later.</p><p><a href=\"/\">Back to the form</a></p>",
    );
    html.push_str("</body></html>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_handles_markup() {
        assert_eq!(escape("<a href=\"x\">&</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }

    #[test]
    fn defaults_page_has_inputs_and_no_verdict() {
        let page = render_page(&FormState::defaults(), None);
        assert!(page.contains("name=\"ph\" value=\"7.08\" min=\"0\" max=\"14\""));
        assert!(page.contains("name=\"solids\" value=\"22000\""));
        assert!(page.contains("Drinking-water guidelines"));
        assert!(!page.contains("id=\"verdict\""));
    }

    #[test]
    fn error_page_is_generic_html() {
        let page = render_error_page();
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("could not be completed"));
        assert!(page.contains("href=\"/\""));
    }
}
