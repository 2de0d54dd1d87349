//! # HTML Representation
//!
//! Renders the `.html` representation of a resolved entity: the same
//! fields as the JSON representation, with hyperlink fields rendered as
//! anchors to their canonical URIs.

use standreg_core::Hyperlink;

/// Minimal HTML escaping for text and attribute positions.
fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn render_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => escape(s),
        other => escape(&other.to_string()),
    }
}

/// Render an entity page: a definition list of fields, with hyperlink
/// fields as anchors.
pub fn entity_page(uri: &str, entity: &serde_json::Value, links: &[Hyperlink]) -> String {
    let mut rows = String::new();
    if let Some(map) = entity.as_object() {
        for (field, value) in map {
            let rendered = match links.iter().find(|l| l.field == field.as_str()) {
                Some(link) => format!(
                    r#"<a href="{}">{}</a>"#,
                    escape(&link.uri),
                    render_value(value)
                ),
                None => render_value(value),
            };
            rows.push_str(&format!(
                "      <dt>{}</dt><dd>{}</dd>\n",
                escape(field),
                rendered
            ));
        }
        // Hyperlink fields with no underlying stored field still render,
        // e.g. the derived `jurisdiction` link on a vocabulary.
        for link in links {
            if !map.contains_key(link.field) {
                rows.push_str(&format!(
                    r#"      <dt>{}</dt><dd><a href="{}">{}</a></dd>{}"#,
                    escape(link.field),
                    escape(&link.uri),
                    escape(&link.uri),
                    "\n"
                ));
            }
        }
    }
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <title>{title}</title>
  </head>
  <body>
    <h1><code>{title}</code></h1>
    <dl>
{rows}    </dl>
  </body>
</html>
"#,
        title = escape(uri),
        rows = rows
    )
}

// =============================================================================
// TESTS
// =============================================================================
