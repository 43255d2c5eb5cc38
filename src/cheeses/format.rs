use serde_json::Value;

/// Representations a listing collection can be served as, negotiated from
/// the Accept header. JSON is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Html,
    Csv,
}

pub fn negotiate(accept: Option<&str>) -> Format {
    match accept {
        Some(a) if a.contains("text/csv") => Format::Csv,
        Some(a) if a.contains("text/html") => Format::Html,
        _ => Format::Json,
    }
}

fn cell(row: &Value, field: &str) -> String {
    match row.get(field) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Render one collection page as CSV, one column per serialized field.
pub fn csv_document(fields: &[String], rows: &[Value]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(fields)?;
    for row in rows {
        let record: Vec<String> = fields.iter().map(|f| cell(row, f)).collect();
        writer.write_record(&record)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("finalize csv: {e}"))?;
    Ok(String::from_utf8(bytes)?)
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render one collection page as a plain HTML table document.
pub fn html_document(fields: &[String], rows: &[Value]) -> String {
    let mut out = String::from(
        "<!DOCTYPE html>\n<html>\n<head><title>Cheese listings</title></head>\n<body>\n<table>\n<tr>",
    );
    for field in fields {
        out.push_str("<th>");
        out.push_str(&escape_html(field));
        out.push_str("</th>");
    }
    out.push_str("</tr>\n");
    for row in rows {
        out.push_str("<tr>");
        for field in fields {
            out.push_str("<td>");
            out.push_str(&escape_html(&cell(row, field)));
            out.push_str("</td>");
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</table>\n</body>\n</html>\n");
    out
}
