//! Layout text for already-structured formats.
//!
//! These never fail on malformed content: when a parser rejects the input
//! the raw text doubles as the layout text.

use csv::ReaderBuilder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

/// Rows sampled when sizing delimited columns.
const WIDTH_SAMPLE_ROWS: usize = 100;

/// Candidate delimiters, in tie-break order.
const DELIMITERS: [u8; 4] = [b',', b'\t', b';', b'|'];

/// Heading placed between an XML document and its outline.
pub const XML_OUTLINE_HEADING: &str = "--- Extracted Text Content ---";

/// Estimate a page count from line count.
pub fn estimate_pages(text: &str, lines_per_page: usize) -> u32 {
    let lines = text.split('\n').count();
    let per_page = lines_per_page.max(1);
    lines.div_ceil(per_page).max(1) as u32
}

/// Pick the most frequent delimiter on the first line; `.tsv` always uses tabs.
pub fn detect_delimiter(first_line: &str, is_tsv: bool) -> u8 {
    if is_tsv {
        return b'\t';
    }
    let mut best = DELIMITERS[0];
    let mut best_count = 0;
    for delimiter in DELIMITERS {
        let count = first_line.bytes().filter(|b| *b == delimiter).count();
        if count > best_count {
            best = delimiter;
            best_count = count;
        }
    }
    best
}

/// Render delimited text as a padded table.
pub fn delimited_layout(raw: &str, is_tsv: bool) -> String {
    let first_line = raw.lines().next().unwrap_or("");
    let delimiter = detect_delimiter(first_line, is_tsv);

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(raw.as_bytes());

    let rows: Vec<Vec<String>> = reader
        .records()
        .filter_map(|r| r.ok())
        .map(|record| record.iter().map(|s| s.to_string()).collect())
        .collect();

    let column_count = rows.first().map(|r| r.len()).unwrap_or(0);
    let mut widths = vec![0usize; column_count];
    for row in rows.iter().take(WIDTH_SAMPLE_ROWS) {
        for (i, cell) in row.iter().take(column_count).enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in &rows {
        let mut line = String::new();
        for (i, cell) in row.iter().take(column_count).enumerate() {
            line.push_str(&format!("{:<width$}", cell, width = widths[i] + 2));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    debug!("Delimited layout: {} rows, {} columns", rows.len(), column_count);
    out
}

/// Pretty-print JSON, or each record of a JSON Lines file.
pub fn json_layout(raw: &str, json_lines: bool) -> String {
    if json_lines {
        return raw
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| pretty_json(line).unwrap_or_else(|| line.to_string()))
            .collect::<Vec<_>>()
            .join("\n\n");
    }
    pretty_json(raw).unwrap_or_else(|| raw.to_string())
}

fn pretty_json(text: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    serde_json::to_string_pretty(&value).ok()
}

/// Append an indented outline of elements, attributes, and text to the XML.
pub fn xml_layout(raw: &str) -> String {
    match xml_outline(raw) {
        Some(outline) if !outline.is_empty() => {
            format!("{}\n\n{}\n{}", raw, XML_OUTLINE_HEADING, outline)
        }
        _ => raw.to_string(),
    }
}

fn xml_outline(raw: &str) -> Option<String> {
    let mut reader = Reader::from_str(raw);
    reader.config_mut().trim_text(true);

    let mut out = String::new();
    let mut depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                push_element(&mut out, &e, depth);
                depth += 1;
            }
            Ok(Event::Empty(e)) => push_element(&mut out, &e, depth),
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Text(t)) => {
                let text = t.unescape().ok()?;
                let text = text.trim();
                if !text.is_empty() {
                    push_line(&mut out, depth, text);
                }
            }
            Ok(Event::CData(c)) => {
                let text = String::from_utf8_lossy(c.as_ref()).trim().to_string();
                if !text.is_empty() {
                    push_line(&mut out, depth, &text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                debug!("XML outline abandoned: {}", e);
                return None;
            }
            _ => {}
        }
    }

    Some(out)
}

fn push_element(out: &mut String, element: &BytesStart<'_>, depth: usize) {
    let name = String::from_utf8_lossy(element.local_name().as_ref()).to_string();
    push_line(out, depth, &format!("{}:", name));
    for attr in element.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map(|v| v.to_string())
            .unwrap_or_default();
        push_line(out, depth + 1, &format!("@{}: {}", key, value));
    }
}

fn push_line(out: &mut String, depth: usize, text: &str) {
    out.push_str(&" ".repeat(depth * 2));
    out.push_str(text);
    out.push('\n');
}
