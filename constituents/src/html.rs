//! Minimal HTML table extraction (no DOM, regex over the raw markup).

use regex::Regex;

use crate::Error;

/// Returns the text of every body cell in `column` of the first `<table>`
/// found in `html`.
///
/// The header row is the first row containing `<th>` cells. Cell text has
/// tags stripped, entities decoded and surrounding whitespace trimmed; blank
/// cells and rows too short to reach the column are skipped.
pub fn first_table_column(html: &str, column: &str) -> Result<Vec<String>, Error> {
    let table_re = compile(r"(?is)<table\b[^>]*>(.*?)</table>")?;
    let row_re = compile(r"(?is)<tr\b[^>]*>(.*?)</tr>")?;
    let cell_re = compile(r"(?is)<(th|td)\b[^>]*>(.*?)</t[hd]>")?;
    let tag_re = compile(r"(?s)<[^>]*>")?;

    let table = table_re
        .captures(html)
        .and_then(|c| c.get(1))
        .ok_or(Error::MissingTable)?
        .as_str();

    let mut column_idx: Option<usize> = None;
    let mut values = Vec::new();

    for row in row_re.captures_iter(table) {
        let Some(row_body) = row.get(1) else {
            continue;
        };
        let cells: Vec<(bool, String)> = cell_re
            .captures_iter(row_body.as_str())
            .map(|c| {
                let is_header = c.get(1).is_some_and(|m| m.as_str().eq_ignore_ascii_case("th"));
                let raw = c.get(2).map(|m| m.as_str()).unwrap_or("");
                (is_header, cell_text(&tag_re, raw))
            })
            .collect();

        if cells.is_empty() {
            continue;
        }

        match column_idx {
            None => {
                if cells.iter().any(|(is_header, _)| *is_header) {
                    column_idx = Some(
                        cells
                            .iter()
                            .position(|(_, text)| text == column)
                            .ok_or_else(|| Error::MissingColumn(column.to_string()))?,
                    );
                }
            }
            Some(idx) => {
                if cells.iter().all(|(is_header, _)| *is_header) {
                    continue;
                }
                if let Some((_, text)) = cells.get(idx) {
                    if !text.is_empty() {
                        values.push(text.clone());
                    }
                }
            }
        }
    }

    if column_idx.is_none() {
        return Err(Error::MissingColumn(column.to_string()));
    }

    Ok(values)
}

fn compile(pattern: &str) -> Result<Regex, Error> {
    Regex::new(pattern).map_err(|e| Error::Parse(format!("regex compile failed: {}", e)))
}

fn cell_text(tag_re: &Regex, raw: &str) -> String {
    let stripped = tag_re.replace_all(raw, "");
    decode_entities(&stripped).trim().to_string()
}

fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&#160;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}
