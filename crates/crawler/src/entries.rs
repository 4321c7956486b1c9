// ABOUTME: Entry record and the parser turning raw endpoint payloads into substitution-plan rows.
// ABOUTME: Accepts JSON arrays or HTML tables; parse what you can, drop what you can't, never panic.

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One normalized substitution-plan row.
///
/// All six fields are always present; an attribute the source row fails to
/// provide becomes an empty string, never a partially constructed record.
/// `date` keeps the source format (`DD.MM.YYYY`); sorting and grouping are
/// the display layer's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Entry {
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub class: String,
    pub lesson: String,
    pub subject: String,
    pub old_teacher: String,
}

/// Column order of the portal's plan table: Datum, Art, Klasse, Stunde,
/// Fach, Lehrer.
const JSON_KEYS: [&str; 6] = ["date", "type", "class", "lesson", "subject", "old_teacher"];

/// Parse a raw data-endpoint payload into plan entries.
///
/// The payload is either a JSON document (array of row objects, possibly
/// wrapped in an `entries`/`data` key) or an HTML fragment with a repeating
/// table-row structure, depending on which endpoint variant the session
/// resolved to. Source order is preserved. Malformed or unexpected payloads
/// yield an empty vec; an empty result is not distinguishable from a
/// legitimately empty plan here, so callers must check earlier steps for
/// failures. The upstream markup changes without notice, which is why this
/// never errors.
pub fn parse_entries(payload: &str) -> Vec<Entry> {
    let trimmed = payload.trim_start();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
            return parse_json_entries(&value);
        }
    }
    parse_html_entries(payload)
}

/// Coerce a JSON value to the string form an Entry field expects.
fn field_string(row: &Value, key: &str) -> String {
    match row.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn parse_json_entries(value: &Value) -> Vec<Entry> {
    let rows = match value {
        Value::Array(rows) => rows.as_slice(),
        Value::Object(map) => match map.get("entries").or_else(|| map.get("data")) {
            Some(Value::Array(rows)) => rows.as_slice(),
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    rows.iter()
        .filter(|row| row.is_object())
        .map(|row| Entry {
            date: field_string(row, JSON_KEYS[0]),
            kind: field_string(row, JSON_KEYS[1]),
            class: field_string(row, JSON_KEYS[2]),
            lesson: field_string(row, JSON_KEYS[3]),
            subject: field_string(row, JSON_KEYS[4]),
            old_teacher: field_string(row, JSON_KEYS[5]),
        })
        .collect()
}

fn parse_html_entries(html: &str) -> Vec<Entry> {
    let doc = Html::parse_document(html);
    let Ok(row_sel) = Selector::parse("tr") else {
        return Vec::new();
    };
    let Ok(cell_sel) = Selector::parse("td") else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    for row in doc.select(&row_sel) {
        let cells: Vec<String> = row
            .select(&cell_sel)
            .map(|cell| {
                cell.text()
                    .collect::<String>()
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();
        // Header rows use <th> and yield no cells; anything else with at
        // least one <td> is taken as a plan row, padded out to six fields.
        if cells.is_empty() {
            continue;
        }
        let cell = |i: usize| cells.get(i).cloned().unwrap_or_default();
        entries.push(Entry {
            date: cell(0),
            kind: cell(1),
            class: cell(2),
            lesson: cell(3),
            subject: cell(4),
            old_teacher: cell(5),
        });
    }
    entries
}
