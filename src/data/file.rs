//! Row loading from disk.
//!
//! Accepts a JSON array of row objects, or JSON Lines with one object per
//! line. Blank lines in JSON Lines input are skipped.

use crate::model::error::InputError;
use crate::model::ColumnConfig;
use serde_json::Value;
use std::path::Path;
use tracing::info;

/// Read every row from `path`.
///
/// # Errors
///
/// Returns `InputError::NotFound` if the file does not exist,
/// `InputError::Io` for read failures and `InputError::InvalidRows` when
/// the content is neither shape or contains non-object rows.
pub fn load_rows(path: impl AsRef<Path>) -> Result<Vec<Value>, InputError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(InputError::NotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let invalid = |reason: String| InputError::InvalidRows {
        path: path.to_path_buf(),
        reason,
    };

    let rows = parse_rows(&content).map_err(invalid)?;
    info!(path = %path.display(), rows = rows.len(), "Rows loaded");
    Ok(rows)
}

/// Parse rows from text in either accepted shape.
pub fn parse_rows(content: &str) -> Result<Vec<Value>, String> {
    let trimmed = content.trim_start();
    let rows = if trimmed.starts_with('[') {
        serde_json::from_str::<Vec<Value>>(trimmed).map_err(|e| e.to_string())?
    } else {
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| {
                serde_json::from_str::<Value>(line).map_err(|e| format!("line {}: {e}", n + 1))
            })
            .collect::<Result<Vec<_>, _>>()?
    };
    if let Some(pos) = rows.iter().position(|row| !row.is_object()) {
        return Err(format!("row {pos} is not an object"));
    }
    Ok(rows)
}

/// One column per top-level key, in first-seen order across `rows`.
///
/// Keys listed in `skip` (such as a nested children field) get no column.
pub fn infer_columns(rows: &[Value], skip: &[&str]) -> Vec<ColumnConfig> {
    let mut fields: Vec<&str> = Vec::new();
    for object in rows.iter().filter_map(Value::as_object) {
        for key in object.keys() {
            if !skip.contains(&key.as_str()) && !fields.contains(&key.as_str()) {
                fields.push(key);
            }
        }
    }
    fields.into_iter().map(ColumnConfig::new).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn infers_columns_from_every_row() {
        let rows = vec![
            json!({"id": 1, "name": "a", "children": []}),
            json!({"id": 2, "team": "ops"}),
        ];
        let fields: Vec<String> = infer_columns(&rows, &["children"])
            .into_iter()
            .map(|c| c.field)
            .collect();
        assert_eq!(fields, ["id", "name", "team"]);
    }

    #[test]
    fn parses_json_array() {
        let rows = parse_rows(r#"[{"id": 1}, {"id": 2}]"#);
        assert_eq!(rows.map(|r| r.len()), Ok(2));
    }

    #[test]
    fn parses_json_lines_skipping_blanks() {
        let rows = parse_rows("{\"id\": 1}\n\n{\"id\": 2}\n");
        assert_eq!(rows.map(|r| r.len()), Ok(2));
    }

    #[test]
    fn reports_bad_line_number() {
        let err = parse_rows("{\"id\": 1}\nnot json\n").err().unwrap_or_default();
        assert!(err.starts_with("line 2:"), "{err}");
    }

    #[test]
    fn rejects_scalar_rows() {
        assert_eq!(
            parse_rows("[1, 2]").err().as_deref(),
            Some("row 0 is not an object")
        );
    }

    #[test]
    fn missing_file_is_not_found() {
        let result = load_rows("/definitely/not/here.json");
        assert!(matches!(result, Err(InputError::NotFound(_))));
    }

    #[test]
    fn loads_from_disk() {
        let path = std::env::temp_dir().join(format!("panegrid-rows-{}.json", std::process::id()));
        let written = std::fs::File::create(&path)
            .and_then(|mut f| f.write_all(br#"[{"id": "a"}, {"id": "b"}, {"id": "c"}]"#));
        assert!(written.is_ok());

        let rows = load_rows(&path);
        let _ = std::fs::remove_file(&path);
        assert_eq!(rows.map(|r| r.len()).ok(), Some(3));
    }
}
