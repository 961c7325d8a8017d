pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Row-shaped records inside a result: sweep `results`, portfolio
/// `scenarios`, or the elements of a top-level array.
pub fn record_rows(result: &Value) -> Option<Vec<&Value>> {
    match result {
        Value::Object(map) => ["results", "scenarios"]
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_array))
            .map(|arr| arr.iter().collect()),
        Value::Array(arr) => Some(
            arr.iter()
                .flat_map(|item| record_rows(item).unwrap_or_else(|| vec![item]))
                .collect(),
        ),
        _ => None,
    }
}

/// Render a scalar JSON value for a table cell or CSV field.
pub fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => arr.iter().map(format_scalar).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_rows_from_sweep_report() {
        let v = json!({"results": [{"a": 1}, {"a": 2}], "summaries": []});
        assert_eq!(record_rows(&v).unwrap().len(), 2);
    }

    #[test]
    fn test_record_rows_flattens_portfolio_reports() {
        let v = json!([
            {"scenarios": [{"a": 1}], "skipped": []},
            {"scenarios": [{"a": 2}, {"a": 3}], "skipped": []}
        ]);
        assert_eq!(record_rows(&v).unwrap().len(), 3);
    }

    #[test]
    fn test_record_rows_plain_array_and_object() {
        assert_eq!(record_rows(&json!([{"x": 1}, {"x": 2}])).unwrap().len(), 2);
        assert!(record_rows(&json!({"runoff_m3": "45"})).is_none());
    }

    #[test]
    fn test_format_scalar() {
        assert_eq!(format_scalar(&json!("36.0")), "36.0");
        assert_eq!(format_scalar(&json!(null)), "");
        assert_eq!(format_scalar(&json!(["a", "b"])), "a, b");
    }
}
