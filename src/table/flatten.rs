use serde_json::Value;
use std::collections::HashMap;

/// A rectangular view of the decoded report.  Every row has a cell for
/// every column; cells absent from the source record are JSON null.
#[derive(Debug, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Flatten the decoded document into a table, one row per record.  A
/// top-level array yields one row per element, anything else a single
/// row.  Nested objects contribute dot-joined column names.  Array-valued
/// fields stay a single cell; they are never exploded into extra rows.
pub fn normalize(doc: &Value) -> Table {
    let records: Vec<&Value> = match doc {
        Value::Array(xs) => xs.iter().collect(),
        other => vec![other],
    };

    let mut columns: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut flat: Vec<Vec<(String, Value)>> = Vec::with_capacity(records.len());
    for record in records {
        let mut cells: Vec<(String, Value)> = Vec::new();
        flatten_record(record, "", &mut cells);
        for (key, _) in &cells {
            if !index.contains_key(key) {
                index.insert(key.clone(), columns.len());
                columns.push(key.clone());
            }
        }
        flat.push(cells);
    }

    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(flat.len());
    for cells in flat {
        let mut row = vec![Value::Null; columns.len()];
        for (key, value) in cells {
            row[index[&key]] = value;
        }
        rows.push(row);
    }

    Table { columns, rows }
}

fn flatten_record(value: &Value, prefix: &str, out: &mut Vec<(String, Value)>) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                let key = if prefix.is_empty() {
                    k.clone()
                } else {
                    format!("{}.{}", prefix, k)
                };
                match v {
                    Value::Object(_) => flatten_record(v, &key, out),
                    _ => out.push((key, v.clone())),
                }
            }
        }
        other => {
            // a scalar record collapses into a single "value" column
            let key = if prefix.is_empty() { "value" } else { prefix };
            out.push((key.to_string(), other.clone()));
        }
    }
}
