use serde_json::Value;
use std::io;

use super::{flatten_rows, result_of};

/// Write the result as two-column `field,value` CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let _ = wtr.write_record(["field", "value"]);
    for (field, text) in flatten_rows(result_of(value)) {
        let _ = wtr.write_record([field.as_str(), text.as_str()]);
    }
    if let Some(Value::Array(warnings)) = value.get("warnings") {
        for w in warnings.iter().filter_map(Value::as_str) {
            let _ = wtr.write_record(["warning", w]);
        }
    }

    let _ = wtr.flush();
}
