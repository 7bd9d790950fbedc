use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{flatten_rows, result_of};

/// Format output as a Field/Value table using the tabled crate.
pub fn print_table(value: &Value) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (field, text) in flatten_rows(result_of(value)) {
        builder.push_record([field, text]);
    }
    println!("{}", Table::from(builder));

    if let Some(Value::Number(seq)) = value.get("sequence") {
        println!("Recompute #{}", seq);
    }

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = value.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}
