use serde_json::Value;

use super::{result_of, scalar_text};

/// Print just the headline answer.
///
/// Looks for the comparison's key fields in priority order, then falls back
/// to the first field of the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = result_of(value);

    let priority_keys = [
        "dist-difference",
        "display",
        "recomputes",
    ];

    if let Value::Object(map) = result_obj {
        if let Some(Value::String(channel)) = map.get("preferred_channel") {
            let difference = map.get("difference").map(scalar_text).unwrap_or_default();
            println!("{} ({})", channel, difference);
            return;
        }

        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", scalar_text(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, scalar_text(val));
            return;
        }
    }

    println!("{}", scalar_text(result_obj));
}
