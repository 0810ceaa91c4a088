use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Print a success message, merging `data` into the JSON object when present
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(object)) = (data, response.as_object_mut()) {
                object.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Print a bare value: the raw string in text mode, `{key: value}` in JSON mode
pub fn output_value(output_format: OutputFormat, key: &str, value: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = serde_json::Map::new();
            response.insert(key.to_string(), Value::String(value.to_string()));
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => println!("{}", value),
    }
    Ok(())
}
