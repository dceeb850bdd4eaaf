// crates/harvest-cli/src/output.rs
//
// Output formatting utilities for the Harvest CLI.
// Supports table and JSON output modes.

use serde::Serialize;
use tabled::{Table, Tabled};

use harvest_core::events::EventRecord;
use harvest_runtime::Receipt;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed table output (default).
    Table,
    /// JSON output for machine consumption.
    Json,
}

/// Format a slice of Tabled items as a table string.
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).to_string()
}

/// Format a serializable value as a pretty-printed JSON string.
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}

/// One row per committed event.
#[derive(Tabled)]
pub struct EventRow {
    #[tabled(rename = "Height")]
    pub height: u64,
    #[tabled(rename = "#")]
    pub index: u32,
    #[tabled(rename = "Event")]
    pub event: String,
    #[tabled(rename = "Details")]
    pub details: String,
}

impl From<&EventRecord> for EventRow {
    fn from(record: &EventRecord) -> Self {
        // The `kind` tag is already in the Event column.
        let details = match serde_json::to_value(&record.event) {
            Ok(serde_json::Value::Object(mut fields)) => {
                fields.remove("kind");
                fields
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect::<Vec<_>>()
                    .join(" ")
            }
            _ => String::new(),
        };
        Self {
            height: record.height,
            index: record.index,
            event: record.event.name().to_string(),
            details,
        }
    }
}

pub fn print_events(events: &[EventRecord], format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", format_json(&events)),
        OutputFormat::Table => {
            if events.is_empty() {
                println!("No events.");
            } else {
                let rows: Vec<EventRow> = events.iter().map(EventRow::from).collect();
                println!("{}", format_table(&rows));
            }
        }
    }
}

/// Print the outcome of a submitted transaction.
pub fn print_receipt(receipt: &Receipt, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", format_json(receipt)),
        OutputFormat::Table => {
            println!(
                "Committed `{}` at height {} (tx {})",
                receipt.call, receipt.height, receipt.tx_id
            );
            print_events(&receipt.events, format);
        }
    }
}

/// Print a value as JSON, or as a two-column field table.
pub fn print_fields<T: Serialize>(value: &T, format: OutputFormat) {
    #[derive(Tabled)]
    struct FieldRow {
        #[tabled(rename = "Field")]
        field: String,
        #[tabled(rename = "Value")]
        value: String,
    }

    if format == OutputFormat::Json {
        println!("{}", format_json(value));
        return;
    }
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Object(fields)) => {
            let rows: Vec<FieldRow> = fields
                .into_iter()
                .map(|(field, value)| FieldRow {
                    field,
                    value: match value {
                        serde_json::Value::String(s) => s,
                        serde_json::Value::Null => "-".to_string(),
                        other => other.to_string(),
                    },
                })
                .collect();
            println!("{}", format_table(&rows));
        }
        _ => println!("{}", format_json(value)),
    }
}
