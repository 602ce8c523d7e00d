//! Terminal output for the fieldsync CLI
//!
//! Every subcommand renders through [`OutputFormatter`], so the same code
//! path serves both human-readable terminals and `--json` consumers. The
//! formatter knows how to lay out a data point result set; commands hand it
//! records, not pre-formatted strings.

use fieldsync_core::domain::DataPoint;

/// Output format selector, chosen once from the global `--json` flag
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }

    pub fn is_json(self) -> bool {
        matches!(self, OutputFormat::Json)
    }

    /// Builds the formatter for this format
    pub fn formatter(self) -> Box<dyn OutputFormatter> {
        match self {
            OutputFormat::Human => Box::new(HumanFormatter),
            OutputFormat::Json => Box::new(JsonFormatter),
        }
    }
}

/// Rendering seam between commands and the terminal
pub trait OutputFormatter: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn warn(&self, message: &str);
    /// Incidental progress line; dropped by the JSON formatter
    fn note(&self, message: &str);
    /// Aligned label/value line for detail views
    fn field(&self, label: &str, value: &str);
    /// Renders a query result set: a table for humans, rows for `--json`
    fn data_points(&self, records: &[DataPoint]);
    /// Structured payload; the human formatter ignores it (its commands
    /// print fields instead)
    fn json(&self, value: &serde_json::Value);
}

// ============================================================================
// Human formatter
// ============================================================================

pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn success(&self, message: &str) {
        println!("\u{2713} {}", message);
    }

    fn error(&self, message: &str) {
        eprintln!("\u{2717} Error: {}", message);
    }

    fn warn(&self, message: &str) {
        eprintln!("\u{26a0} Warning: {}", message);
    }

    fn note(&self, message: &str) {
        println!("  {}", message);
    }

    fn field(&self, label: &str, value: &str) {
        println!("  {:<14} {}", format!("{label}:"), value);
    }

    fn data_points(&self, records: &[DataPoint]) {
        if records.is_empty() {
            self.note("No data points. Run 'fieldsync sync' first.");
            return;
        }

        self.note(&format!(
            "{:<12} {:<30} {:>6}  {}",
            "ID", "Name", "Status", "Modified"
        ));
        for dp in records {
            let position = match &dp.coordinates {
                Some(c) => format!("  ({:.5}, {:.5})", c.latitude, c.longitude),
                None => String::new(),
            };
            self.note(&format!(
                "{:<12} {:<30} {:>6}  {}{}",
                dp.id.as_str(),
                dp.name,
                dp.status,
                format_millis(dp.last_modified),
                position
            ));
        }
        self.success(&format!("{} data point(s)", records.len()));
    }

    fn json(&self, _value: &serde_json::Value) {}
}

// ============================================================================
// JSON formatter
// ============================================================================

pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn success(&self, message: &str) {
        println!(
            "{}",
            serde_json::json!({"success": true, "message": message})
        );
    }

    fn error(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"success": false, "error": message})
        );
    }

    fn warn(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"level": "warning", "message": message})
        );
    }

    fn note(&self, _message: &str) {}

    fn field(&self, _label: &str, _value: &str) {}

    fn data_points(&self, records: &[DataPoint]) {
        let rows: Vec<serde_json::Value> = records.iter().map(data_point_row).collect();
        self.json(&serde_json::json!({
            "count": records.len(),
            "data_points": rows,
        }));
    }

    fn json(&self, value: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string_pretty(value).unwrap_or_default()
        );
    }
}

fn data_point_row(dp: &DataPoint) -> serde_json::Value {
    serde_json::json!({
        "id": dp.id.as_str(),
        "name": dp.name,
        "status": dp.status,
        "last_modified": dp.last_modified,
        "latitude": dp.coordinates.as_ref().map(|c| c.latitude),
        "longitude": dp.coordinates.as_ref().map(|c| c.longitude),
    })
}

/// Formats an epoch-milliseconds timestamp for display
pub fn format_millis(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| format!("{millis} ms"))
}
