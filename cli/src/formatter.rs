//! Output formatters for CMS records
//!
//! Renders records and pages as bordered tables or pretty JSON.

use clap::ValueEnum;
use colored::Colorize;
use medisite_link::{Paginated, User};
use serde::Serialize;
use serde_json::{json, Value as JsonValue};

use crate::error::{CLIError, Result};

/// Maximum column width before truncation
const MAX_COLUMN_WIDTH: usize = 32;

/// Minimum column width when resizing to fit the terminal
const MIN_COLUMN_WIDTH: usize = 6;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = CLIError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            other => Err(CLIError::ConfigurationError(format!(
                "Unknown output format '{}' (expected table|json)",
                other
            ))),
        }
    }
}

/// Formats command results for display
#[derive(Debug, Clone)]
pub struct OutputFormatter {
    format: OutputFormat,
    color: bool,
}

impl OutputFormatter {
    /// Create a new formatter
    pub fn new(format: OutputFormat, color: bool) -> Self {
        Self { format, color }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Terminal width from `COLUMNS`, defaulting to 100
    fn get_terminal_width() -> usize {
        std::env::var("COLUMNS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|w| *w > 0)
            .unwrap_or(100)
    }

    /// Truncate a string to max width with ellipsis
    fn truncate_value(value: &str, max_width: usize) -> String {
        if value.chars().count() <= max_width {
            value.to_string()
        } else if max_width <= 3 {
            value.chars().take(max_width).collect()
        } else {
            let take = max_width - 3;
            format!("{}...", value.chars().take(take).collect::<String>())
        }
    }

    /// Format JSON value for table display
    fn format_json_value(value: &JsonValue) -> String {
        match value {
            JsonValue::Null => "-".to_string(),
            JsonValue::Bool(b) => b.to_string(),
            JsonValue::Number(n) => n.to_string(),
            JsonValue::String(s) => s.replace(['\n', '\r'], " "),
            JsonValue::Array(_) | JsonValue::Object(_) => value.to_string(),
        }
    }

    fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
        serde_json::to_string_pretty(value)
            .map_err(|e| CLIError::ParseError(format!("Cannot render JSON: {}", e)))
    }

    /// Format one page of records, showing `columns` in table mode.
    pub fn format_page(&self, page: &Paginated<JsonValue>, columns: &[&str]) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Self::to_json(&json!({
                "data": page.items,
                "pagination": page.pagination,
            }));
        }

        let p = &page.pagination;
        let footer = format!(
            "Page {} of {} ({} total)",
            p.current_page,
            p.total_page.max(1),
            p.total_count
        );
        if page.is_empty() {
            return Ok(format!("No records\n{}", footer));
        }

        let rows: Vec<Vec<String>> = page
            .items
            .iter()
            .map(|item| {
                columns
                    .iter()
                    .map(|col| item.get(*col).map_or("-".to_string(), Self::format_json_value))
                    .collect()
            })
            .collect();

        let mut output = self.render_table(columns, &rows);
        output.push_str(&footer);
        if let Some(next) = p.next_page {
            output.push_str(&format!(", next: --page {}", next));
        }
        Ok(output)
    }

    /// Format a single record as a field/value listing.
    pub fn format_record(&self, record: &JsonValue) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Self::to_json(record);
        }

        let JsonValue::Object(fields) = record else {
            return Ok(Self::format_json_value(record));
        };
        let width = fields.keys().map(|k| k.len()).max().unwrap_or(0);
        let mut output = String::new();
        for (key, value) in fields {
            let label = format!("{:width$}", key, width = width);
            let label = if self.color {
                label.bold().to_string()
            } else {
                label
            };
            output.push_str(&format!("{}  {}\n", label, Self::format_json_value(value)));
        }
        Ok(output.trim_end().to_string())
    }

    /// Format a record that may legitimately be absent.
    pub fn format_optional(&self, record: Option<&JsonValue>, missing: &str) -> Result<String> {
        match record {
            Some(record) => self.format_record(record),
            None if self.format == OutputFormat::Json => Ok("null".to_string()),
            None => Ok(missing.to_string()),
        }
    }

    pub fn format_user(&self, user: &User) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Self::to_json(user);
        }
        let role = user.privilege().unwrap_or("none");
        let mut output = format!("{} <{}>\nrole: {}", user.name, user.email, role);
        if user.is_suspended {
            output.push_str("\nsuspended");
            if let Some(reason) = &user.suspension_reason {
                output.push_str(&format!(": {}", reason));
            }
        }
        Ok(output)
    }

    /// One-line confirmation of a completed action.
    pub fn success(&self, message: &str) -> String {
        if self.format == OutputFormat::Json {
            return json!({ "success": true, "message": message }).to_string();
        }
        if self.color {
            format!("{} {}", "✓".green().bold(), message)
        } else {
            message.to_string()
        }
    }

    pub fn error(&self, message: &str) -> String {
        if self.color {
            format!("{} {}", "error:".red().bold(), message)
        } else {
            format!("error: {}", message)
        }
    }

    fn fit_widths(&self, columns: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
        let mut col_widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
        for row in rows {
            for (i, value) in row.iter().enumerate() {
                col_widths[i] = col_widths[i].max(value.chars().count());
            }
        }

        let column_count = col_widths.len();
        let border_padding = column_count * 3 + 1;
        let available = Self::get_terminal_width()
            .saturating_sub(border_padding)
            .max(column_count);

        let mut total_width: usize = col_widths.iter().sum();
        if total_width > available {
            for width in col_widths.iter_mut() {
                *width = (*width).min(MAX_COLUMN_WIDTH);
            }
            total_width = col_widths.iter().sum();

            while total_width > available {
                let widest = col_widths
                    .iter()
                    .enumerate()
                    .filter(|(_, width)| **width > MIN_COLUMN_WIDTH)
                    .max_by_key(|(_, width)| **width)
                    .map(|(idx, _)| idx);
                match widest {
                    Some(idx) => col_widths[idx] -= 1,
                    None => break,
                }
                total_width -= 1;
            }
        }
        col_widths
    }

    fn render_table(&self, columns: &[&str], rows: &[Vec<String>]) -> String {
        let col_widths = self.fit_widths(columns, rows);
        let border = |left: char, mid: char, right: char| {
            let mut line = String::new();
            line.push(left);
            for (idx, width) in col_widths.iter().enumerate() {
                line.push_str(&"─".repeat(width + 2));
                line.push(if idx == col_widths.len() - 1 { right } else { mid });
            }
            line.push('\n');
            line
        };
        let row_line = |values: &mut dyn Iterator<Item = String>, header: bool| {
            let mut line = String::from("│");
            for (value, width) in values.zip(col_widths.iter()) {
                let cell = format!("{:width$}", Self::truncate_value(&value, *width), width = *width);
                let cell = if header && self.color {
                    cell.bold().to_string()
                } else {
                    cell
                };
                line.push_str(&format!(" {} │", cell));
            }
            line.push('\n');
            line
        };

        let mut output = border('┌', '┬', '┐');
        output.push_str(&row_line(&mut columns.iter().map(|c| c.to_string()), true));
        output.push_str(&border('├', '┼', '┤'));
        for row in rows {
            output.push_str(&row_line(&mut row.iter().cloned(), false));
        }
        output.push_str(&border('└', '┴', '┘'));

        let row_label = if rows.len() == 1 { "row" } else { "rows" };
        output.push_str(&format!("({} {})\n", rows.len(), row_label));
        output
    }
}
