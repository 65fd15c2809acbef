pub mod csv;
pub mod table;

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Rounds for display; keeps `-0.00` out of tables.
pub fn fixed(value: f64, precision: usize) -> String {
    let rendered = format!("{value:.precision$}");
    if rendered.starts_with('-') && rendered[1..].chars().all(|c| c == '0' || c == '.') {
        rendered[1..].to_string()
    } else {
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::fixed;

    #[test]
    fn fixed_drops_negative_zero() {
        assert_eq!(fixed(-0.0001, 2), "0.00");
        assert_eq!(fixed(-1.5, 1), "-1.5");
        assert_eq!(fixed(1_500.0, 2), "1500.00");
    }
}
