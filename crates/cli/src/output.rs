//! Terminal output helpers

use colored::Colorize;
use std::io::Write;

/// Print an error message to stderr
pub fn print_error(message: &str) {
    eprintln!("{} {}", "Error:".red().bold(), message);
}

/// Write a finished command's output to stdout in one go
pub fn write_stdout(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(bytes)?;
    stdout.flush()
}

/// Render rows as two aligned columns, indented by two spaces
pub fn two_columns(rows: &[(String, String)]) -> String {
    let width = rows.iter().map(|(left, _)| left.len()).max().unwrap_or(0);
    rows.iter()
        .map(|(left, right)| format!("  {:<width$}  {}\n", left, right, width = width))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_columns_aligns_on_longest() {
        let rows = vec![
            ("inspect ID".to_string(), "Show".to_string()),
            ("help".to_string(), "List".to_string()),
        ];
        assert_eq!(two_columns(&rows), "  inspect ID  Show\n  help        List\n");
    }

    #[test]
    fn test_two_columns_empty() {
        assert_eq!(two_columns(&[]), "");
    }
}
