//! CLI command implementations.

pub mod mock;
pub mod run;
pub mod show;

use std::error::Error;

/// Render rows as left-aligned columns separated by two spaces.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render = |cells: &[&str]| {
        let line = cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        line.trim_end().to_string()
    };

    let dashes: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let dashes: Vec<&str> = dashes.iter().map(String::as_str).collect();

    let mut lines = vec![render(headers), render(&dashes)];
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        lines.push(render(&cells));
    }
    lines.join("\n")
}

/// An error followed by its sources, `outer: inner: root`.
pub fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_table_aligns_columns() {
        let rows = vec![
            vec!["health".to_string(), "GET".to_string()],
            vec!["create-user".to_string(), "POST".to_string()],
        ];
        let rendered = table(&["Name", "Method"], &rows);
        assert_eq!(
            rendered,
            "Name         Method\n-----------  ------\nhealth       GET\ncreate-user  POST"
        );
    }

    #[rstest]
    fn test_table_without_rows() {
        assert_eq!(table(&["A", "B"], &[]), "A  B\n-  -");
    }

    #[rstest]
    fn test_error_chain() {
        let inner = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let outer = postline_core::config::ConfigError::Io {
            path: "a.yaml".into(),
            source: inner,
        };
        let rendered = error_chain(&outer);
        assert!(rendered.ends_with(": disk on fire"), "{rendered}");
    }
}
