//! Aligned plain-text tables.

use console::measure_text_width;

/// Column-aligned rows with a header, separated by two spaces.
///
/// Widths are measured on visible text, so styled cells line up.
#[derive(Debug)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| measure_text_width(h)).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate().take(widths.len()) {
                widths[i] = widths[i].max(measure_text_width(cell));
            }
        }
        widths
    }

    /// Render as lines; the last column is never padded.
    pub fn render(&self) -> Vec<String> {
        let widths = self.column_widths();
        std::iter::once(&self.headers)
            .chain(&self.rows)
            .map(|row| render_row(row, &widths))
            .collect()
    }
}

fn render_row(row: &[String], widths: &[usize]) -> String {
    let mut line = String::new();
    for (i, width) in widths.iter().enumerate() {
        let cell = row.get(i).map(String::as_str).unwrap_or("");
        line.push_str(cell);
        if i + 1 < widths.len() {
            let pad = width.saturating_sub(measure_text_width(cell)) + 2;
            line.push_str(&" ".repeat(pad));
        }
    }
    line.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_align_to_widest_cell() {
        let mut table = Table::new(&["NAME", "VERSION"]);
        table.add_row(vec!["ios-base".into(), "1.0.0".into()]);
        table.add_row(vec!["a".into(), "10.2.0".into()]);

        assert_eq!(
            table.render(),
            vec![
                "NAME      VERSION",
                "ios-base  1.0.0",
                "a         10.2.0",
            ]
        );
    }

    #[test]
    fn styled_cells_measure_visible_width() {
        let mut table = Table::new(&["A", "B"]);
        table.add_row(vec!["\u{1b}[36mxy\u{1b}[0m".into(), "z".into()]);
        let lines = table.render();
        assert!(lines[1].ends_with("\u{1b}[0m  z"));
    }

    #[test]
    fn missing_cells_render_empty() {
        let mut table = Table::new(&["A", "B", "C"]);
        table.add_row(vec!["only".into()]);
        assert_eq!(table.render()[1], "only");
        assert_eq!(table.row_count(), 1);
        assert!(!table.is_empty());
    }
}
