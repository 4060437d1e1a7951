use chrono::{NaiveDateTime, Timelike};

/// A single spreadsheet cell after type detection.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
    Missing,
}

impl CellValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    /// Display form used for previews, hierarchy keys and node labels.
    /// Two cells group together exactly when their display forms are equal.
    pub fn display(&self) -> String {
        match self {
            CellValue::Text(v) => v.clone(),
            CellValue::Number(v) => format_f64(*v),
            CellValue::Date(v) => {
                if v.time().num_seconds_from_midnight() == 0 {
                    v.format("%Y-%m-%d").to_string()
                } else {
                    v.format("%Y-%m-%d %H:%M:%S").to_string()
                }
            }
            CellValue::Missing => String::new(),
        }
    }
}

/// In-memory raw table: named columns over rectangular rows.
///
/// Rebuilt from scratch on every upload; rows are padded with
/// [`CellValue::Missing`] up to the header width, so indexing by a
/// column index returned from [`DataTable::column_index`] never misses.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl DataTable {
    pub fn new(columns: Vec<String>, mut rows: Vec<Vec<CellValue>>) -> Self {
        let columns = mangle_duplicate_columns(columns);
        let width = columns.len();
        for row in &mut rows {
            row.resize(width, CellValue::Missing);
            row.truncate(width);
        }
        Self { columns, rows }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Columns whose non-missing cells are all numbers.
    ///
    /// A column with no non-missing cell at all does not qualify; neither
    /// does one mixing text and numbers.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(idx, _)| {
                let mut seen_number = false;
                for row in &self.rows {
                    match &row[*idx] {
                        CellValue::Number(_) => seen_number = true,
                        CellValue::Missing => {}
                        _ => return false,
                    }
                }
                seen_number
            })
            .map(|(_, name)| name.clone())
            .collect()
    }

    /// First `count` rows in display form, for the upload preview.
    pub fn head(&self, count: usize) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .take(count)
            .map(|row| row.iter().map(CellValue::display).collect())
            .collect()
    }
}

/// Make header names unique by suffixing repeats: `금액`, `금액.1`, `금액.2`…
fn mangle_duplicate_columns(columns: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(columns.len());
    for column in columns {
        if !seen.iter().any(|existing| *existing == column) {
            seen.push(column);
            continue;
        }
        let mut suffix = 1usize;
        loop {
            let candidate = format!("{column}.{suffix}");
            if !seen.iter().any(|existing| *existing == candidate) {
                seen.push(candidate);
                break;
            }
            suffix += 1;
        }
    }
    seen
}

pub fn format_f64(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    if (value.fract()).abs() < f64::EPSILON {
        format!("{}", value as i64)
    } else {
        let mut text = format!("{value:.6}");
        while text.ends_with('0') {
            text.pop();
        }
        if text.ends_with('.') {
            text.pop();
        }
        text
    }
}
