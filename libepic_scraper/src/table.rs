use time::PrimitiveDateTime;

/// A single table value. EPIC logs mix numeric channels (pressures,
/// temperatures) with free-text channels (event messages, shutter states),
/// so every field is parsed numerically first and kept as text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    /// Parse one raw field from a log record.
    pub fn parse(field: &str) -> Self {
        let trimmed = field.trim();
        if trimmed.is_empty() {
            return Cell::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(value) => Cell::Number(value),
            Err(_) => Cell::Text(trimmed.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(value) if value.is_finite() => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// One row of a series: the timestamp key plus one cell per data column.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub timestamp: PrimitiveDateTime,
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(timestamp: PrimitiveDateTime, cells: Vec<Cell>) -> Self {
        Self { timestamp, cells }
    }
}

/// A time-indexed table loaded from one EPIC log.
///
/// Rows are kept in file order; timestamps are non-decreasing but may repeat
/// (the instrument occasionally logs twice in one second and nothing is
/// de-duplicated). The timestamp is the ordering key only, never a payload
/// column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesTable {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl SeriesTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, timestamp: PrimitiveDateTime, cells: Vec<Cell>) {
        self.rows.push(Row::new(timestamp, cells));
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Find the first column whose name contains the given pattern.
    /// Matching is case-sensitive, like the instrument's own column names.
    pub fn find_column(&self, pattern: &str) -> Option<usize> {
        self.columns.iter().position(|name| name.contains(pattern))
    }

    pub fn any_column_contains(&self, patterns: &[&str]) -> bool {
        self.columns
            .iter()
            .any(|name| patterns.iter().any(|pattern| name.contains(pattern)))
    }

    /// Project the table onto a subset of columns, in the given order.
    pub fn keep_columns(&self, indices: &[usize]) -> SeriesTable {
        let columns = indices
            .iter()
            .map(|index| self.columns[*index].clone())
            .collect();
        let mut projected = SeriesTable::new(columns);
        for row in &self.rows {
            let cells = indices.iter().map(|index| row.cells[*index].clone()).collect();
            projected.push_row(row.timestamp, cells);
        }
        projected
    }
}

/// A series table together with the metadata EPIC attaches to each log file.
///
/// Every pipeline stage consumes a LogSeries and produces a new one with the
/// table replaced; name and comment ride along so they cannot be lost by a
/// transform.
#[derive(Debug, Clone)]
pub struct LogSeries {
    pub name: String,
    pub comment: String,
    pub status: Option<String>,
    pub table: SeriesTable,
}

impl LogSeries {
    pub fn new(name: String, comment: String, table: SeriesTable) -> Self {
        Self {
            name,
            comment,
            status: None,
            table,
        }
    }

    /// Rewrap a transformed table, carrying the metadata forward.
    pub fn with_table(&self, table: SeriesTable) -> Self {
        Self {
            name: self.name.clone(),
            comment: self.comment.clone(),
            status: self.status.clone(),
            table,
        }
    }

    pub fn with_status(mut self, status: String) -> Self {
        self.status = Some(status);
        self
    }
}
