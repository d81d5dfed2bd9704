use std::fmt;

#[derive(Debug, PartialEq, Clone)]
pub enum Cell {
    Text(String),
    Number(f64),
    Bool(bool),
    Empty,
}

impl Cell {
    pub fn text<S: Into<String>>(value: S) -> Self {
        Cell::Text(value.into())
    }

    pub fn optional_text(value: Option<String>, fallback: &str) -> Self {
        Cell::Text(value.unwrap_or_else(|| fallback.to_string()))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Cell::Text(value) => write!(f, "{}", value),
            Cell::Number(value) => write!(f, "{}", value),
            Cell::Bool(value) => write!(f, "{}", value),
            Cell::Empty => write!(f, "NaN"),
        }
    }
}

/// One record, columns kept in insertion order.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Row {
    cells: Vec<(String, Cell)>,
}

impl Row {
    pub fn new() -> Self {
        Row::default()
    }

    /// Replaces the value when the column already exists.
    pub fn insert<S: Into<String>>(&mut self, column: S, cell: Cell) {
        let column = column.into();
        match self.cells.iter_mut().find(|(name, _)| *name == column) {
            Some(existing) => existing.1 = cell,
            None => self.cells.push((column, cell)),
        }
    }

    pub fn with<S: Into<String>>(mut self, column: S, cell: Cell) -> Self {
        self.insert(column, cell);
        self
    }

    pub fn extend(&mut self, other: Row) {
        for (column, cell) in other.cells {
            self.insert(column, cell);
        }
    }

    pub fn merged(mut self, other: Row) -> Self {
        self.extend(other);
        self
    }

    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, cell)| cell)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Columns are the union of every row's columns in first-seen order.
    pub fn from_rows(rows: &[Row]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in rows {
            for column in row.columns() {
                if !columns.iter().any(|known| known == column) {
                    columns.push(column.to_string());
                }
            }
        }
        Self::with_columns(rows, columns)
    }

    fn with_columns(rows: &[Row], columns: Vec<String>) -> Self {
        let rows = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|column| row.get(column).cloned().unwrap_or(Cell::Empty))
                    .collect()
            })
            .collect();
        Table { columns, rows }
    }

    /// Selects and orders columns; unknown columns come out empty.
    pub fn reindex(&self, columns: &[&str]) -> Self {
        let rows = self
            .rows
            .iter()
            .map(|cells| {
                columns
                    .iter()
                    .map(|column| {
                        self.column_index(column)
                            .map(|index| cells[index].clone())
                            .unwrap_or(Cell::Empty)
                    })
                    .collect()
            })
            .collect();
        Table {
            columns: columns.iter().map(|column| column.to_string()).collect(),
            rows,
        }
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|known| known == column)
    }

    #[cfg(test)]
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let index = self.column_index(column)?;
        self.rows.get(row).and_then(|cells| cells.get(index))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Plain-text grid for log output.
    pub fn render(&self) -> String {
        let rendered: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|cells| cells.iter().map(|cell| cell.to_string()).collect())
            .collect();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(index, column)| {
                rendered
                    .iter()
                    .map(|cells| cells[index].chars().count())
                    .chain(std::iter::once(column.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut lines = Vec::with_capacity(rendered.len() + 1);
        lines.push(Self::render_line(&self.columns, &widths));
        for cells in &rendered {
            lines.push(Self::render_line(cells, &widths));
        }
        lines.join("\n")
    }

    fn render_line(values: &[String], widths: &[usize]) -> String {
        values
            .iter()
            .zip(widths)
            .map(|(value, width)| format!("{:>width$}", value, width = width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    }
}
