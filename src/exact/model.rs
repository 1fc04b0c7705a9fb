//! Solver-agnostic mixed-integer linear model.
//!
//! Columns carry bounds, an objective coefficient, an integrality flag and a
//! branching priority class; rows are sparse linear constraints. The model
//! is always a minimization of `Σ cost·x + offset`.

/// Constraint sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSense {
    /// `Σ a·x ≤ rhs`
    Le,
    /// `Σ a·x = rhs`
    Eq,
}

/// A decision variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Display name (e.g., `x[3,1]`).
    pub name: String,
    /// Lower bound.
    pub lower: f64,
    /// Upper bound.
    pub upper: f64,
    /// Objective coefficient.
    pub cost: f64,
    /// Whether the column must take an integer value.
    pub integer: bool,
    /// Branching class; lower classes are branched on first.
    pub priority: u8,
}

/// A sparse linear constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Display name (e.g., `cap[1]`).
    pub name: String,
    /// `(column, coefficient)` pairs.
    pub terms: Vec<(usize, f64)>,
    /// Sense.
    pub sense: RowSense,
    /// Right-hand side.
    pub rhs: f64,
}

/// A minimization MILP.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MilpModel {
    columns: Vec<Column>,
    rows: Vec<Row>,
    objective_offset: f64,
}

impl MilpModel {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a binary column (bounds `[0, 1]`, integer).
    pub fn add_binary(&mut self, name: impl Into<String>, cost: f64, priority: u8) -> usize {
        self.add_column(Column {
            name: name.into(),
            lower: 0.0,
            upper: 1.0,
            cost,
            integer: true,
            priority,
        })
    }

    /// Adds a column and returns its index.
    pub fn add_column(&mut self, column: Column) -> usize {
        self.columns.push(column);
        self.columns.len() - 1
    }

    /// Adds a row and returns its index.
    pub fn add_row(
        &mut self,
        name: impl Into<String>,
        terms: Vec<(usize, f64)>,
        sense: RowSense,
        rhs: f64,
    ) -> usize {
        self.rows.push(Row {
            name: name.into(),
            terms,
            sense,
            rhs,
        });
        self.rows.len() - 1
    }

    /// Fixes a column's upper bound.
    pub fn set_upper(&mut self, column: usize, upper: f64) {
        self.columns[column].upper = upper;
    }

    /// Sets the constant added to the objective.
    pub fn set_objective_offset(&mut self, offset: f64) {
        self.objective_offset = offset;
    }

    /// Constant added to the objective.
    pub fn objective_offset(&self) -> f64 {
        self.objective_offset
    }

    /// All columns.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// All rows.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column bounds as `(lower, upper)` pairs.
    pub fn bounds(&self) -> Vec<(f64, f64)> {
        self.columns.iter().map(|c| (c.lower, c.upper)).collect()
    }

    /// Objective value of a point, offset included.
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.columns
            .iter()
            .zip(values)
            .map(|(c, v)| c.cost * v)
            .sum::<f64>()
            + self.objective_offset
    }

    /// Whether a point satisfies every row and bound within `tolerance`.
    pub fn is_feasible(&self, values: &[f64], tolerance: f64) -> bool {
        if values.len() != self.columns.len() {
            return false;
        }
        let in_bounds = self
            .columns
            .iter()
            .zip(values)
            .all(|(c, &v)| v >= c.lower - tolerance && v <= c.upper + tolerance);

        in_bounds
            && self.rows.iter().all(|row| {
                let lhs: f64 = row.terms.iter().map(|&(c, a)| a * values[c]).sum();
                match row.sense {
                    RowSense::Le => lhs <= row.rhs + tolerance,
                    RowSense::Eq => (lhs - row.rhs).abs() <= tolerance,
                }
            })
    }
}
