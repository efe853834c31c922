//! Hungarian/Munkres solver for the rectangular assignment problem.

use ndarray::Array2;

use crate::error::{Error, Result};

/// Costs this close to zero are treated as reduced zeros. The reduction
/// steps subtract exact minima, so real zeros only drift by accumulated
/// floating-point error.
const ZERO_EPS: f64 = 1e-9;

/// Optimal assignment over a dense non-negative cost matrix.
///
/// Rows must not outnumber columns. The solver knows nothing about tracks:
/// it returns, for each row, the column minimizing the total selected cost
/// over all perfect matchings. Tie-breaks happen in a fixed row-major scan
/// order, so the result is deterministic for a given matrix.
#[derive(Debug)]
pub struct HungarianSolver {
    costs: Array2<f64>,
    num_rows: usize,
    num_cols: usize,
    rows_star: Vec<Option<usize>>,
    cols_star: Vec<Option<usize>>,
    rows_prime: Vec<Option<usize>>,
    rows_covered: Vec<bool>,
    cols_covered: Vec<bool>,
}

impl HungarianSolver {
    /// Create a solver for the given cost matrix.
    ///
    /// Fails with [`Error::InvalidConfig`] when the matrix is empty, has
    /// more rows than columns, or contains negative or non-finite costs.
    pub fn new(costs: Array2<f64>) -> Result<Self> {
        let (num_rows, num_cols) = costs.dim();
        if num_rows == 0 || num_cols == 0 {
            return Err(Error::InvalidConfig("empty cost matrix".into()));
        }
        if num_rows > num_cols {
            return Err(Error::InvalidConfig(format!(
                "cost matrix must have rows <= cols, got {num_rows}x{num_cols}"
            )));
        }
        if costs.iter().any(|&c| !c.is_finite() || c < 0.0) {
            return Err(Error::InvalidConfig(
                "cost matrix entries must be finite and non-negative".into(),
            ));
        }
        Ok(Self {
            costs,
            num_rows,
            num_cols,
            rows_star: vec![None; num_rows],
            cols_star: vec![None; num_cols],
            rows_prime: vec![None; num_rows],
            rows_covered: vec![false; num_rows],
            cols_covered: vec![false; num_cols],
        })
    }

    /// Run the optimization and return `assignment[row] = col`.
    ///
    /// The result is a perfect matching of rows to distinct columns with
    /// minimal total cost. [`Error::SolverInvariant`] signals an internal
    /// defect (non-termination guard or a non-injective matching) and means
    /// the scores derived from it must not be trusted.
    pub fn solve(mut self) -> Result<Vec<usize>> {
        self.reduce_rows();
        self.reduce_cols();
        self.star_initial_zeros();

        // each augmentation stars one more column; each reduction creates at
        // least one new zero, so the step count is polynomially bounded
        let guard_limit = 16 + self.num_rows * self.num_cols * (self.num_rows + self.num_cols);
        let mut guard = 0usize;

        while !self.all_rows_starred() {
            match self.find_uncovered_zero() {
                Some((row, col)) => {
                    self.rows_prime[row] = Some(col);
                    match self.rows_star[row] {
                        // augmenting path found: flip stars along the
                        // alternating star/prime chain and start over
                        None => self.augment(row, col)?,
                        Some(star_col) => {
                            self.rows_covered[row] = true;
                            self.cols_covered[star_col] = false;
                        }
                    }
                }
                None => self.reduce_uncovered(),
            }
            guard += 1;
            if guard > guard_limit {
                return Err(Error::SolverInvariant(format!(
                    "no convergence after {guard} steps on a {}x{} matrix",
                    self.num_rows, self.num_cols
                )));
            }
        }

        let assignment: Vec<usize> = self
            .rows_star
            .iter()
            .map(|star| {
                star.ok_or_else(|| Error::SolverInvariant("unassigned row in matching".into()))
            })
            .collect::<Result<_>>()?;

        let mut seen = vec![false; self.num_cols];
        for &col in &assignment {
            if seen[col] {
                return Err(Error::SolverInvariant(format!(
                    "column {col} assigned to two rows"
                )));
            }
            seen[col] = true;
        }
        Ok(assignment)
    }

    /// Subtract each row's minimum from the row.
    fn reduce_rows(&mut self) {
        for mut row in self.costs.rows_mut() {
            let min = row.iter().cloned().fold(f64::INFINITY, f64::min);
            row.mapv_inplace(|c| c - min);
        }
    }

    /// Subtract each column's minimum from the column. Guarantees a zero in
    /// every column before starring, which cuts down the augment/reduce
    /// iterations.
    fn reduce_cols(&mut self) {
        for mut col in self.costs.columns_mut() {
            let min = col.iter().cloned().fold(f64::INFINITY, f64::min);
            col.mapv_inplace(|c| c - min);
        }
    }

    /// Greedily star one zero per row/column without conflicts.
    fn star_initial_zeros(&mut self) {
        for row in 0..self.num_rows {
            for col in 0..self.num_cols {
                if self.cols_star[col].is_none() && self.is_zero(row, col) {
                    self.rows_star[row] = Some(col);
                    self.cols_star[col] = Some(row);
                    break;
                }
            }
        }
        self.cover_starred_columns();
    }

    fn is_zero(&self, row: usize, col: usize) -> bool {
        self.costs[[row, col]].abs() < ZERO_EPS
    }

    fn cover_starred_columns(&mut self) {
        for col in 0..self.num_cols {
            self.cols_covered[col] = self.cols_star[col].is_some();
        }
    }

    fn all_rows_starred(&self) -> bool {
        self.rows_star.iter().all(|star| star.is_some())
    }

    fn find_uncovered_zero(&self) -> Option<(usize, usize)> {
        for row in 0..self.num_rows {
            if self.rows_covered[row] {
                continue;
            }
            for col in 0..self.num_cols {
                if !self.cols_covered[col] && self.is_zero(row, col) {
                    return Some((row, col));
                }
            }
        }
        None
    }

    /// Flip stars and primes along the alternating chain starting at the
    /// freshly primed zero `(row, col)`, then reset covers and primes.
    fn augment(&mut self, row: usize, col: usize) -> Result<()> {
        let mut star_row = self.cols_star[col];
        self.rows_star[row] = Some(col);
        self.cols_star[col] = Some(row);

        while let Some(current_row) = star_row {
            // every row along the alternating chain holds a prime
            let prime_col = self.rows_prime[current_row].ok_or_else(|| {
                Error::SolverInvariant("alternating chain row without prime".into())
            })?;
            star_row = self.cols_star[prime_col];
            self.rows_star[current_row] = Some(prime_col);
            self.cols_star[prime_col] = Some(current_row);
        }

        self.rows_prime.fill(None);
        self.rows_covered.fill(false);
        self.cover_starred_columns();
        Ok(())
    }

    /// No uncovered zero left: subtract the minimum uncovered value from
    /// the uncovered entries and add it to the doubly covered ones. Creates
    /// at least one new zero without changing the optimal structure.
    fn reduce_uncovered(&mut self) {
        let mut min = f64::INFINITY;
        for row in 0..self.num_rows {
            if self.rows_covered[row] {
                continue;
            }
            for col in 0..self.num_cols {
                if !self.cols_covered[col] {
                    min = min.min(self.costs[[row, col]]);
                }
            }
        }
        if !min.is_finite() {
            return;
        }
        for row in 0..self.num_rows {
            for col in 0..self.num_cols {
                match (self.rows_covered[row], self.cols_covered[col]) {
                    (true, true) => self.costs[[row, col]] += min,
                    (false, false) => self.costs[[row, col]] -= min,
                    _ => {}
                }
            }
        }
    }
}
