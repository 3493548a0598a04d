pub mod sheet;

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use chrono::NaiveDate;

use crate::dates;
use crate::error::{ImportError, RowError};
use crate::pontomais::{HrApi, TimeBalanceEntry};

pub const REQUIRED_HEADERS: [&str; 6] = ["ID", "NOME", "DATA", "HORAS", "OBSERVAÇÃO", "DEBITO"];
const MAX_ERRORS_SHOWN: usize = 10;

/// Header text (trimmed, upper-cased) to column index.
#[derive(Debug, Clone)]
pub struct Columns {
    index: HashMap<String, usize>,
    width: usize,
}

impl Columns {
    /// Resolve the required columns, failing before any row is touched.
    pub fn resolve(header: &[String]) -> Result<Self, ImportError> {
        let index: HashMap<String, usize> = header
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_uppercase(), i))
            .collect();

        let missing: Vec<String> = REQUIRED_HEADERS
            .iter()
            .filter(|h| !index.contains_key(**h))
            .map(|h| h.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ImportError::MissingColumns(missing));
        }

        Ok(Self {
            index,
            width: header.len(),
        })
    }

    fn cell<'r>(&self, row: &'r [String], name: &str) -> &'r str {
        self.index
            .get(name)
            .and_then(|&i| row.get(i))
            .map_or("", |s| s.trim())
    }
}

/// A data row that failed, with its 1-based position below the header.
#[derive(Debug)]
pub struct RowFailure {
    pub row: usize,
    pub employee_name: Option<String>,
    pub error: RowError,
}

impl fmt::Display for RowFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.employee_name {
            Some(name) => write!(f, "Linha {} ({}): {}", self.row, name, self.error),
            None => write!(f, "Linha {}: {}", self.row, self.error),
        }
    }
}

#[derive(Debug, Default)]
pub struct ImportReport {
    pub success_count: usize,
    pub failures: Vec<RowFailure>,
}

impl ImportReport {
    pub fn error_count(&self) -> usize {
        self.failures.len()
    }

    /// Chat summary; only the first ten failures are listed.
    pub fn render(&self) -> String {
        let mut out = format!(
            "Processamento concluído!\n\nLançamentos criados com sucesso: {}\nErros: {}\n",
            self.success_count,
            self.error_count()
        );

        if !self.failures.is_empty() {
            out.push_str("\nDetalhes dos erros:\n");
            for failure in self.failures.iter().take(MAX_ERRORS_SHOWN) {
                out.push_str(&format!("- {}\n", failure));
            }
            if self.failures.len() > MAX_ERRORS_SHOWN {
                out.push_str(&format!(
                    "... e mais {} erros.\n",
                    self.failures.len() - MAX_ERRORS_SHOWN
                ));
            }
        }
        out
    }
}

/// Creates one time-balance entry per spreadsheet row.
pub struct BatchImporter {
    row_delay: Duration,
}

impl BatchImporter {
    pub fn new(row_delay: Duration) -> Self {
        Self { row_delay }
    }

    /// Check the sheet shape without touching the API.
    pub fn validate(rows: &[Vec<String>]) -> Result<Columns, ImportError> {
        if rows.len() < 2 {
            return Err(ImportError::InsufficientData);
        }
        Columns::resolve(&rows[0])
    }

    /// Run every data row through `api`, in file order.
    ///
    /// Row failures are collected, never fatal. Rows already created stay
    /// created. A fixed pause follows every row to keep the API load flat.
    pub async fn import(
        &self,
        rows: &[Vec<String>],
        api: &dyn HrApi,
    ) -> Result<ImportReport, ImportError> {
        let columns = Self::validate(rows)?;
        let mut report = ImportReport::default();

        for (i, row) in rows.iter().enumerate().skip(1) {
            match self.import_row(&columns, row, api).await {
                Ok(()) => report.success_count += 1,
                Err((employee_name, error)) => {
                    let failure = RowFailure {
                        row: i,
                        employee_name,
                        error,
                    };
                    tracing::warn!("{}", failure);
                    report.failures.push(failure);
                }
            }

            if !self.row_delay.is_zero() {
                tokio::time::sleep(self.row_delay).await;
            }
        }

        tracing::info!(
            "Import finished: {} created, {} failed",
            report.success_count,
            report.error_count()
        );
        Ok(report)
    }

    async fn import_row(
        &self,
        columns: &Columns,
        row: &[String],
        api: &dyn HrApi,
    ) -> Result<(), (Option<String>, RowError)> {
        if row.len() < columns.width {
            return Err((None, RowError::InsufficientRowData));
        }

        let name = columns.cell(row, "NOME").to_string();
        let fail = |e: RowError| (Some(name.clone()), e);

        let date_str = columns.cell(row, "DATA");
        let date = parse_sheet_date(date_str)
            .ok_or_else(|| fail(RowError::InvalidDate(date_str.to_string())))?;

        // HORAS holds seconds despite the column name.
        let seconds_str = columns.cell(row, "HORAS");
        let amount_seconds = seconds_str
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| fail(RowError::InvalidAmount(seconds_str.to_string())))?;

        let entry = TimeBalanceEntry {
            employee_id: Some(columns.cell(row, "ID").to_string()),
            amount_seconds,
            date,
            observation: columns.cell(row, "OBSERVAÇÃO").to_string(),
            withdraw: is_debit(columns.cell(row, "DEBITO")),
        };

        tracing::debug!(
            "Creating entry for employee {:?} ({}): {:.2}s ({:.2}h) on {}",
            entry.employee_id,
            name,
            entry.amount_seconds,
            entry.hours(),
            date_str
        );
        api.create_time_balance_entry(&entry)
            .await
            .map_err(|e| fail(e.into()))
    }
}

/// `DD/MM/YYYY` first, then `YYYY-MM-DD`.
fn parse_sheet_date(s: &str) -> Option<NaiveDate> {
    dates::DAY_FIRST.parse(s).or_else(|| dates::ISO.parse(s))
}

fn is_debit(s: &str) -> bool {
    matches!(s.to_lowercase().as_str(), "true" | "sim" | "s")
}
