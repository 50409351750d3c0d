use std::io::Read;

use taxcul_core::calculators::{FormState, TaxType};
use thiserror::Error;

/// Column naming the calculator each row is submitted to.
pub const CALCULATOR_COLUMN: &str = "calculator";

/// Errors that can occur when reading a batch file.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("missing 'calculator' column")]
    MissingCalculatorColumn,

    #[error("row {row}: unknown calculator '{name}'")]
    UnknownCalculator { name: String, row: usize },
}

impl From<csv::Error> for BatchError {
    fn from(err: csv::Error) -> Self {
        BatchError::CsvParse(err.to_string())
    }
}

/// One submission read from a batch file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRow {
    /// 1-based data row number (the header is not counted).
    pub row: usize,
    pub tax_type: TaxType,
    pub form: FormState,
}

/// Reads calculator submissions from CSV.
///
/// The file needs a `calculator` column holding an endpoint slug such as
/// `withholding/interest`. Every other column is a form field; blank cells
/// are left out of the form so they read as empty input.
///
/// ```text
/// calculator,value,amount,rate
/// withholding/interest,2000,,
/// vat/taxable-supplies,,1500,standard
/// ```
pub struct BatchLoader;

impl BatchLoader {
    pub fn parse<R: Read>(reader: R) -> Result<Vec<BatchRow>, BatchError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let calculator_index = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(CALCULATOR_COLUMN))
            .ok_or(BatchError::MissingCalculatorColumn)?;

        let mut rows = Vec::new();
        for (index, result) in csv_reader.records().enumerate() {
            let record = result?;
            let row = index + 1;

            let name = record.get(calculator_index).unwrap_or_default();
            let tax_type = TaxType::parse(name).ok_or_else(|| BatchError::UnknownCalculator {
                name: name.to_string(),
                row,
            })?;

            let form: FormState = headers
                .iter()
                .zip(record.iter())
                .enumerate()
                .filter(|(i, (_, value))| *i != calculator_index && !value.is_empty())
                .map(|(_, (field, value))| (field, value))
                .collect();

            rows.push(BatchRow {
                row,
                tax_type,
                form,
            });
        }

        tracing::debug!(rows = rows.len(), "parsed batch file");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_calculator_and_fields() {
        let csv = "calculator,value,amount,rate\n\
                   withholding/interest,2000,,\n\
                   vat/taxable-supplies,,1500,standard\n";

        let rows = BatchLoader::parse(csv.as_bytes()).unwrap();

        assert_eq!(
            rows,
            vec![
                BatchRow {
                    row: 1,
                    tax_type: TaxType::WithholdingInterest,
                    form: FormState::new().with("value", "2000"),
                },
                BatchRow {
                    row: 2,
                    tax_type: TaxType::VatTaxableSupplies,
                    form: FormState::new()
                        .with("amount", "1500")
                        .with("rate", "standard"),
                },
            ]
        );
    }

    #[test]
    fn calculator_column_may_be_anywhere() {
        let csv = "turnover,Calculator,months\n 1200 , presumptive ,3\n";

        let rows = BatchLoader::parse(csv.as_bytes()).unwrap();

        assert_eq!(rows[0].tax_type, TaxType::Presumptive);
        assert_eq!(rows[0].form.get("turnover"), "1200");
        assert_eq!(rows[0].form.get("months"), "3");
        assert!(!rows[0].form.contains("Calculator"));
    }

    #[test]
    fn header_only_file_has_no_rows() {
        let rows = BatchLoader::parse("calculator,value\n".as_bytes()).unwrap();

        assert!(rows.is_empty());
    }

    #[test]
    fn missing_calculator_column() {
        let err = BatchLoader::parse("value\n100\n".as_bytes()).unwrap_err();

        assert!(matches!(err, BatchError::MissingCalculatorColumn));
    }

    #[test]
    fn unknown_calculator_reports_row() {
        let csv = "calculator,value\nimtt,10\nestate-duty,50\n";

        let err = BatchLoader::parse(csv.as_bytes()).unwrap_err();

        let BatchError::UnknownCalculator { name, row } = err else {
            panic!("Expected UnknownCalculator error, got: {:?}", err);
        };
        assert_eq!(name, "estate-duty");
        assert_eq!(row, 2);
    }

    #[test]
    fn ragged_rows_are_csv_errors() {
        let err = BatchLoader::parse("calculator,value\nimtt,10,extra\n".as_bytes()).unwrap_err();

        assert!(matches!(err, BatchError::CsvParse(_)));
    }
}
