use rust_xlsxwriter::Workbook;
use std::io::Write;
use std::path::Path;

use super::{HarvestReport, ReportRow};

const SHEET_NAME: &str = "Results";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write CSV report: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write Excel report: {0}")]
    Excel(#[from] rust_xlsxwriter::XlsxError),
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

impl HarvestReport {
    /// Writes a header row followed by one record per report row.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ExportError> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(ReportRow::COLUMNS)?;
        for row in &self.rows {
            writer.write_record(row.to_record())?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn to_csv_bytes(&self) -> Result<Vec<u8>, ExportError> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        Ok(buffer)
    }

    fn workbook(&self) -> Result<Workbook, ExportError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;

        for (col_idx, header) in ReportRow::COLUMNS.iter().enumerate() {
            worksheet.write_string(0, col_idx as u16, *header)?;
        }

        for (row_idx, row) in self.rows.iter().enumerate() {
            for (col_idx, cell) in row.to_record().iter().enumerate() {
                worksheet.write_string((row_idx + 1) as u32, col_idx as u16, cell)?;
            }
        }

        Ok(workbook)
    }

    /// Saves the report as a single-sheet workbook at `path`.
    pub fn write_xlsx(&self, path: &Path) -> Result<(), ExportError> {
        self.workbook()?.save(path)?;
        Ok(())
    }

    pub fn to_xlsx_bytes(&self) -> Result<Vec<u8>, ExportError> {
        Ok(self.workbook()?.save_to_buffer()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_still_writes_header() {
        let bytes = HarvestReport::default()
            .to_csv_bytes()
            .expect("csv renders");
        let text = String::from_utf8(bytes).expect("utf-8");

        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("application_id,candidate_id,updated_app,job_id,"));
        assert!(text.trim_end().ends_with("profile_url,stage_name"));
    }

    #[test]
    fn xlsx_buffer_is_a_zip_archive() {
        let bytes = HarvestReport::default()
            .to_xlsx_bytes()
            .expect("workbook renders");
        assert!(bytes.starts_with(b"PK"));
    }
}
