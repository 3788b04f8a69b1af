//! Reading uploaded .xlsx workbooks.

use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};

use crate::error::{ApiError, Result};

/// Reject anything that is not named like an .xlsx workbook.
pub fn ensure_xlsx(filename: &str) -> Result<()> {
    let is_xlsx = filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("xlsx"));

    if is_xlsx {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "unsupported file type '{filename}', expected an .xlsx workbook"
        )))
    }
}

/// Read the first sheet of a workbook into a grid of cell texts.
pub fn read_xlsx(bytes: Vec<u8>) -> Result<Vec<Vec<String>>> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e| ApiError::Parse(format!("unreadable workbook: {e}")))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ApiError::Parse("workbook has no sheets".to_string()))?
        .map_err(|e| ApiError::Parse(format!("unreadable sheet: {e}")))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

/// Cell contents as text. Whole numbers lose their trailing ".0".
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}
