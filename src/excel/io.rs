use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};

use super::PlanError;

/// Converts a calamine cell to a trimmed string. Integral floats are printed
/// without the trailing `.0` Excel likes to attach to hour counts.
pub fn cell_to_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            if (f.floor() - f).abs() < f64::EPSILON {
                format!("{}", *f as i64)
            } else {
                format!("{}", f)
            }
        }
        Data::Int(i) => format!("{}", i),
        Data::Bool(b) => format!("{}", b),
        Data::Empty => String::new(),
        Data::Error(_) => String::new(),
        Data::DateTime(s) => s.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Reads the first worksheet of a workbook as rows of strings.
pub fn read_sheet<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<String>>, PlanError> {
    let mut workbook = open_workbook_auto(path)?;
    let names = workbook.sheet_names().to_owned();
    let sheet = names.first().cloned().ok_or(PlanError::NoSheets)?;
    let range = workbook.worksheet_range(&sheet)?;
    Ok(range
        .rows()
        .map(|r| r.iter().map(cell_to_string).collect())
        .collect())
}
