//! Test fixtures and factory functions for request bodies.

use serde_json::{json, Value};
use uuid::Uuid;

/// A lower-case word that no other test will use.
pub fn unique_word(stem: &str) -> String {
    format!("{}-{}", stem, &Uuid::new_v4().simple().to_string()[..12])
}

/// A group name that no other test will use.
pub fn unique_group(stem: &str) -> String {
    format!("{} {}", stem, &Uuid::new_v4().simple().to_string()[..12])
}

pub fn start_quiz_request(groups: &[&str], word_count: i64) -> Value {
    json!({
        "groups": groups,
        "word_count": word_count,
    })
}

pub fn answer_request(word_id: i64, correct: bool, session_id: Option<&str>) -> Value {
    json!({
        "word_id": word_id,
        "correct": correct,
        "session_id": session_id,
    })
}

pub fn complete_request(session_id: &str) -> Value {
    json!({ "session_id": session_id })
}

/// Definition the local test dictionary serves for a known word.
pub fn refreshed_meaning(word: &str) -> String {
    format!("refreshed meaning of {word}")
}

/// An .xlsx workbook with one sheet holding `header` and then `rows`.
/// Numeric-looking cells are written as numbers, like a spreadsheet app would.
pub fn workbook(header: &[&str], rows: &[&[&str]]) -> Vec<u8> {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        for (col, title) in header.iter().enumerate() {
            sheet.write_string(0, col as u16, *title).unwrap();
        }
        for (row, cells) in rows.iter().enumerate() {
            let row = row as u32 + 1;
            for (col, cell) in cells.iter().enumerate() {
                match cell.parse::<f64>() {
                    Ok(number) => sheet.write_number(row, col as u16, number).unwrap(),
                    Err(_) => sheet.write_string(row, col as u16, *cell).unwrap(),
                };
            }
        }
    }
    workbook.save_to_buffer().unwrap()
}
