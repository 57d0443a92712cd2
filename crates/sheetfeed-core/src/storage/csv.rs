//! CSV import (header + rows for a new worksheet) and export of worksheet rows

use crate::document::Worksheet;
use crate::error::{Result, SheetError};
use sheetfeed_cells::cells::{CellValue, RowData};
use std::io::Write;
use std::path::Path;

/// A CSV file split into its header line and data rows.
#[derive(Clone, Debug, PartialEq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: RowData,
}

/// Read a CSV file whose first line holds the column titles.
pub fn read_csv(path: &Path) -> Result<CsvTable> {
    let content = std::fs::read_to_string(path)?;
    parse_csv_rows(&content)
}

/// Parse CSV content. Empty fields become absent values so they are not written.
pub fn parse_csv_rows(content: &str) -> Result<CsvTable> {
    let mut lines = content.lines().filter(|l| !l.trim().is_empty());
    let Some(header_line) = lines.next() else {
        return Err(SheetError::Parse {
            line: 1,
            message: "CSV file is empty".to_string(),
        });
    };

    let headers = parse_csv_line(header_line);
    if headers.iter().all(|h| h.is_empty()) {
        return Err(SheetError::Parse {
            line: 1,
            message: "CSV header line has no titles".to_string(),
        });
    }

    let rows = lines
        .map(|line| {
            parse_csv_line(line)
                .into_iter()
                .map(|field| (!field.is_empty()).then(|| CellValue::Text(field)))
                .collect()
        })
        .collect();

    Ok(CsvTable { headers, rows })
}

/// Split one CSV line into fields; quoted fields keep their whitespace.
pub(crate) fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match (in_quotes, c) {
            (true, '"') if chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            (true, '"') => in_quotes = false,
            (true, _) => current.push(c),
            (false, '"') => {
                in_quotes = true;
                quoted = true;
            }
            (false, ',') => {
                fields.push(finish_field(std::mem::take(&mut current), quoted));
                quoted = false;
            }
            (false, _) => current.push(c),
        }
    }
    fields.push(finish_field(current, quoted));
    fields
}

fn finish_field(field: String, quoted: bool) -> String {
    if quoted { field } else { field.trim().to_string() }
}

/// Export worksheet rows as CSV, header line taken from the first row's keys.
pub fn write_csv(path: &Path, worksheet: &Worksheet) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_csv_to(&mut file, worksheet)?;
    Ok(())
}

pub(crate) fn write_csv_to<W: Write>(w: &mut W, worksheet: &Worksheet) -> std::io::Result<()> {
    let Some(first) = worksheet.rows.first() else {
        return Ok(());
    };
    let header: Vec<String> = first.keys().map(escape_csv_field).collect();
    writeln!(w, "{}", header.join(","))?;

    for row in &worksheet.rows {
        let fields: Vec<String> = row
            .values()
            .map(|v| escape_csv_field(v.unwrap_or_default()))
            .collect();
        writeln!(w, "{}", fields.join(","))?;
    }
    Ok(())
}

/// Escape a field for CSV output
fn escape_csv_field(field: &str) -> String {
    // Guard against CSV formula injection in spreadsheet apps.
    let first_non_space = field.trim_start_matches([' ', '\t']).chars().next();
    let safe_field = if matches!(first_non_space, Some('=' | '+' | '-' | '@')) {
        format!("'{}", field)
    } else {
        field.to_string()
    };

    if safe_field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", safe_field.replace('"', "\"\""))
    } else {
        safe_field
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Row, RowCell};

    #[test]
    fn test_parse_csv_line_quoted() {
        assert_eq!(
            parse_csv_line(r#"a,"hello, world",c"#),
            vec!["a", "hello, world", "c"]
        );
        assert_eq!(parse_csv_line(r#""  keep me  ", x "#), vec!["  keep me  ", "x"]);
        assert_eq!(
            parse_csv_line(r#"a,"say ""hello""",c"#),
            vec!["a", r#"say "hello""#, "c"]
        );
    }

    #[test]
    fn test_parse_csv_rows_header_and_absent_fields() {
        let table = parse_csv_rows("Id,Summary,Points\nJT:001,,3\n\nJT:002,Cache\n").unwrap();
        assert_eq!(table.headers, vec!["Id", "Summary", "Points"]);
        assert_eq!(table.rows.len(), 2);
        let expected: Vec<Option<CellValue>> = vec![Some("JT:001".into()), None, Some("3".into())];
        assert_eq!(table.rows[0], expected);
        assert_eq!(table.rows[1].len(), 2);
    }

    #[test]
    fn test_parse_csv_rows_keeps_leading_zeros_as_text() {
        let table = parse_csv_rows("Code\n007\n").unwrap();
        assert_eq!(table.rows[0][0], Some(CellValue::Text("007".to_string())));
    }

    #[test]
    fn test_parse_csv_rows_empty() {
        assert!(matches!(
            parse_csv_rows("\n  \n"),
            Err(SheetError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_escape_csv_field() {
        assert_eq!(escape_csv_field("simple"), "simple");
        assert_eq!(escape_csv_field("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv_field("with\"quote"), "\"with\"\"quote\"");
        assert_eq!(escape_csv_field(" =1+1"), "' =1+1");
    }

    #[test]
    fn test_write_csv_rows() {
        let mut ws = Worksheet::new("s1", "od6", "Sheet", 10, 5);
        ws.rows = vec![
            Row::new(vec![
                RowCell::new("id", Some("1".to_string())),
                RowCell::new("name", Some("a,b".to_string())),
            ]),
            Row::new(vec![RowCell::new("id", Some("2".to_string())), RowCell::new("name", None)]),
        ];
        let mut out = Vec::new();
        write_csv_to(&mut out, &ws).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "id,name\n1,\"a,b\"\n2,\n");
    }
}
