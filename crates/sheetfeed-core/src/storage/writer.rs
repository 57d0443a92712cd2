//! Writer for Atom request bodies (worksheet entries, cell batch feeds)

use crate::error::{Result, SheetError};
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use sheetfeed_cells::cells::CellBatch;
use std::io::Write;

pub const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
pub const GS_NS: &str = "http://schemas.google.com/spreadsheets/2006";
pub const GSX_NS: &str = "http://schemas.google.com/spreadsheets/2006/extended";
pub const BATCH_NS: &str = "http://schemas.google.com/gdata/batch";

fn text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn finish(writer: Writer<Vec<u8>>) -> Result<String> {
    String::from_utf8(writer.into_inner()).map_err(|e| SheetError::feed(e.to_string()))
}

/// Entry declaring a new worksheet's title and dimensions.
pub fn write_worksheet_entry(title: &str, row_count: u32, col_count: u32) -> Result<String> {
    let mut writer = Writer::new(Vec::new());

    let entry = BytesStart::new("entry").with_attributes([("xmlns", ATOM_NS), ("xmlns:gs", GS_NS)]);
    writer.write_event(Event::Start(entry))?;
    text_element(&mut writer, "title", title)?;
    text_element(&mut writer, "gs:rowCount", &row_count.to_string())?;
    text_element(&mut writer, "gs:colCount", &col_count.to_string())?;
    writer.write_event(Event::End(BytesEnd::new("entry")))?;

    finish(writer)
}

/// Batch feed with one `update` entry per cell operation, in batch order.
pub fn write_cell_batch(batch: &CellBatch) -> Result<String> {
    let mut writer = Writer::new(Vec::new());

    let feed = BytesStart::new("feed").with_attributes([
        ("xmlns", ATOM_NS),
        ("xmlns:batch", BATCH_NS),
        ("xmlns:gs", GS_NS),
    ]);
    writer.write_event(Event::Start(feed))?;
    text_element(&mut writer, "id", &batch.feed_url)?;

    for op in &batch.ops {
        let row = op.row().to_string();
        let col = op.col().to_string();

        writer.write_event(Event::Start(BytesStart::new("entry")))?;
        text_element(&mut writer, "batch:id", &op.cell_id)?;
        writer.write_event(Event::Empty(
            BytesStart::new("batch:operation").with_attributes([("type", "update")]),
        ))?;
        text_element(&mut writer, "id", &op.cell_feed_url)?;
        writer.write_event(Event::Empty(BytesStart::new("link").with_attributes([
            ("rel", "edit"),
            ("type", "application/atom+xml"),
            ("href", op.cell_feed_url.as_str()),
        ])))?;
        writer.write_event(Event::Empty(BytesStart::new("gs:cell").with_attributes([
            ("row", row.as_str()),
            ("col", col.as_str()),
            ("inputValue", op.value.as_str()),
        ])))?;
        writer.write_event(Event::End(BytesEnd::new("entry")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("feed")))?;
    finish(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetfeed_cells::cells::{CellValue, row_of};

    const FEED: &str = "https://spreadsheets.google.com/feeds/cells/spreadsheet02/od7/private/full";

    #[test]
    fn test_worksheet_entry_fields() {
        let body = write_worksheet_entry("Worksheet Title", 10, 5).unwrap();
        assert!(body.starts_with("<entry "));
        assert!(body.contains("<title>Worksheet Title</title>"));
        assert!(body.contains("<gs:rowCount>10</gs:rowCount>"));
        assert!(body.contains("<gs:colCount>5</gs:colCount>"));
        assert!(body.ends_with("</entry>"));
    }

    #[test]
    fn test_worksheet_entry_escapes_title() {
        let body = write_worksheet_entry("Q&A <draft>", 1, 1).unwrap();
        assert!(body.contains("<title>Q&amp;A &lt;draft&gt;</title>"));
    }

    #[test]
    fn test_cell_batch_entry_shape() {
        let rows = vec![vec![Some(CellValue::from("A")), None, Some(CellValue::from("\"Open\""))]];
        let batch = CellBatch::build(FEED, None, &rows);
        let body = write_cell_batch(&batch).unwrap();

        assert!(body.starts_with("<feed "));
        assert!(body.contains(&format!("<id>{}</id>", FEED)));
        assert_eq!(body.matches("<entry>").count(), 2);
        assert!(body.contains("<batch:id>R1C1</batch:id>"));
        assert!(body.contains(r#"<batch:operation type="update"/>"#));
        assert!(body.contains(&format!("<id>{}/R1C3</id>", FEED)));
        assert!(body.contains(r#"<gs:cell row="1" col="1" inputValue="A"/>"#));
        assert!(body.contains(r#"inputValue="&quot;Open&quot;""#));
        assert!(!body.contains("R1C2"));
    }

    #[test]
    fn test_empty_batch_is_bare_feed() {
        let batch = CellBatch::build(FEED, None, &[row_of(Vec::<String>::new())]);
        let body = write_cell_batch(&batch).unwrap();
        assert!(!body.contains("<entry>"));
    }
}
