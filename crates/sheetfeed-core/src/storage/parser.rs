//! Parser for Atom feed responses (worksheets feed, list feed, batch results)

use crate::document::{Row, RowCell};
use super::writer::{ATOM_NS, BATCH_NS, GS_NS, GSX_NS};
use crate::error::{Result, SheetError};
use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};

/// Names are matched in these canonical prefixes, whatever prefix the
/// document binds to each namespace.
const CANONICAL_PREFIXES: [(&str, &str); 4] = [
    (ATOM_NS, ""),
    (GS_NS, "gs:"),
    (GSX_NS, "gsx:"),
    (BATCH_NS, "batch:"),
];

/// Metadata of one worksheet as listed in a worksheets feed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorksheetEntry {
    /// Worksheet id (od token), the last path segment of the entry id.
    pub id: String,
    pub title: String,
    pub row_count: u32,
    pub col_count: u32,
}

/// A spreadsheet's worksheets feed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorksheetsFeed {
    pub title: Option<String>,
    pub entries: Vec<WorksheetEntry>,
}

/// Per-entry outcome reported in a batch response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchStatus {
    pub cell_id: Option<String>,
    pub code: u16,
    pub reason: String,
}

impl BatchStatus {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

/// Minimal element tree; feeds are small enough to hold in memory.
#[derive(Clone, Debug, Default)]
struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_str())
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

fn canonical_name(ns: &ResolveResult<'_>, start: &BytesStart<'_>) -> String {
    let known = match ns {
        ResolveResult::Bound(Namespace(uri)) => CANONICAL_PREFIXES
            .iter()
            .find(|(known_uri, _)| known_uri.as_bytes() == *uri),
        _ => None,
    };
    match known {
        Some((_, prefix)) => {
            let local = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
            format!("{}{}", prefix, local)
        }
        // Unbound or foreign namespace: keep the name as written.
        None => String::from_utf8_lossy(start.name().as_ref()).into_owned(),
    }
}

fn element_from(ns: &ResolveResult<'_>, start: &BytesStart<'_>) -> Result<Element> {
    let mut element = Element {
        name: canonical_name(ns, start),
        ..Element::default()
    };
    for attr in start.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        element.attrs.push((key, value));
    }
    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

/// Parse a document into its root element. Bodies without any element
/// (plain text) yield `None`.
fn parse_document(body: &str) -> Result<Option<Element>> {
    let mut reader = NsReader::from_str(body);
    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;

    loop {
        let (ns, event) = reader.read_resolved_event()?;
        match event {
            Event::Start(e) => stack.push(element_from(&ns, &e)?),
            Event::Empty(e) => {
                let element = element_from(&ns, &e)?;
                attach(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                if let Some(element) = stack.pop() {
                    attach(&mut stack, &mut root, element);
                }
            }
            Event::Text(t) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&t.unescape()?);
                }
            }
            Event::CData(c) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(SheetError::feed(format!("unclosed <{}> element", open.name)));
    }
    Ok(root)
}

fn parse_root(body: &str, expected: &str) -> Result<Element> {
    match parse_document(body)? {
        Some(root) if root.name == expected => Ok(root),
        Some(root) => Err(SheetError::feed(format!(
            "expected <{}>, found <{}>",
            expected, root.name
        ))),
        None => Err(SheetError::feed(format!("expected <{}>, found no element", expected))),
    }
}

fn parse_count(entry: &Element, name: &str) -> Result<u32> {
    match entry.child_text(name).map(str::trim) {
        None | Some("") => Ok(0),
        Some(text) => text
            .parse::<u32>()
            .map_err(|_| SheetError::feed(format!("invalid {}: {}", name, text))),
    }
}

impl WorksheetEntry {
    fn from_element(entry: &Element) -> Result<Self> {
        let raw_id = entry
            .child_text("id")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SheetError::feed("worksheet entry without <id>"))?;
        // https://.../worksheets/<key>/private/full/od7 -> od7
        let id = raw_id
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(raw_id)
            .to_string();

        Ok(WorksheetEntry {
            id,
            title: entry.child_text("title").unwrap_or_default().to_string(),
            row_count: parse_count(entry, "gs:rowCount")?,
            col_count: parse_count(entry, "gs:colCount")?,
        })
    }
}

/// Parse a worksheets feed (spreadsheet metadata).
pub fn parse_worksheets_feed(body: &str) -> Result<WorksheetsFeed> {
    let feed = parse_root(body, "feed")?;
    let entries = feed
        .children_named("entry")
        .map(WorksheetEntry::from_element)
        .collect::<Result<Vec<_>>>()?;
    Ok(WorksheetsFeed {
        title: feed.child_text("title").map(str::to_string),
        entries,
    })
}

/// Parse the single entry returned when a worksheet is created.
pub fn parse_worksheet_entry(body: &str) -> Result<WorksheetEntry> {
    let entry = parse_root(body, "entry")?;
    WorksheetEntry::from_element(&entry)
}

/// Parse a list feed into rows. Each `gsx:*` child becomes one cell, in
/// document order; empty elements are absent values.
pub fn parse_list_feed(body: &str) -> Result<Vec<Row>> {
    let feed = parse_root(body, "feed")?;
    let rows = feed
        .children_named("entry")
        .map(|entry| {
            let cells = entry
                .children
                .iter()
                .filter_map(|c| {
                    let key = c.name.strip_prefix("gsx:")?;
                    let value = (!c.text.is_empty()).then(|| c.text.clone());
                    Some(RowCell::new(key, value))
                })
                .collect();
            Row::new(cells)
        })
        .collect();
    Ok(rows)
}

/// Per-entry statuses of a batch response. Bodies that are not a feed (some
/// servers answer with plain text) report no statuses.
pub fn parse_batch_statuses(body: &str) -> Vec<BatchStatus> {
    let Ok(Some(feed)) = parse_document(body) else {
        return Vec::new();
    };
    if feed.name != "feed" {
        return Vec::new();
    }
    feed.children_named("entry")
        .filter_map(|entry| {
            let status = entry.child("batch:status")?;
            let code = status.attr("code")?.trim().parse::<u16>().ok()?;
            Some(BatchStatus {
                cell_id: entry.child_text("batch:id").map(str::to_string),
                code,
                reason: status.attr("reason").unwrap_or_default().to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORKSHEETS_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:gs="http://schemas.google.com/spreadsheets/2006">
  <id>https://spreadsheets.google.com/feeds/worksheets/spreadsheet01/private/full</id>
  <title type="text">Spreadsheet 01</title>
  <entry>
    <id>https://spreadsheets.google.com/feeds/worksheets/spreadsheet01/private/full/od6</id>
    <title type="text">Environments</title>
    <gs:rowCount>100</gs:rowCount>
    <gs:colCount>20</gs:colCount>
  </entry>
  <entry>
    <id>https://spreadsheets.google.com/feeds/worksheets/spreadsheet01/private/full/od7</id>
    <title type="text">Url Parameters</title>
    <gs:rowCount>50</gs:rowCount>
    <gs:colCount>4</gs:colCount>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_worksheets_feed() {
        let feed = parse_worksheets_feed(WORKSHEETS_FEED).unwrap();
        assert_eq!(feed.title.as_deref(), Some("Spreadsheet 01"));
        assert_eq!(feed.entries.len(), 2);
        assert_eq!(
            feed.entries[0],
            WorksheetEntry {
                id: "od6".to_string(),
                title: "Environments".to_string(),
                row_count: 100,
                col_count: 20,
            }
        );
        assert_eq!(feed.entries[1].id, "od7");
        assert_eq!(feed.entries[1].title, "Url Parameters");
    }

    #[test]
    fn test_parse_worksheet_entry_requires_entry_root() {
        let err = parse_worksheet_entry(WORKSHEETS_FEED).unwrap_err();
        assert!(matches!(err, SheetError::Feed { .. }));
    }

    #[test]
    fn test_parse_worksheet_entry_rejects_bad_counts() {
        let body = r#"<entry xmlns:gs="http://schemas.google.com/spreadsheets/2006"><id>x/od9</id><gs:rowCount>many</gs:rowCount></entry>"#;
        assert!(parse_worksheet_entry(body).is_err());
    }

    #[test]
    fn test_parse_list_feed_rows() {
        let body = r#"<feed xmlns="http://www.w3.org/2005/Atom" xmlns:gsx="http://schemas.google.com/spreadsheets/2006/extended">
  <entry>
    <id>row1</id>
    <gsx:id>JT:001</gsx:id>
    <gsx:summary>Allow &amp; adding</gsx:summary>
    <gsx:points/>
  </entry>
  <entry>
    <id>row2</id>
    <gsx:id>JT:002</gsx:id>
  </entry>
</feed>"#;
        let rows = parse_list_feed(body).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 3);
        assert_eq!(rows[0].get(1), Some("Allow & adding"));
        assert_eq!(rows[0].get(2), None);
        assert_eq!(rows[0].by_key("id"), Some("JT:001"));
        assert_eq!(rows[1].len(), 1);
    }

    #[test]
    fn test_parse_list_feed_rejects_plain_text() {
        assert!(parse_list_feed("success").is_err());
    }

    #[test]
    fn test_parse_unclosed_document() {
        assert!(parse_worksheets_feed("<feed><entry>").is_err());
    }

    #[test]
    fn test_batch_statuses() {
        let body = r#"<feed xmlns:batch="http://schemas.google.com/gdata/batch">
  <entry><batch:id>R1C1</batch:id><batch:status code="200" reason="Success"/></entry>
  <entry><batch:id>R1C2</batch:id><batch:status code="409" reason="Version conflict"/></entry>
</feed>"#;
        let statuses = parse_batch_statuses(body);
        assert_eq!(statuses.len(), 2);
        assert!(statuses[0].is_success());
        assert!(!statuses[1].is_success());
        assert_eq!(statuses[1].cell_id.as_deref(), Some("R1C2"));
        assert_eq!(statuses[1].reason, "Version conflict");
    }

    #[test]
    fn test_names_follow_namespace_not_prefix() {
        let entry = r#"<a:entry xmlns:a="http://www.w3.org/2005/Atom" xmlns:s="http://schemas.google.com/spreadsheets/2006">
  <a:id>https://spreadsheets.google.com/feeds/worksheets/k/private/full/od8</a:id>
  <a:title>Renamed</a:title>
  <s:rowCount>12</s:rowCount>
  <s:colCount>3</s:colCount>
</a:entry>"#;
        let parsed = parse_worksheet_entry(entry).unwrap();
        assert_eq!(parsed.id, "od8");
        assert_eq!(parsed.title, "Renamed");
        assert_eq!((parsed.row_count, parsed.col_count), (12, 3));

        let list = r#"<feed xmlns="http://www.w3.org/2005/Atom" xmlns:x="http://schemas.google.com/spreadsheets/2006/extended" xmlns:gsx="urn:other">
  <entry><x:id>JT:001</x:id><gsx:ignored>no</gsx:ignored></entry>
</feed>"#;
        let rows = parse_list_feed(list).unwrap();
        assert_eq!(rows[0].len(), 1);
        assert_eq!(rows[0].by_key("id"), Some("JT:001"));

        let statuses = parse_batch_statuses(
            r#"<feed xmlns:b="http://schemas.google.com/gdata/batch"><entry><b:id>R1C1</b:id><b:status code="201" reason="Created"/></entry></feed>"#,
        );
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].cell_id.as_deref(), Some("R1C1"));
        assert_eq!(statuses[0].code, 201);
    }

    #[test]
    fn test_batch_statuses_plain_text_body() {
        assert!(parse_batch_statuses("success").is_empty());
        assert!(parse_batch_statuses("").is_empty());
    }
}
