use super::Worksheet;
use std::sync::Arc;

/// One cell of a list-feed row: the column key and its value (absent when empty).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowCell {
    pub key: String,
    pub value: Option<String>,
}

impl RowCell {
    pub fn new(key: impl Into<String>, value: Option<String>) -> Self {
        RowCell {
            key: key.into(),
            value,
        }
    }
}

/// A data row. Position `i` holds column `i + 1`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Row {
    cells: Vec<RowCell>,
}

impl Row {
    pub fn new(cells: Vec<RowCell>) -> Self {
        Row { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Value at a 0-based position.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.cells.get(index).and_then(|c| c.value.as_deref())
    }

    /// Value of the first cell with this column key.
    pub fn by_key(&self, key: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|c| c.key == key)
            .and_then(|c| c.value.as_deref())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|c| c.key.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = Option<&str>> {
        self.cells.iter().map(|c| c.value.as_deref())
    }

    pub fn cells(&self) -> &[RowCell] {
        &self.cells
    }
}

/// In-memory view of a remote spreadsheet and the worksheets loaded or created
/// through it.
#[derive(Clone, Debug, Default)]
pub struct Spreadsheet {
    /// Remote spreadsheet key.
    pub id: String,
    /// Feed title, known once metadata has been fetched.
    pub title: Option<String>,
    /// Worksheet titles to load on fetch; empty loads all.
    pub wanted: Vec<String>,
    /// Loaded/created worksheets in the order they settled.
    pub worksheets: Vec<Arc<Worksheet>>,
}

impl Spreadsheet {
    /// Create a spreadsheet handle. Nothing is fetched.
    pub fn new(id: impl Into<String>) -> Self {
        Spreadsheet {
            id: id.into(),
            ..Spreadsheet::default()
        }
    }

    pub fn with_wanted<I, S>(id: impl Into<String>, wanted: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Spreadsheet {
            wanted: wanted.into_iter().map(Into::into).collect(),
            ..Spreadsheet::new(id)
        }
    }

    /// First worksheet with exactly this title.
    pub fn get_worksheet(&self, title: &str) -> Option<&Arc<Worksheet>> {
        self.worksheets.iter().find(|w| w.title == title)
    }

    /// Mutable access to the first worksheet with this title. Outstanding
    /// handles to it (e.g. from a create request) keep the previous state.
    pub fn worksheet_mut(&mut self, title: &str) -> Option<&mut Worksheet> {
        self.worksheets
            .iter_mut()
            .find(|w| w.title == title)
            .map(Arc::make_mut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet_with(titles: &[&str]) -> Spreadsheet {
        let mut sheet = Spreadsheet::new("s1");
        for (i, title) in titles.iter().enumerate() {
            let ws = Worksheet::new("s1", format!("od{}", i + 6), *title, 10, 5);
            sheet.worksheets.push(Arc::new(ws));
        }
        sheet
    }

    #[test]
    fn test_get_worksheet_returns_first_match() {
        let sheet = sheet_with(&["Env", "Params", "Env"]);
        let ws = sheet.get_worksheet("Env").unwrap();
        assert_eq!(ws.id, "od6");
        assert!(sheet.get_worksheet("env").is_none());
        assert!(sheet.get_worksheet("Missing").is_none());
    }

    #[test]
    fn test_get_worksheet_is_stable() {
        let sheet = sheet_with(&["Env"]);
        let a = sheet.get_worksheet("Env").unwrap();
        let b = sheet.get_worksheet("Env").unwrap();
        assert!(Arc::ptr_eq(a, b));
    }

    #[test]
    fn test_worksheet_mut_detaches_from_outstanding_handles() {
        let mut sheet = sheet_with(&["Env"]);
        let handle = Arc::clone(sheet.get_worksheet("Env").unwrap());
        sheet.worksheet_mut("Env").unwrap().title = "Renamed".to_string();
        assert_eq!(handle.title, "Env");
        assert!(sheet.get_worksheet("Renamed").is_some());
    }

    #[test]
    fn test_row_accessors() {
        let row = Row::new(vec![
            RowCell::new("id", Some("1".to_string())),
            RowCell::new("note", None),
        ]);
        assert_eq!(row.len(), 2);
        assert_eq!(row.get(0), Some("1"));
        assert_eq!(row.get(1), None);
        assert_eq!(row.get(5), None);
        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["id", "note"]);
    }
}
