//! Generic searchable, paginated table over JSON rows. Columns address
//! nested fields with dotted keys such as `userId.name`.

use serde_json::Value;

pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub key: &'static str,
    pub label: &'static str,
}

impl Column {
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }
}

/// Follows `path` through nested objects.
pub fn nested_value<'a>(row: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }
    path.split('.').try_fold(row, |acc, part| acc.get(part))
}

/// Text for a cell. Objects, arrays and nulls have none.
pub fn cell_text(row: &Value, path: &str) -> Option<String> {
    match nested_value(row, path)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TablePage<'a> {
    pub rows: Vec<&'a Value>,
    /// 1-based, clamped to the available pages.
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
}

impl TablePage<'_> {
    /// `Showing a to b of n results`.
    pub fn summary(&self) -> String {
        if self.total == 0 {
            return "Showing 0 to 0 of 0 results".to_string();
        }
        let first = (self.page - 1) * PAGE_SIZE + 1;
        let last = (self.page * PAGE_SIZE).min(self.total);
        format!("Showing {} to {} of {} results", first, last, self.total)
    }
}

#[derive(Debug, Clone)]
pub struct DataTable {
    columns: Vec<Column>,
    rows: Vec<Value>,
}

impl DataTable {
    pub fn new(columns: Vec<Column>, rows: Vec<Value>) -> Self {
        Self { columns, rows }
    }

    /// Rows serialized from typed records.
    pub fn from_records<T: serde::Serialize>(columns: Vec<Column>, records: &[T]) -> Result<Self, serde_json::Error> {
        let rows = records.iter().map(serde_json::to_value).collect::<Result<_, _>>()?;
        Ok(Self::new(columns, rows))
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Rows where any column contains `term`, ignoring case.
    pub fn filter(&self, term: &str) -> Vec<&Value> {
        let term = term.to_lowercase();
        self.rows
            .iter()
            .filter(|row| {
                self.columns.iter().any(|col| {
                    cell_text(row, col.key).is_some_and(|text| text.to_lowercase().contains(&term))
                })
            })
            .collect()
    }

    pub fn page(&self, term: &str, page: usize) -> TablePage<'_> {
        let filtered = self.filter(term);
        let total = filtered.len();
        let total_pages = total.div_ceil(PAGE_SIZE);
        let page = page.clamp(1, total_pages.max(1));
        let rows = filtered.into_iter().skip((page - 1) * PAGE_SIZE).take(PAGE_SIZE).collect();
        TablePage {
            rows,
            page,
            total_pages,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn students(n: usize) -> DataTable {
        let rows = (0..n)
            .map(|i| json!({ "_id": i, "userId": { "name": format!("Student {i}"), "email": format!("s{i}@x.io") } }))
            .collect();
        DataTable::new(
            vec![Column::new("userId.name", "Student"), Column::new("userId.email", "Email")],
            rows,
        )
    }

    #[test]
    fn dotted_paths_reach_nested_fields() {
        let row = json!({ "userId": { "name": "Asha" }, "price": 10, "mentorId": "m1" });
        assert_eq!(cell_text(&row, "userId.name").as_deref(), Some("Asha"));
        assert_eq!(cell_text(&row, "price").as_deref(), Some("10"));
        assert_eq!(cell_text(&row, "mentorId.userId.name"), None);
        assert_eq!(cell_text(&row, ""), None);
    }

    #[test]
    fn search_is_case_insensitive_across_columns() {
        let table = students(12);
        assert_eq!(table.filter("STUDENT 1").len(), 3);
        assert_eq!(table.filter("s11@").len(), 1);
        assert_eq!(table.filter("").len(), 12);
    }

    #[test]
    fn pages_hold_ten_rows() {
        let table = students(23);
        let first = table.page("", 1);
        assert_eq!(first.rows.len(), 10);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.summary(), "Showing 1 to 10 of 23 results");

        let last = table.page("", 9);
        assert_eq!(last.page, 3);
        assert_eq!(last.rows.len(), 3);
        assert_eq!(last.summary(), "Showing 21 to 23 of 23 results");
    }

    #[test]
    fn empty_table_has_one_empty_page() {
        let table = students(0);
        let page = table.page("anything", 4);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 0);
        assert!(page.rows.is_empty());
    }
}
