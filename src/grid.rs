//! Column and paging description handed to whatever renders the course list.

use std::collections::BTreeSet;
use std::fmt::Write;

use crate::models::Course;

pub const PAGE_SIZE_OPTIONS: [usize; 2] = [5, 10];
pub const DEFAULT_PAGE_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Delete,
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    /// Shows the named course field.
    Text,
    /// A row-scoped button.
    Action(RowAction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub field: &'static str,
    pub header_name: &'static str,
    pub width: u16,
    pub cell: CellKind,
}

/// What a click on an action cell means to the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowEvent {
    Edit(Course),
    Delete(String),
}

pub fn course_columns() -> Vec<Column> {
    vec![
        Column {
            field: "name",
            header_name: "Course Name",
            width: 130,
            cell: CellKind::Text,
        },
        Column {
            field: "description",
            header_name: "Description",
            width: 130,
            cell: CellKind::Text,
        },
        Column {
            field: "delete",
            header_name: "Delete",
            width: 100,
            cell: CellKind::Action(RowAction::Delete),
        },
        Column {
            field: "edit",
            header_name: "Edit",
            width: 100,
            cell: CellKind::Action(RowAction::Edit),
        },
    ]
}

/// Stable row identity for the grid.
pub fn row_id(course: &Course) -> &str {
    &course.id
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

pub struct Grid {
    columns: Vec<Column>,
    pagination: Pagination,
    selected: BTreeSet<String>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(course_columns())
    }
}

impl Grid {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            pagination: Pagination::default(),
            selected: BTreeSet::new(),
        }
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    /// Only sizes from [`PAGE_SIZE_OPTIONS`] are accepted. Changing size goes
    /// back to the first page.
    pub fn set_page_size(&mut self, size: usize) -> bool {
        if !PAGE_SIZE_OPTIONS.contains(&size) {
            return false;
        }
        self.pagination = Pagination {
            page: 0,
            page_size: size,
        };
        true
    }

    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.pagination.page_size).max(1)
    }

    pub fn next_page(&mut self, total: usize) -> bool {
        if self.pagination.page + 1 < self.page_count(total) {
            self.pagination.page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if self.pagination.page > 0 {
            self.pagination.page -= 1;
            true
        } else {
            false
        }
    }

    pub fn page_rows<'a>(&self, rows: &'a [Course]) -> &'a [Course] {
        let start = self.pagination.page * self.pagination.page_size;
        if start >= rows.len() {
            return &[];
        }
        let end = (start + self.pagination.page_size).min(rows.len());
        &rows[start..end]
    }

    pub fn toggle_selected(&mut self, id: &str) -> bool {
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.to_string());
            true
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn selected(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    /// Brings grid state in line with a freshly loaded collection: selection
    /// for vanished rows is dropped and the page is clamped.
    pub fn sync_rows(&mut self, rows: &[Course]) {
        self.selected
            .retain(|id| rows.iter().any(|c| row_id(c) == id.as_str()));
        let last = self.page_count(rows.len()) - 1;
        self.pagination.page = self.pagination.page.min(last);
    }

    /// Resolves a click on `field` for the `index`th row of the current page.
    pub fn action(&self, rows: &[Course], index: usize, field: &str) -> Option<RowEvent> {
        let course = self.page_rows(rows).get(index)?;
        let column = self.columns.iter().find(|c| c.field == field)?;
        match column.cell {
            CellKind::Action(RowAction::Edit) => Some(RowEvent::Edit(course.clone())),
            CellKind::Action(RowAction::Delete) => Some(RowEvent::Delete(row_id(course).to_string())),
            CellKind::Text => None,
        }
    }

    /// Plain-text table of the current page. Column widths are scaled down
    /// tenfold into characters.
    pub fn render(&self, rows: &[Course]) -> String {
        let mut out = String::new();

        let _ = write!(out, "{:<4}{:<4}", "#", "");
        for column in &self.columns {
            let _ = write!(out, "{} ", fit(column.header_name, char_width(column)));
        }
        out.push('\n');

        let page = self.page_rows(rows);
        if page.is_empty() {
            out.push_str("(no rows)\n");
        }
        for (index, course) in page.iter().enumerate() {
            let mark = if self.is_selected(row_id(course)) { "[x]" } else { "[ ]" };
            let _ = write!(out, "{:<4}{:<4}", index + 1, mark);
            for column in &self.columns {
                let text = match column.cell {
                    CellKind::Text => cell_text(course, column.field),
                    CellKind::Action(RowAction::Delete) => "[delete]",
                    CellKind::Action(RowAction::Edit) => "[edit]",
                };
                let _ = write!(out, "{} ", fit(text, char_width(column)));
            }
            out.push('\n');
        }

        let _ = write!(
            out,
            "page {}/{} ({} per page, {} total)",
            self.pagination.page + 1,
            self.page_count(rows.len()),
            self.pagination.page_size,
            rows.len()
        );
        out
    }
}

fn char_width(column: &Column) -> usize {
    usize::from(column.width / 10)
}

fn cell_text<'a>(course: &'a Course, field: &str) -> &'a str {
    match field {
        "name" => &course.name,
        "description" => &course.description,
        "_id" | "id" => &course.id,
        _ => "",
    }
}

fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        format!("{}{}", text, " ".repeat(width - count))
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('~');
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn courses(n: usize) -> Vec<Course> {
        (0..n)
            .map(|i| Course {
                id: format!("c{}", i),
                name: format!("Course {}", i),
                description: "Some description".to_string(),
            })
            .collect()
    }

    #[test]
    fn columns_match_the_course_list() {
        let columns = course_columns();
        let headers: Vec<_> = columns.iter().map(|c| (c.field, c.header_name, c.width)).collect();
        assert_eq!(
            headers,
            vec![
                ("name", "Course Name", 130),
                ("description", "Description", 130),
                ("delete", "Delete", 100),
                ("edit", "Edit", 100),
            ]
        );
    }

    #[test]
    fn pages_slice_the_collection() {
        let rows = courses(12);
        let mut grid = Grid::default();
        assert_eq!(grid.page_rows(&rows).len(), 5);
        assert_eq!(grid.page_count(rows.len()), 3);

        assert!(grid.next_page(rows.len()));
        assert!(grid.next_page(rows.len()));
        assert!(!grid.next_page(rows.len()));
        assert_eq!(grid.page_rows(&rows).len(), 2);
        assert_eq!(grid.page_rows(&rows)[0].id, "c10");

        assert!(grid.set_page_size(10));
        assert_eq!(grid.pagination().page, 0);
        assert!(!grid.set_page_size(7));
        assert_eq!(grid.pagination().page_size, 10);
    }

    #[test]
    fn empty_collection_has_one_empty_page() {
        let grid = Grid::default();
        assert_eq!(grid.page_count(0), 1);
        assert!(grid.page_rows(&[]).is_empty());
        assert!(grid.render(&[]).contains("(no rows)"));
    }

    #[test]
    fn actions_resolve_to_row_events() {
        let rows = courses(7);
        let mut grid = Grid::default();
        grid.next_page(rows.len());

        assert_eq!(
            grid.action(&rows, 1, "delete"),
            Some(RowEvent::Delete("c6".to_string()))
        );
        assert_eq!(grid.action(&rows, 0, "edit"), Some(RowEvent::Edit(rows[5].clone())));
        assert_eq!(grid.action(&rows, 0, "name"), None);
        assert_eq!(grid.action(&rows, 4, "edit"), None);
    }

    #[test]
    fn sync_rows_drops_stale_selection_and_clamps_page() {
        let rows = courses(6);
        let mut grid = Grid::default();
        grid.toggle_selected("c0");
        grid.toggle_selected("c5");
        grid.next_page(rows.len());

        grid.sync_rows(&rows[..4]);
        assert_eq!(grid.selected().collect::<Vec<_>>(), vec!["c0"]);
        assert_eq!(grid.pagination().page, 0);
    }

    #[test]
    fn render_truncates_long_cells() {
        let rows = vec![Course {
            id: "c1".to_string(),
            name: "Introduction to Everything".to_string(),
            description: "Short one".to_string(),
        }];
        let text = Grid::default().render(&rows);
        assert!(text.contains("Introduction~"));
        assert!(text.contains("[delete]"));
        assert!(text.ends_with("page 1/1 (5 per page, 1 total)"));
    }
}
