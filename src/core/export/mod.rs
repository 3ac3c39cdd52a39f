//! # Exports
//!
//! Snapshots of the registry rendered for download.
//!
//! - Table exports (XLSX, CSV) use the same six columns the importer reads, so
//!   an exported file can be uploaded again unchanged.
//! - The printable export is a [`DocumentListing`] rendered as a PDF.
//!
//! Renderers are pure functions over owned snapshots, so handlers can release
//! the registry lock before rendering.
pub mod pdf;
pub mod table;

pub use pdf::render_pdf;
pub use table::{render_csv, render_xlsx};

pub const DEFAULT_DOCUMENT_TITLE: &str = "Attendee List";

/// Lines that fit on one PDF page, title included.
pub const LINES_PER_PAGE: usize = 26;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
    Pdf,
}

impl ExportFormat {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
            Self::Pdf => "pdf",
        }
    }

    pub fn file_name(&self) -> String {
        format!("attendees.{}", self.label())
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Csv => "text/csv; charset=utf-8",
            Self::Pdf => "application/pdf",
        }
    }

    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.file_name())
    }
}

/// A titled listing split into pages. The title takes the first line of page one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentListing {
    pub title: String,
    pub pages: Vec<Vec<String>>,
}

impl DocumentListing {
    pub fn paginate(title: &str, lines: Vec<String>) -> Self {
        let mut pages = Vec::new();
        let mut current = Vec::with_capacity(LINES_PER_PAGE);
        let mut capacity = LINES_PER_PAGE - 1;

        for line in lines {
            if current.len() == capacity {
                pages.push(std::mem::take(&mut current));
                capacity = LINES_PER_PAGE;
            }
            current.push(line);
        }
        pages.push(current);

        Self {
            title: title.to_string(),
            pages,
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flatten().map(String::as_str)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}
