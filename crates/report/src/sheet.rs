use crate::{CellValue, HeaderFooter, Margins, Orientation, PaperSize};

/// One worksheet under construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub(crate) name: String,
    pub(crate) orientation: Orientation,
    pub(crate) paper_size: PaperSize,
    pub(crate) margins: Margins,
    pub(crate) header_footer: HeaderFooter,
    pub(crate) column_widths: Vec<(u16, u16, f64)>,
    pub(crate) header: Vec<String>,
    pub(crate) fields: Vec<String>,
    pub(crate) rows: Vec<Vec<CellValue>>,
    pub(crate) received_data: bool,
    pub(crate) table: bool,
}

impl Sheet {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            orientation: Orientation::default(),
            paper_size: PaperSize::default(),
            margins: Margins::default(),
            header_footer: HeaderFooter::default(),
            column_widths: Vec::new(),
            header: Vec::new(),
            fields: Vec::new(),
            rows: Vec::new(),
            received_data: false,
            table: false,
        }
    }

    /// Returns the sheet name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the header labels.
    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Returns the field bindings in column order.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Returns the data rows below the header.
    #[must_use]
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Returns the configured orientation.
    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Returns the configured paper size.
    #[must_use]
    pub fn paper_size(&self) -> PaperSize {
        self.paper_size
    }

    /// Returns the configured margins.
    #[must_use]
    pub fn margins(&self) -> Margins {
        self.margins
    }

    /// Returns whether the data range is rendered as a table.
    #[must_use]
    pub fn has_table(&self) -> bool {
        self.table
    }
}
