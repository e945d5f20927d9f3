use thiserror::Error;

/// Errors raised while building or rendering a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// An operation needed a target sheet but none was active.
    #[error("no active sheet; call active() after add_sheet()")]
    NoActiveSheet,

    /// A sheet name was referenced that was never added.
    #[error("sheet '{0}' does not exist")]
    UnknownSheet(String),

    /// Two sheets share one name.
    #[error("sheet '{0}' was added twice")]
    DuplicateSheet(String),

    /// A column label could not be parsed.
    #[error("invalid column label '{0}'")]
    InvalidColumn(String),

    /// A column range ends before it starts.
    #[error("column range {first}:{last} is reversed")]
    ReversedColumnRange {
        /// First label as given.
        first: String,
        /// Last label as given.
        last: String,
    },

    /// Data was written before field bindings were declared.
    #[error("sheet '{0}' received data before set_sheet_fields()")]
    MissingFields(String),

    /// Header and field bindings differ in length.
    #[error("sheet '{sheet}' has {headers} header(s) but {fields} field binding(s)")]
    HeaderFieldMismatch {
        /// Sheet name.
        sheet: String,
        /// Header column count.
        headers: usize,
        /// Field binding count.
        fields: usize,
    },

    /// A table was requested on a sheet without header.
    #[error("sheet '{0}' needs a header row before add_table()")]
    TableWithoutHeader(String),

    /// A data item could not be turned into a row.
    #[error("sheet '{sheet}' row {row}: {message}")]
    Row {
        /// Sheet name.
        sheet: String,
        /// Zero-based data row index.
        row: usize,
        /// Failure description.
        message: String,
    },

    /// The workbook encoder rejected the content.
    #[error("xlsx encoding failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}
