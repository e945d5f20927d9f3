//! Fluent spreadsheet report builder.
//!
//! A [`ReportBuilder`] collects sheets, page setup and rows, then renders an
//! `.xlsx` workbook in [`ReportBuilder::generate`]. Configuration mistakes are
//! recorded as they happen and reported once, by `generate`.

#![forbid(unsafe_code)]

mod builder;
mod cell;
mod column;
mod error;
mod layout;
mod sheet;

pub use builder::{ReportBuilder, ReportOutput};
pub use cell::CellValue;
pub use column::column_index;
pub use error::ReportError;
pub use layout::{HeaderFooter, Margins, Orientation, PaperSize};
pub use sheet::Sheet;
