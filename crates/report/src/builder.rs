use rust_xlsxwriter::{Format, Table, TableColumn, Workbook, Worksheet};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::column::column_index;
use crate::{CellValue, HeaderFooter, Margins, Orientation, PaperSize, ReportError, Sheet};

/// Rendered workbook ready for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOutput {
    /// Encoded `.xlsx` content.
    pub bytes: Vec<u8>,
    /// Download name, `<base>.xlsx`.
    pub file_name: String,
}

/// Fluent multi-sheet workbook builder.
///
/// Every configuration call targets the sheet selected with
/// [`ReportBuilder::active`]. Mistakes are collected and returned by
/// [`ReportBuilder::generate`], so a chain never has to be interrupted.
#[derive(Debug)]
pub struct ReportBuilder {
    base_name: String,
    sheets: Vec<Sheet>,
    active: Option<usize>,
    errors: Vec<ReportError>,
}

impl ReportBuilder {
    /// Starts a report whose file will be named `<base_name>.xlsx`.
    #[must_use]
    pub fn new(base_name: impl Into<String>) -> Self {
        Self {
            base_name: base_name.into(),
            sheets: Vec::new(),
            active: None,
            errors: Vec::new(),
        }
    }

    /// Appends an empty sheet. It does not become active.
    pub fn add_sheet(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        if self.position(name.as_str()).is_some() {
            self.errors.push(ReportError::DuplicateSheet(name));
        } else {
            self.sheets.push(Sheet::new(name));
        }
        self
    }

    /// Selects the sheet that following calls configure.
    pub fn active(&mut self, name: &str) -> &mut Self {
        match self.position(name) {
            Some(index) => self.active = Some(index),
            None => self.errors.push(ReportError::UnknownSheet(name.to_owned())),
        }
        self
    }

    /// Sets orientation and paper size of the active sheet.
    pub fn set_page_layout(&mut self, orientation: Orientation, paper_size: PaperSize) -> &mut Self {
        self.with_active(|sheet| {
            sheet.orientation = orientation;
            sheet.paper_size = paper_size;
            Ok(())
        })
    }

    /// Sets page margins of the active sheet, uniform or per edge.
    pub fn set_page_margins(&mut self, margins: impl Into<Margins>) -> &mut Self {
        let margins = margins.into();
        self.with_active(|sheet| {
            sheet.margins = margins;
            Ok(())
        })
    }

    /// Sets printed header and footer text of the active sheet.
    pub fn set_header_footer(&mut self, header_footer: HeaderFooter) -> &mut Self {
        self.with_active(|sheet| {
            sheet.header_footer = header_footer;
            Ok(())
        })
    }

    /// Sets the width of an inclusive column range, e.g. `("B", "C", 15.3)`.
    pub fn set_column_width(&mut self, first: &str, last: &str, width: f64) -> &mut Self {
        let range = column_index(first).and_then(|first_index| {
            let last_index = column_index(last)?;
            if last_index < first_index {
                return Err(ReportError::ReversedColumnRange {
                    first: first.to_owned(),
                    last: last.to_owned(),
                });
            }
            Ok((first_index, last_index))
        });

        self.with_active(|sheet| {
            let (first_index, last_index) = range?;
            sheet.column_widths.push((first_index, last_index, width));
            Ok(())
        })
    }

    /// Sets the header labels of the active sheet.
    pub fn write_header(&mut self, labels: &[&str]) -> &mut Self {
        self.with_active(|sheet| {
            sheet.header = labels.iter().map(|label| (*label).to_owned()).collect();
            Ok(())
        })
    }

    /// Declares which serialized fields fill the columns, in header order.
    pub fn set_sheet_fields(&mut self, fields: &[&str]) -> &mut Self {
        self.with_active(|sheet| {
            sheet.fields = fields.iter().map(|field| (*field).to_owned()).collect();
            Ok(())
        })
    }

    /// Appends one row per item, reading the bound fields from its serialized
    /// form. Fields the item does not have produce empty cells.
    pub fn write_data<T: Serialize>(&mut self, items: &[T]) -> &mut Self {
        self.with_active(|sheet| {
            sheet.received_data = true;
            if sheet.fields.is_empty() {
                return Err(ReportError::MissingFields(sheet.name.clone()));
            }

            for item in items {
                let row = serde_json::to_value(item)
                    .map_err(|error| error.to_string())
                    .and_then(|value| match value {
                        Value::Object(object) => Ok(sheet
                            .fields
                            .iter()
                            .map(|field| object.get(field).map_or(CellValue::Empty, CellValue::from))
                            .collect::<Vec<_>>()),
                        other => Err(format!("expected an object, got {other}")),
                    })
                    .map_err(|message| ReportError::Row {
                        sheet: sheet.name.clone(),
                        row: sheet.rows.len(),
                        message,
                    })?;
                sheet.rows.push(row);
            }

            Ok(())
        })
    }

    /// Renders the header and data of the active sheet as a table.
    pub fn add_table(&mut self) -> &mut Self {
        self.with_active(|sheet| {
            if sheet.header.is_empty() {
                return Err(ReportError::TableWithoutHeader(sheet.name.clone()));
            }
            sheet.table = true;
            Ok(())
        })
    }

    /// Returns a sheet by name.
    #[must_use]
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.position(name).map(|index| &self.sheets[index])
    }

    /// Validates the collected configuration and encodes the workbook.
    pub fn generate(mut self) -> Result<ReportOutput, ReportError> {
        if !self.errors.is_empty() {
            return Err(self.errors.remove(0));
        }

        let Some(active) = self.active else {
            return Err(ReportError::NoActiveSheet);
        };

        for sheet in &self.sheets {
            if sheet.received_data && sheet.header.len() != sheet.fields.len() {
                return Err(ReportError::HeaderFieldMismatch {
                    sheet: sheet.name.clone(),
                    headers: sheet.header.len(),
                    fields: sheet.fields.len(),
                });
            }
        }

        let mut workbook = Workbook::new();
        for (index, sheet) in self.sheets.iter().enumerate() {
            let mut worksheet = render_sheet(sheet)?;
            if index == active {
                worksheet.set_active(true);
            }
            workbook.push_worksheet(worksheet);
        }

        let bytes = workbook.save_to_buffer()?;
        debug!(
            report = self.base_name.as_str(),
            sheets = self.sheets.len(),
            size = bytes.len(),
            "report generated"
        );

        Ok(ReportOutput {
            bytes,
            file_name: format!("{}.xlsx", self.base_name),
        })
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.sheets.iter().position(|sheet| sheet.name == name)
    }

    fn with_active(
        &mut self,
        apply: impl FnOnce(&mut Sheet) -> Result<(), ReportError>,
    ) -> &mut Self {
        let Some(sheet) = self.active.and_then(|index| self.sheets.get_mut(index)) else {
            self.errors.push(ReportError::NoActiveSheet);
            return self;
        };

        if let Err(error) = apply(sheet) {
            self.errors.push(error);
        }
        self
    }
}

fn render_sheet(sheet: &Sheet) -> Result<Worksheet, ReportError> {
    let mut worksheet = Worksheet::new();
    worksheet.set_name(sheet.name.as_str())?;

    match sheet.orientation {
        Orientation::Portrait => worksheet.set_portrait(),
        Orientation::Landscape => worksheet.set_landscape(),
    };
    worksheet.set_paper_size(sheet.paper_size.code());

    let margins = sheet.margins;
    worksheet.set_margins(
        margins.left,
        margins.right,
        margins.top,
        margins.bottom,
        margins.header,
        margins.footer,
    );
    if let Some(header) = &sheet.header_footer.header {
        worksheet.set_header(header.as_str());
    }
    if let Some(footer) = &sheet.header_footer.footer {
        worksheet.set_footer(footer.as_str());
    }

    for (first, last, width) in &sheet.column_widths {
        for column in *first..=*last {
            worksheet.set_column_width(column, *width)?;
        }
    }

    let bold = Format::new().set_bold();
    for (column, label) in (0u16..).zip(&sheet.header) {
        if sheet.table {
            worksheet.write_string(0, column, label.as_str())?;
        } else {
            worksheet.write_string_with_format(0, column, label.as_str(), &bold)?;
        }
    }

    let first_data_row = u32::from(!sheet.header.is_empty());
    for (offset, cells) in sheet.rows.iter().enumerate() {
        let row = u32::try_from(offset)
            .ok()
            .and_then(|offset| offset.checked_add(first_data_row))
            .ok_or_else(|| ReportError::Row {
                sheet: sheet.name.clone(),
                row: offset,
                message: "row index exceeds the sheet size".to_owned(),
            })?;

        for (column, cell) in (0u16..).zip(cells) {
            match cell {
                CellValue::Empty => {}
                CellValue::Text(text) => {
                    worksheet.write_string(row, column, text.as_str())?;
                }
                CellValue::Number(number) => {
                    worksheet.write_number(row, column, *number)?;
                }
                CellValue::Bool(flag) => {
                    worksheet.write_boolean(row, column, *flag)?;
                }
            }
        }
    }

    if sheet.table {
        let columns = sheet
            .header
            .iter()
            .map(|label| TableColumn::new().set_header(label.as_str()))
            .collect::<Vec<_>>();
        let table = Table::new().set_columns(&columns);
        // A table needs at least one body row, so an empty data set keeps one blank row.
        let last_row = u32::try_from(sheet.rows.len().max(1)).unwrap_or(u32::MAX);
        let last_column = sheet
            .header
            .len()
            .checked_sub(1)
            .and_then(|index| u16::try_from(index).ok())
            .ok_or_else(|| ReportError::TableWithoutHeader(sheet.name.clone()))?;
        worksheet.add_table(0, 0, last_row, last_column, &table)?;
    }

    Ok(worksheet)
}
