/// Page orientation for printing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Portrait.
    #[default]
    Portrait,
    /// Landscape.
    Landscape,
}

/// Paper size for printing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaperSize {
    /// US Letter.
    Letter,
    /// US Legal.
    Legal,
    /// ISO A3.
    A3,
    /// ISO A4.
    #[default]
    A4,
}

impl PaperSize {
    /// Returns the spreadsheet paper code.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Letter => 1,
            Self::Legal => 5,
            Self::A3 => 8,
            Self::A4 => 9,
        }
    }
}

/// Page margins in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    /// Left margin.
    pub left: f64,
    /// Right margin.
    pub right: f64,
    /// Top margin.
    pub top: f64,
    /// Bottom margin.
    pub bottom: f64,
    /// Header margin.
    pub header: f64,
    /// Footer margin.
    pub footer: f64,
}

impl Margins {
    /// Sets the same margin on every edge, header and footer included.
    #[must_use]
    pub fn uniform(value: f64) -> Self {
        Self {
            left: value,
            right: value,
            top: value,
            bottom: value,
            header: value,
            footer: value,
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 0.7,
            right: 0.7,
            top: 0.75,
            bottom: 0.75,
            header: 0.3,
            footer: 0.3,
        }
    }
}

impl From<f64> for Margins {
    fn from(value: f64) -> Self {
        Self::uniform(value)
    }
}

/// Printed header and footer text.
///
/// Text uses spreadsheet control codes such as `&C` (center) and `&P` (page).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderFooter {
    /// Header text.
    pub header: Option<String>,
    /// Footer text.
    pub footer: Option<String>,
}

impl HeaderFooter {
    /// Creates an empty header/footer pair.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the header text.
    #[must_use]
    pub fn header(mut self, text: impl Into<String>) -> Self {
        self.header = Some(text.into());
        self
    }

    /// Sets the footer text.
    #[must_use]
    pub fn footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(text.into());
        self
    }
}
