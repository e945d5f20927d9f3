use crate::ReportError;

const MAX_COLUMN: u32 = 16_383;

/// Converts a column label such as `"B"` or `"AA"` to a zero-based index.
pub fn column_index(label: &str) -> Result<u16, ReportError> {
    let trimmed = label.trim();
    if trimmed.is_empty() || trimmed.len() > 3 {
        return Err(ReportError::InvalidColumn(label.to_owned()));
    }

    let mut index: u32 = 0;
    for character in trimmed.chars() {
        if !character.is_ascii_alphabetic() {
            return Err(ReportError::InvalidColumn(label.to_owned()));
        }
        let digit = u32::from(character.to_ascii_uppercase()) - u32::from('A') + 1;
        index = index * 26 + digit;
    }

    let index = index - 1;
    if index > MAX_COLUMN {
        return Err(ReportError::InvalidColumn(label.to_owned()));
    }

    u16::try_from(index).map_err(|_| ReportError::InvalidColumn(label.to_owned()))
}
