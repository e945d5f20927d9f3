use serde::{Deserialize, Serialize};

/// Keys of localized response messages.
///
/// Templated keys take the resource name as their single argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKey {
    /// Caller lacks the capability required by the action.
    YouDontHavePermission,
    /// Path identifier could not be parsed.
    InvalidId,
    /// Requested record does not exist.
    RecordNotFound,
    /// `{resource} info`
    VInfo,
    /// `List of {resource}`
    ListOfV,
    /// `{resource} created successfully`
    VCreatedSuccessfully,
    /// `{resource} updated successfully`
    VUpdatedSuccessfully,
    /// `{resource} deleted successfully`
    VDeletedSuccessfully,
}

impl MessageKey {
    /// Returns a stable catalog key.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::YouDontHavePermission => "you_dont_have_permission",
            Self::InvalidId => "invalid_id",
            Self::RecordNotFound => "record_not_found",
            Self::VInfo => "v_info",
            Self::ListOfV => "list_of_v",
            Self::VCreatedSuccessfully => "v_created_successfully",
            Self::VUpdatedSuccessfully => "v_updated_successfully",
            Self::VDeletedSuccessfully => "v_deleted_successfully",
        }
    }
}
