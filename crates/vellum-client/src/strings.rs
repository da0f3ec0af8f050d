//! User-facing strings.
//!
//! Collected in one place so presentation layers and tests reference the
//! same copy.

pub const STRING_SESSION_EXPIRED: &str =
    "Your session has expired. New changes will not be pulled in. \
     Please sign out and sign back in to refresh your session.";

pub const STRING_SIGN_OUT_CONFIRMATION: &str =
    "Signing out will remove all data from this device, including notes and tags. \
     Make sure your data is synced before proceeding.";

pub const STRING_NON_MATCHING_PASSWORDS: &str =
    "The passwords you entered do not match. Please try again.";

pub const STRING_INVALID_IMPORT_FILE: &str =
    "Unable to open file. Ensure it is a proper JSON file and try again.";

pub const STRING_ERROR_DECRYPTING_IMPORT: &str =
    "An error occurred while trying to decrypt the import file. \
     Please ensure the file is correct and try again.";

/// Alert text for an unexpected sync engine exception.
pub fn sync_exception_string(data: &serde_json::Value) -> String {
    format!(
        "There was an error while trying to save your items. Please contact \
         support and share this message with them: {}",
        data
    )
}
