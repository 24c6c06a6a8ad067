//! API key presence checks and re-selection prompts.

use vidgen_client::config::API_KEY_VARS;
use vidgen_client::ApiKey;

/// Whether an API key is available to the process.
pub fn has_credential() -> bool {
    ApiKey::from_env().is_some()
}

/// Instructions shown when no key is configured.
pub fn missing_credential_message() -> String {
    format!(
        "No API key found. Set {} (for example in a .env file) to a key from a \
         Google Cloud project with billing enabled, then run the command again.",
        API_KEY_VARS.join(" or ")
    )
}

/// Instructions shown when the service rejected the configured key.
pub fn reconnect_message() -> String {
    format!(
        "The video service rejected your API key. It may be invalid, expired, or from a \
         project without access to video models. Select a different key, update {}, \
         and try again.",
        API_KEY_VARS[0]
    )
}
