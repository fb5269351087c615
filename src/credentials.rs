//! Marketplace application-id resolution.
//!
//! Resolution order: explicit override → environment value → interactive
//! prompt. The resolved id is wrapped in a `SecretString` and passed into
//! the marketplace client at construction time.

use dialoguer::Input;
use secrecy::SecretString;
use tracing::debug;

use crate::types::ScoutError;

/// Where a resolved credential came from (for logging only).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Override,
    Environment,
    Prompt,
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Resolve the marketplace application id.
///
/// `prompt` is only invoked when neither the override nor the environment
/// supplied a value. An empty answer (or no answer) is `MissingCredential`.
pub fn resolve_app_id<P>(
    override_value: Option<&str>,
    env_value: Option<&str>,
    prompt: P,
) -> Result<(SecretString, CredentialSource), ScoutError>
where
    P: FnOnce() -> Option<String>,
{
    let (value, source) = if let Some(v) = override_value.and_then(non_blank) {
        (v, CredentialSource::Override)
    } else if let Some(v) = env_value.and_then(non_blank) {
        (v, CredentialSource::Environment)
    } else {
        let answer = prompt()
            .as_deref()
            .and_then(non_blank)
            .ok_or(ScoutError::MissingCredential)?;
        (answer, CredentialSource::Prompt)
    };

    debug!(source = ?source, "Marketplace App ID resolved");
    Ok((SecretString::new(value), source))
}

/// Exit status when no App ID could be resolved.
pub const MISSING_CREDENTIAL_EXIT: i32 = 1;

/// Console line printed before a fatal startup exit.
pub fn startup_diagnostic(err: &ScoutError) -> String {
    format!("ERROR: {err}")
}

/// Ask for the App ID on the terminal. Interrupted or failed prompts
/// count as an empty answer.
pub fn prompt_terminal() -> Option<String> {
    Input::<String>::new()
        .with_prompt("Enter your eBay App ID")
        .allow_empty(true)
        .interact_text()
        .ok()
}
