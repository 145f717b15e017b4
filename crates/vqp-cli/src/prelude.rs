pub(crate) use {
    crate::error::VqpCliError,
    anyhow::{anyhow, Context, Result as AnyResult},
    clap::{Args, Parser, Subcommand},
    colored::Colorize,
    serde::{Deserialize, Serialize},
    std::path::PathBuf,
};

/// Reads a passphrase from `$VQP_VAULT_PASSPHRASE` if set, otherwise
/// prompts interactively without echoing input.
pub(crate) fn read_passphrase(prompt: &str) -> AnyResult<String> {
    if let Ok(value) = std::env::var("VQP_VAULT_PASSPHRASE") {
        return Ok(value);
    }
    rpassword::prompt_password(prompt).context("failed to read passphrase")
}
