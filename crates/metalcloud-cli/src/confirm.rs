//! Confirmation prompts for destructive operations

use std::io::IsTerminal;

use color_eyre::eyre::{self, WrapErr, bail};
use dialoguer::Confirm;

/// Ask the user to confirm `action`, e.g. "delete server 12"
///
/// Returns `true` straight away when `autoconfirm` is set. Without a
/// terminal to prompt on, refuses instead of guessing.
///
/// # Errors
/// Returns error if stdin is not interactive or the prompt fails
pub fn confirm(action: &str, autoconfirm: bool) -> eyre::Result<bool> {
    if autoconfirm {
        return Ok(true);
    }

    if !std::io::stdin().is_terminal() {
        bail!("refusing to {action} without confirmation; pass --autoconfirm to skip the prompt");
    }

    Confirm::new()
        .with_prompt(format!("Are you sure you want to {action}?"))
        .default(false)
        .interact()
        .wrap_err("failed to read confirmation")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_autoconfirm_skips_prompt() {
        assert!(confirm("delete server 12", true).unwrap());
    }
}
