use std::path::Path;

use yansi::Paint;

use crate::api::auth as auth_api;
use crate::forms::FormErrors;
use crate::models::ProfileUpdate;

use super::{success, CliContext, CliError};

pub async fn show(ctx: &CliContext) -> Result<(), CliError> {
    let user = ctx.whoami().await?;
    println!("{} {}", "Username:".bold(), user.username);
    println!("{} {}", "Email:".bold(), user.email);
    match user.ssh_public_key.as_deref().filter(|k| !k.trim().is_empty()) {
        Some(key) => println!("{}\n{}", "SSH Public Key:".bold(), key),
        None => println!("{} {}", "SSH Public Key:".bold(), "not set".dim()),
    }
    Ok(())
}

/// Key text from `--file` or the positional argument. Missing both clears it.
pub fn read_key(key: Option<String>, file: Option<&Path>) -> Result<String, CliError> {
    match (key, file) {
        (Some(_), Some(_)) => Err(CliError::Usage("Pass either a key or --file, not both.".to_string())),
        (Some(key), None) => Ok(key),
        (None, Some(path)) => Ok(std::fs::read_to_string(path)?),
        (None, None) => Ok(String::new()),
    }
}

pub async fn set_ssh_key(ctx: &CliContext, key: Option<String>, file: Option<&Path>) -> Result<(), CliError> {
    let update = ProfileUpdate::from_input(&read_key(key, file)?);
    let result = auth_api::update_profile(&ctx.api, &update).await;
    if let Err(e) = &result {
        if !e.is_unauthorized() {
            return Err(CliError::from_form(&FormErrors::from_api_error(e)));
        }
    }
    ctx.observe(result)?;
    if update.ssh_public_key.is_some() {
        success("SSH Key updated successfully!");
    } else {
        success("SSH Key removed.");
    }
    Ok(())
}
