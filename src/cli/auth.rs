use std::io::{self, BufRead, Write};

use yansi::Paint;

use crate::api::auth as auth_api;
use crate::config::Settings;
use crate::forms::{login_failure_message, validate_signup, FormErrors, SignupInput};
use crate::models::SessionUser;

use super::{spinner, success, CliContext, CliError};

/// Read one line from stdin after printing `prompt`.
pub fn prompt_line(prompt: &str) -> Result<String, CliError> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub async fn login(ctx: &CliContext, identifier: &str, password: Option<String>) -> Result<(), CliError> {
    let password = match password {
        Some(p) => p,
        None => prompt_line("Password: ")?,
    };
    let pb = spinner("Signing in...");
    let result = auth_api::login(&ctx.api, identifier, &password).await;
    pb.finish_and_clear();
    if let Err(e) = result {
        return Err(CliError::Form(login_failure_message(&e)));
    }

    let mut user = match auth_api::fetch_profile(&ctx.api).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(error = %e, "profile fetch after login failed");
            SessionUser {
                username: identifier.to_string(),
                is_authenticated: true,
                ..Default::default()
            }
        }
    };
    user.is_authenticated = true;
    success(format!("Logged in as {}", user.display_name()));
    ctx.identity.set(user);
    ctx.persist()
}

pub async fn logout(ctx: &CliContext) -> Result<(), CliError> {
    if let Err(e) = auth_api::logout(&ctx.api).await {
        tracing::warn!(error = %e, "backend logout failed");
    }
    ctx.forget()?;
    success("Logged out.");
    Ok(())
}

pub async fn signup(ctx: &CliContext, input: SignupInput) -> Result<(), CliError> {
    let req = validate_signup(&input).map_err(|e| CliError::from_form(&e))?;
    let result = auth_api::signup(&ctx.api, &req).await;
    result.map_err(|e| CliError::from_form(&FormErrors::from_api_error(&e)))?;
    success("Signup successful! Please log in.");
    Ok(())
}

pub async fn whoami(ctx: &CliContext) -> Result<(), CliError> {
    let user = ctx.require_login().await?;
    println!("{} {}", "Username:".bold(), user.username);
    println!("{} {}", "Email:".bold(), user.email);
    println!("{} {}", "Staff:".bold(), if user.is_staff { "yes" } else { "no" });
    println!(
        "{} {}",
        "SSH key:".bold(),
        if user.has_ssh_key() { "configured" } else { "not set" }
    );
    ctx.persist()
}

/// Validate configuration and probe the backend's profile endpoint.
pub async fn check_config(settings: &Settings) -> Result<(), CliError> {
    println!("{} {}", "API base URL:".bold(), settings.api_base_url);
    println!("{} {}s", "Poll interval:".bold(), settings.poll_interval.as_secs());
    println!("{} {}s", "Settle delay:".bold(), settings.settle_delay.as_secs());
    println!("{} {}", "Session file:".bold(), settings.session_file.display());

    let ctx = CliContext::load(settings.clone())?;
    match auth_api::fetch_profile(&ctx.api).await {
        Ok(user) => success(format!("Backend reachable; logged in as {}", user.display_name())),
        Err(e) => match e.status() {
            Some(status) => success(format!(
                "Backend reachable (profile endpoint answered {})",
                crate::api::status_phrase(&status)
            )),
            None => return Err(CliError::Api(e)),
        },
    }
    Ok(())
}
