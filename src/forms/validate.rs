use std::net::IpAddr;

use serde::Deserialize;

use crate::models::{LaunchRequest, NewImage, NewServer, SignupRequest};

use super::errors::FormErrors;

const REQUIRED: &str = "This field is required.";

/// Inputs each form renders an inline error under.
pub const LAUNCH_FIELDS: &[&str] = &["image_id", "n_gpus"];
pub const SIGNUP_FIELDS: &[&str] = &["username", "email", "password", "password2"];
pub const IMAGE_FIELDS: &[&str] = &["name", "tag", "description", "os_name", "os_version", "cuda_version", "architecture"];
pub const SERVER_FIELDS: &[&str] = &["hostname", "ip_address"];
pub const PROFILE_FIELDS: &[&str] = &["ssh_public_key"];

/// Checks the launch form before any request is made.
pub fn validate_launch(image_id: &str, n_gpus: &str) -> Result<LaunchRequest, FormErrors> {
    let image_id = image_id.trim();
    if image_id.is_empty() {
        return Err(FormErrors::banner("Please select an image.").with_field("image_id", REQUIRED));
    }
    match n_gpus.trim().parse::<i64>() {
        Ok(n) if n >= 1 => Ok(LaunchRequest {
            image_id: image_id.to_string(),
            n_gpus: n,
        }),
        _ => Err(FormErrors::banner("Please enter a valid number of GPUs (minimum 1).")
            .with_field("n_gpus", "Ensure this value is greater than or equal to 1.")),
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SignupInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password2: String,
}

pub fn validate_signup(input: &SignupInput) -> Result<SignupRequest, FormErrors> {
    if input.password != input.password2 {
        return Err(FormErrors::default().with_field("password2", "Passwords do not match."));
    }
    Ok(SignupRequest {
        username: input.username.trim().to_string(),
        email: input.email.trim().to_string(),
        password: input.password.clone(),
        password2: input.password2.clone(),
    })
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ImageInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub os_name: String,
    #[serde(default)]
    pub os_version: String,
    #[serde(default)]
    pub cuda_version: String,
    #[serde(default)]
    pub architecture: String,
    /// Checkbox: present when ticked.
    #[serde(default)]
    pub is_available: Option<String>,
}

pub fn validate_image(input: &ImageInput) -> Result<NewImage, FormErrors> {
    let mut errors = FormErrors::default();
    if input.name.trim().is_empty() {
        errors = errors.with_field("name", REQUIRED);
    }
    if input.tag.trim().is_empty() {
        errors = errors.with_field("tag", REQUIRED);
    }
    if !errors.is_empty() {
        return Err(errors);
    }
    let architecture = input.architecture.trim();
    Ok(NewImage {
        name: input.name.trim().to_string(),
        tag: input.tag.trim().to_string(),
        description: input.description.trim().to_string(),
        os_name: input.os_name.trim().to_string(),
        os_version: input.os_version.trim().to_string(),
        cuda_version: input.cuda_version.trim().to_string(),
        architecture: if architecture.is_empty() { "x86_64".to_string() } else { architecture.to_string() },
        is_available: input.is_available.is_some(),
    })
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ServerInput {
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub ip_address: String,
    #[serde(default)]
    pub is_active: Option<String>,
}

pub fn validate_server(input: &ServerInput) -> Result<NewServer, FormErrors> {
    let hostname = input.hostname.trim();
    let ip = input.ip_address.trim();
    let mut errors = FormErrors::default();
    if hostname.is_empty() {
        errors = errors.with_field("hostname", REQUIRED);
    }
    if ip.is_empty() {
        errors = errors.with_field("ip_address", REQUIRED);
    } else if ip.parse::<IpAddr>().is_err() {
        errors = errors.with_field("ip_address", "Enter a valid IPv4 or IPv6 address.");
    }
    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(NewServer {
        hostname: hostname.to_string(),
        ip_address: ip.to_string(),
        is_active: input.is_active.is_some(),
    })
}
