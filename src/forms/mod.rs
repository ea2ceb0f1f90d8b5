//! Form submission helpers: local validation and mapping backend errors onto
//! per-field messages and a page banner.

mod errors;
mod validate;

pub use errors::{login_failure_message, FormErrors, CORRECT_FIELDS_MESSAGE, LOGIN_NETWORK_MESSAGE, NETWORK_FAILURE_MESSAGE};
pub use validate::{
    validate_image, validate_launch, validate_server, validate_signup, ImageInput, ServerInput, SignupInput,
    IMAGE_FIELDS, LAUNCH_FIELDS, PROFILE_FIELDS, SERVER_FIELDS, SIGNUP_FIELDS,
};
