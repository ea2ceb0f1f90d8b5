// Shared layout context
pub mod base_template;
pub use base_template::PageContext;

// Page templates
pub mod image_create_template;
pub mod images_template;
pub mod instances_page_template;
pub mod launch_template;
pub mod login_template;
pub mod not_found_template;
pub mod profile_template;
pub mod server_create_template;
pub mod servers_template;
pub mod signup_template;

pub use image_create_template::ImageCreateTemplate;
pub use images_template::{ImageRow, ImagesTemplate};
pub use instances_page_template::{InstanceRow, InstancesTemplate};
pub use launch_template::{ImageOption, LaunchTemplate};
pub use login_template::LoginTemplate;
pub use not_found_template::NotFoundTemplate;
pub use profile_template::ProfileTemplate;
pub use server_create_template::ServerCreateTemplate;
pub use servers_template::ServersTemplate;
pub use signup_template::SignupTemplate;
