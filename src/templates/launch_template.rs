use askama::Template;

use crate::forms::FormErrors;

use super::PageContext;

pub struct ImageOption {
    pub id: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "launch.html")]
pub struct LaunchTemplate {
    pub page: PageContext,
    pub images: Vec<ImageOption>,
    pub load_error: Option<String>,
    pub n_gpus: String,
    pub errors: FormErrors,
}

impl LaunchTemplate {
    pub fn can_launch(&self) -> bool {
        !self.images.is_empty()
    }
}
