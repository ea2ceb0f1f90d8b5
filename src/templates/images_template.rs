use askama::Template;

use crate::models::Image;
use crate::utils::or_dash;

use super::PageContext;

pub struct ImageRow {
    pub name: String,
    pub tag: String,
    pub cuda_version: String,
    pub os: String,
    pub architecture: String,
    pub is_available: bool,
}

impl From<&Image> for ImageRow {
    fn from(img: &Image) -> Self {
        let os = match (img.os_name.as_deref(), img.os_version.as_deref()) {
            (Some(name), Some(version)) if !version.is_empty() => format!("{} {}", name, version),
            (name, _) => or_dash(name),
        };
        Self {
            name: img.name.clone(),
            tag: or_dash(Some(&img.tag)),
            cuda_version: or_dash(img.cuda_version.as_deref()),
            os,
            architecture: or_dash(img.architecture.as_deref()),
            is_available: img.is_available,
        }
    }
}

#[derive(Template)]
#[template(path = "images.html")]
pub struct ImagesTemplate {
    pub page: PageContext,
    pub images: Vec<ImageRow>,
    pub error: Option<String>,
}
