use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    #[serde(default, deserialize_with = "id_from_any")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "custom_registry_image_name")]
    pub tag: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub os_name: Option<String>,
    #[serde(default)]
    pub os_version: Option<String>,
    #[serde(default)]
    pub cuda_version: Option<String>,
    #[serde(default)]
    pub architecture: Option<String>,
    #[serde(default)]
    pub is_available: bool,
}

impl Image {
    /// Label used in the launch form's image picker.
    pub fn picker_label(&self) -> String {
        format!("{} ({})", self.name, self.os_name.as_deref().unwrap_or("OS N/A"))
    }
}

/// `POST /api/image/create/` body.
#[derive(Clone, Debug, Serialize)]
pub struct NewImage {
    pub name: String,
    pub tag: String,
    pub description: String,
    pub os_name: String,
    pub os_version: String,
    pub cuda_version: String,
    pub architecture: String,
    pub is_available: bool,
}

/// Ids arrive as numbers from some endpoints and strings from others.
pub(crate) fn id_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_path_is_accepted_as_tag() {
        let image: Image = serde_json::from_str(
            r#"{"id":7,"name":"pytorch","custom_registry_image_name":"reg.lab/pytorch:2.3","is_available":true}"#,
        )
        .unwrap();
        assert_eq!(image.id, "7");
        assert_eq!(image.tag, "reg.lab/pytorch:2.3");
        assert_eq!(image.picker_label(), "pytorch (OS N/A)");
    }
}
