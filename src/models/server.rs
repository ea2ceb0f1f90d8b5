use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    #[serde(default, deserialize_with = "crate::models::image::id_from_any")]
    pub id: String,
    #[serde(default, alias = "name")]
    pub hostname: String,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

/// `POST /api/server/create/` body.
#[derive(Clone, Debug, Serialize)]
pub struct NewServer {
    pub hostname: String,
    pub ip_address: String,
    pub is_active: bool,
}
