use serde::{Deserialize, Serialize};

/// Identity of the logged-in account as reported by `GET /api/profile/`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default = "default_authenticated")]
    pub is_authenticated: bool,
    #[serde(default)]
    pub ssh_public_key: Option<String>,
}

fn default_authenticated() -> bool {
    true
}

impl SessionUser {
    pub fn display_name(&self) -> &str {
        if self.username.is_empty() {
            &self.email
        } else {
            &self.username
        }
    }

    pub fn has_ssh_key(&self) -> bool {
        self.ssh_public_key
            .as_deref()
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
}

/// `PATCH /api/profile/` body. An empty key is sent as `null` to clear it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    pub ssh_public_key: Option<String>,
}

impl ProfileUpdate {
    pub fn from_input(raw: &str) -> Self {
        let trimmed = raw.trim();
        Self {
            ssh_public_key: if trimmed.is_empty() { None } else { Some(trimmed.to_string()) },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_defaults_to_authenticated() {
        let user: SessionUser = serde_json::from_str(r#"{"username":"ada","email":"ada@lab","is_staff":true}"#).unwrap();
        assert!(user.is_authenticated);
        assert!(user.is_staff);
        assert!(!user.has_ssh_key());
    }

    #[test]
    fn blank_ssh_key_is_cleared() {
        assert_eq!(ProfileUpdate::from_input("   \n").ssh_public_key, None);
        assert_eq!(
            ProfileUpdate::from_input(" ssh-ed25519 AAAA ada@lab\n").ssh_public_key.as_deref(),
            Some("ssh-ed25519 AAAA ada@lab")
        );
    }
}
