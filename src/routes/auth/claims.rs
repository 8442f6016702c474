use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Claims {
    pub sub: String, // owner id (GitHub numeric id)
    pub login: String,
    pub email: String,
    pub exp: usize, // expiration (as UNIX timestamp)
    #[serde(default)]
    pub iss: String,
    #[serde(default)]
    pub aud: String,
}

impl Claims {
    pub fn owner_id(&self) -> &str {
        &self.sub
    }
}
