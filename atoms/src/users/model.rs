use serde::{Deserialize, Serialize};

/// Company name assigned when signup omits one.
pub const DEFAULT_COMPANY: &str = "XYZ";

/// Profile photo assigned when signup omits one.
pub const DEFAULT_PHOTO_URL: &str = "https://placehold.co/96x96?text=Profile";

/// User domain model. The password digest stays in the store and is never
/// part of this struct.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub company: String,
    pub photo: String,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupPayload {
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    pub name: Option<String>,
    pub company: Option<String>,
    pub photo: Option<String>,
}
