use chrono::{DateTime, Utc};

/// Profile fields as known by the identity provider. Used when creating a
/// mirror record and when a webhook overwrites profile data.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub clerk_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: String,
    pub is_premium: bool,
}

/// A verified premium purchase. `profile` is only applied when the mirror
/// record does not exist yet.
#[derive(Debug, Clone)]
pub struct PremiumGrant {
    pub profile: UserProfile,
    pub purchased_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
