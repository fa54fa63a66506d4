/// Database row types — these map directly to SQLite rows.
/// Distinct from agora-types API bodies to keep the DB layer independent.

/// Name reported for a message or comment whose owner row is missing.
pub const UNKNOWN_USER_NAME: &str = "unknown";

pub struct UserRow {
    pub id: i64,
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
}

/// A message joined with its owner's display name.
pub struct MessageRow {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub user_message: String,
    pub updated_at: Option<String>,
}

/// A comment joined with its owner's display name.
pub struct CommentRow {
    pub id: i64,
    pub message_id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub comment: String,
    pub updated_at: Option<String>,
}
