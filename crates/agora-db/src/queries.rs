use crate::models::{CommentRow, MessageRow, UNKNOWN_USER_NAME, UserRow};
use anyhow::Result;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params};

const NOW: &str = "strftime('%Y-%m-%d %H:%M:%f', 'now')";

// -- Users --

/// Insert a user. Returns `None` when the email is already registered.
pub fn insert_user(
    conn: &Connection,
    user_name: &str,
    email: &str,
    password_hash: &str,
) -> Result<Option<UserRow>> {
    let inserted = conn.execute(
        "INSERT INTO users (user_name, email, password_hash) VALUES (?1, ?2, ?3)",
        params![user_name, email, password_hash],
    );

    match inserted {
        Ok(_) => user_by_id(conn, conn.last_insert_rowid()),
        Err(rusqlite::Error::SqliteFailure(err, _)) if err.code == ErrorCode::ConstraintViolation => {
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

pub fn user_by_email(conn: &Connection, email: &str) -> Result<Option<UserRow>> {
    let row = conn
        .query_row(
            "SELECT id, user_name, email, password_hash FROM users WHERE email = ?1",
            [email],
            user_from_row,
        )
        .optional()?;

    Ok(row)
}

pub fn user_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>> {
    let row = conn
        .query_row(
            "SELECT id, user_name, email, password_hash FROM users WHERE id = ?1",
            [id],
            user_from_row,
        )
        .optional()?;

    Ok(row)
}

// -- Messages --

/// Newest first. Rows created within the same millisecond fall back to id order.
pub fn list_messages(conn: &Connection, skip: u32, limit: u32) -> Result<Vec<MessageRow>> {
    // JOIN users to fetch user_name in a single query (no per-row lookups)
    let mut stmt = conn.prepare(
        "SELECT m.id, m.user_id, u.user_name, m.user_message, m.updated_at
         FROM messages m
         LEFT JOIN users u ON m.user_id = u.id
         ORDER BY m.created_at DESC, m.id DESC
         LIMIT ?1 OFFSET ?2",
    )?;

    let rows = stmt
        .query_map(params![limit, skip], message_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

pub fn message_by_id(conn: &Connection, id: i64) -> Result<Option<MessageRow>> {
    let row = conn
        .query_row(
            "SELECT m.id, m.user_id, u.user_name, m.user_message, m.updated_at
             FROM messages m
             LEFT JOIN users u ON m.user_id = u.id
             WHERE m.id = ?1",
            [id],
            message_from_row,
        )
        .optional()?;

    Ok(row)
}

pub fn insert_message(conn: &Connection, user_id: i64, user_message: &str) -> Result<MessageRow> {
    conn.execute(
        "INSERT INTO messages (user_id, user_message) VALUES (?1, ?2)",
        params![user_id, user_message],
    )?;

    let id = conn.last_insert_rowid();
    message_by_id(conn, id)?.ok_or_else(|| anyhow::anyhow!("Message {} vanished after insert", id))
}

/// Replace a message body. Returns `None` if the message does not exist.
pub fn update_message(conn: &Connection, id: i64, user_message: &str) -> Result<Option<MessageRow>> {
    let changed = conn.execute(
        &format!("UPDATE messages SET user_message = ?1, updated_at = {NOW} WHERE id = ?2"),
        params![user_message, id],
    )?;

    if changed == 0 {
        return Ok(None);
    }
    message_by_id(conn, id)
}

/// Delete a message; its comments go with it through `ON DELETE CASCADE`.
/// Returns whether a row was removed.
pub fn delete_message(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn.execute("DELETE FROM messages WHERE id = ?1", [id])?;
    Ok(changed > 0)
}

// -- Comments --

/// Oldest first, ties broken by id.
pub fn comments_for_message(conn: &Connection, message_id: i64) -> Result<Vec<CommentRow>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.message_id, c.user_id, u.user_name, c.comment, c.updated_at
         FROM comments c
         LEFT JOIN users u ON c.user_id = u.id
         WHERE c.message_id = ?1
         ORDER BY c.created_at ASC, c.id ASC",
    )?;

    let rows = stmt
        .query_map([message_id], comment_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

pub fn comment_by_id(conn: &Connection, id: i64) -> Result<Option<CommentRow>> {
    let row = conn
        .query_row(
            "SELECT c.id, c.message_id, c.user_id, u.user_name, c.comment, c.updated_at
             FROM comments c
             LEFT JOIN users u ON c.user_id = u.id
             WHERE c.id = ?1",
            [id],
            comment_from_row,
        )
        .optional()?;

    Ok(row)
}

pub fn insert_comment(
    conn: &Connection,
    message_id: i64,
    user_id: i64,
    comment: &str,
) -> Result<CommentRow> {
    conn.execute(
        "INSERT INTO comments (message_id, user_id, comment) VALUES (?1, ?2, ?3)",
        params![message_id, user_id, comment],
    )?;

    let id = conn.last_insert_rowid();
    comment_by_id(conn, id)?.ok_or_else(|| anyhow::anyhow!("Comment {} vanished after insert", id))
}

/// Replace a comment body. Returns `None` if the comment does not exist.
pub fn update_comment(conn: &Connection, id: i64, comment: &str) -> Result<Option<CommentRow>> {
    let changed = conn.execute(
        &format!("UPDATE comments SET comment = ?1, updated_at = {NOW} WHERE id = ?2"),
        params![comment, id],
    )?;

    if changed == 0 {
        return Ok(None);
    }
    comment_by_id(conn, id)
}

pub fn delete_comment(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn.execute("DELETE FROM comments WHERE id = ?1", [id])?;
    Ok(changed > 0)
}

// -- Row mapping --

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        user_name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
    })
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        user_name: row
            .get::<_, Option<String>>(2)?
            .unwrap_or_else(|| UNKNOWN_USER_NAME.to_string()),
        user_message: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        id: row.get(0)?,
        message_id: row.get(1)?,
        user_id: row.get(2)?,
        user_name: row
            .get::<_, Option<String>>(3)?
            .unwrap_or_else(|| UNKNOWN_USER_NAME.to_string()),
        comment: row.get(4)?,
        updated_at: row.get(5)?,
    })
}
