/**
 * List Repository
 *
 * Database operations for shopping lists, items, and sharing grants.
 *
 * # Access Checks
 *
 * `accessible_items` is the authorization primitive: it answers "may this
 * user touch this list" and returns the ordered snapshot in one shot. It is
 * re-run before every mutating command rather than cached at join time,
 * because ownership and grants can change between commands. A missing list
 * and a forbidden list are indistinguishable to the caller.
 *
 * # Snapshot Ordering
 *
 * Snapshots are ordered by last-modified timestamp ascending, with SQLite's
 * rowid as the insertion-order tie break. Toggling an item refreshes its
 * timestamp and therefore moves it to the end of the snapshot.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::shared::protocol::{ItemView, ListSummary, UserLists};

/// Default display name applied when a list is created without one
pub const DEFAULT_LIST_NAME: &str = "My Shopping List";

/// A shopping list row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ShoppingList {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A list item row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ListItem {
    pub id: String,
    pub list_id: String,
    pub text: String,
    pub checked: bool,
    /// Last state change (creation or toggle)
    pub timestamp: DateTime<Utc>,
}

impl From<ListItem> for ItemView {
    fn from(item: ListItem) -> Self {
        ItemView {
            id: item.id,
            text: item.text,
            checked: item.checked,
            timestamp: item.timestamp,
        }
    }
}

/// A list shared with a user, carrying the owner's username
#[derive(Debug, Clone, sqlx::FromRow)]
struct SharedListRow {
    id: String,
    name: String,
    owner_id: String,
    owner_username: String,
}

/// Create a new list owned by `owner_id`
///
/// A blank or missing name falls back to [`DEFAULT_LIST_NAME`].
pub async fn create_list(
    pool: &SqlitePool,
    owner_id: &str,
    name: Option<String>,
) -> Result<ShoppingList, sqlx::Error> {
    let id = uuid::Uuid::new_v4().to_string();
    let now = Utc::now();
    let name = name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_LIST_NAME.to_string());

    let list = sqlx::query_as::<_, ShoppingList>(
        r#"
        INSERT INTO lists (id, owner_id, name, created_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id, owner_id, name, created_at
        "#,
    )
    .bind(&id)
    .bind(owner_id)
    .bind(&name)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(list)
}

/// Get a list by ID
pub async fn find_list(
    pool: &SqlitePool,
    list_id: &str,
) -> Result<Option<ShoppingList>, sqlx::Error> {
    let list = sqlx::query_as::<_, ShoppingList>(
        r#"
        SELECT id, owner_id, name, created_at
        FROM lists
        WHERE id = $1
        "#,
    )
    .bind(list_id)
    .fetch_optional(pool)
    .await?;

    Ok(list)
}

/// Whether `user_id` may read and mutate `list_id`
///
/// True iff the user owns the list or holds a sharing grant for it.
pub async fn user_can_access(
    pool: &SqlitePool,
    list_id: &str,
    user_id: &str,
) -> Result<bool, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT l.id
        FROM lists l
        LEFT JOIN shared_lists sl ON l.id = sl.list_id AND sl.user_id = $2
        WHERE l.id = $1 AND (l.owner_id = $2 OR sl.user_id = $2)
        LIMIT 1
        "#,
    )
    .bind(list_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.is_some())
}

/// The full ordered item snapshot for a list
///
/// Ordered by timestamp ascending; rowid breaks ties in insertion order.
pub async fn list_items(pool: &SqlitePool, list_id: &str) -> Result<Vec<ListItem>, sqlx::Error> {
    let items = sqlx::query_as::<_, ListItem>(
        r#"
        SELECT id, list_id, text, checked, timestamp
        FROM items
        WHERE list_id = $1
        ORDER BY timestamp ASC, rowid ASC
        "#,
    )
    .bind(list_id)
    .fetch_all(pool)
    .await?;

    Ok(items)
}

/// Access check returning the snapshot on success
///
/// `None` means denied. A nonexistent list and a list the user has no grant
/// for produce the same `None`, so callers cannot learn which lists exist.
pub async fn accessible_items(
    pool: &SqlitePool,
    list_id: &str,
    user_id: &str,
) -> Result<Option<Vec<ListItem>>, sqlx::Error> {
    if !user_can_access(pool, list_id, user_id).await? {
        return Ok(None);
    }
    let items = list_items(pool, list_id).await?;
    Ok(Some(items))
}

/// Insert a new unchecked item with the current timestamp
pub async fn insert_item(
    pool: &SqlitePool,
    list_id: &str,
    text: &str,
) -> Result<ListItem, sqlx::Error> {
    let id = uuid::Uuid::new_v4().to_string();
    let now = Utc::now();

    let item = sqlx::query_as::<_, ListItem>(
        r#"
        INSERT INTO items (id, list_id, text, checked, timestamp)
        VALUES ($1, $2, $3, FALSE, $4)
        RETURNING id, list_id, text, checked, timestamp
        "#,
    )
    .bind(&id)
    .bind(list_id)
    .bind(text)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(item)
}

/// Delete an item scoped to its list
///
/// Returns the number of rows removed (0 when the item was already gone).
pub async fn delete_item(
    pool: &SqlitePool,
    list_id: &str,
    item_id: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM items
        WHERE id = $1 AND list_id = $2
        "#,
    )
    .bind(item_id)
    .bind(list_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Flip an item's checked state and refresh its timestamp
///
/// Single UPDATE statement, so two racing toggles resolve to whichever
/// write committed last. Returns false when no such item exists.
pub async fn toggle_item(
    pool: &SqlitePool,
    list_id: &str,
    item_id: &str,
) -> Result<bool, sqlx::Error> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE items
        SET checked = NOT checked, timestamp = $1
        WHERE id = $2 AND list_id = $3
        "#,
    )
    .bind(now)
    .bind(item_id)
    .bind(list_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// The caller's lists: owned, plus those shared with them
pub async fn user_lists(pool: &SqlitePool, user_id: &str) -> Result<UserLists, sqlx::Error> {
    let owned = sqlx::query_as::<_, ShoppingList>(
        r#"
        SELECT id, owner_id, name, created_at
        FROM lists
        WHERE owner_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let shared = sqlx::query_as::<_, SharedListRow>(
        r#"
        SELECT l.id, l.name, l.owner_id, u.username AS owner_username
        FROM lists l
        JOIN shared_lists sl ON l.id = sl.list_id
        JOIN users u ON l.owner_id = u.id
        WHERE sl.user_id = $1
        ORDER BY sl.shared_at ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(UserLists {
        owned: owned
            .into_iter()
            .map(|l| ListSummary {
                id: l.id,
                name: l.name,
                owner_id: l.owner_id,
                owner_username: None,
            })
            .collect(),
        shared: shared
            .into_iter()
            .map(|l| ListSummary {
                id: l.id,
                name: l.name,
                owner_id: l.owner_id,
                owner_username: Some(l.owner_username),
            })
            .collect(),
    })
}

/// Whether a sharing grant already exists for (list, user)
pub async fn share_exists(
    pool: &SqlitePool,
    list_id: &str,
    user_id: &str,
) -> Result<bool, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT list_id
        FROM shared_lists
        WHERE list_id = $1 AND user_id = $2
        "#,
    )
    .bind(list_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.is_some())
}

/// Insert a sharing grant
///
/// The composite primary key makes a duplicate grant a unique violation;
/// callers map that to a conflict error.
pub async fn insert_share(
    pool: &SqlitePool,
    list_id: &str,
    user_id: &str,
) -> Result<(), sqlx::Error> {
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO shared_lists (list_id, user_id, shared_at)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(list_id)
    .bind(user_id)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(())
}
