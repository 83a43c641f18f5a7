//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{LayoutId, PageId, PagePartId, TagId, UserId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{Editor, FlashData, Layout, Page, PagePart, Tag};
use crate::domain::repository::{
    EditorRepository, FlashRepository, LayoutRepository, PagePartRepository, PageRepository,
    TagRepository,
};
use crate::domain::value_objects::{LoginRequirement, PageStatus, Role};
use crate::error::{PageError, PageResult};

const PAGE_COLUMNS: &str = r#"
    id,
    parent_id,
    position,
    title,
    slug,
    breadcrumb,
    keywords,
    description,
    layout_id,
    behavior_id,
    status_id,
    needs_login,
    is_protected,
    created_on,
    published_on,
    updated_on,
    created_by_id,
    updated_by_id
"#;

/// PostgreSQL-backed page store
#[derive(Clone)]
pub struct PgPageStore {
    pool: PgPool,
}

impl PgPageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Clean up expired flash messages and editor sessions
    pub async fn cleanup_expired(&self) -> PageResult<(u64, u64)> {
        let now_ms = Utc::now().timestamp_millis();

        let flash_deleted = self.cleanup_expired_flash().await?;

        let sessions_deleted = sqlx::query("DELETE FROM editor_sessions WHERE expires_at_ms < $1")
            .bind(now_ms)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(
            flash = flash_deleted,
            sessions = sessions_deleted,
            "Cleaned up expired page admin data"
        );

        Ok((flash_deleted, sessions_deleted))
    }
}

// ============================================================================
// Page Repository Implementation
// ============================================================================

impl PageRepository for PgPageStore {
    async fn find_page(&self, id: PageId) -> PageResult<Option<Page>> {
        let row = sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {PAGE_COLUMNS} FROM pages WHERE id = $1"
        ))
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.map(PageRow::into_page).transpose()
    }

    async fn children_of(&self, parent_id: PageId) -> PageResult<Vec<Page>> {
        let rows = sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {PAGE_COLUMNS} FROM pages WHERE parent_id = $1 \
             ORDER BY position ASC, created_on DESC NULLS LAST, id DESC"
        ))
        .bind(parent_id.value())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PageRow::into_page).collect()
    }

    async fn has_children(&self, id: PageId) -> PageResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM pages WHERE parent_id = $1)",
        )
        .bind(id.value())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn latest_child_of(&self, parent_id: PageId) -> PageResult<Option<Page>> {
        let row = sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {PAGE_COLUMNS} FROM pages WHERE parent_id = $1 ORDER BY id DESC LIMIT 1"
        ))
        .bind(parent_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.map(PageRow::into_page).transpose()
    }

    async fn save_page(&self, page: &Page) -> PageResult<PageId> {
        let id = match page.id {
            None => {
                sqlx::query_scalar::<_, i64>(
                    r#"
                    INSERT INTO pages (
                        parent_id,
                        position,
                        title,
                        slug,
                        breadcrumb,
                        keywords,
                        description,
                        layout_id,
                        behavior_id,
                        status_id,
                        needs_login,
                        is_protected,
                        created_on,
                        published_on,
                        updated_on,
                        created_by_id,
                        updated_by_id
                    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
                    RETURNING id
                    "#,
                )
                .bind(page.parent_id.map(|id| id.value()))
                .bind(page.position)
                .bind(&page.title)
                .bind(&page.slug)
                .bind(&page.breadcrumb)
                .bind(&page.keywords)
                .bind(&page.description)
                .bind(page.layout_id.map(|id| id.value()))
                .bind(&page.behavior_id)
                .bind(page.status.id())
                .bind(page.needs_login.id())
                .bind(page.is_protected)
                .bind(page.created_on)
                .bind(page.published_on)
                .bind(page.updated_on)
                .bind(page.created_by_id.map(|id| id.value()))
                .bind(page.updated_by_id.map(|id| id.value()))
                .fetch_one(&self.pool)
                .await?
            }
            Some(id) => {
                sqlx::query_scalar::<_, i64>(
                    r#"
                    UPDATE pages SET
                        parent_id = $2,
                        position = $3,
                        title = $4,
                        slug = $5,
                        breadcrumb = $6,
                        keywords = $7,
                        description = $8,
                        layout_id = $9,
                        behavior_id = $10,
                        status_id = $11,
                        needs_login = $12,
                        is_protected = $13,
                        published_on = $14,
                        updated_on = $15,
                        updated_by_id = $16
                    WHERE id = $1
                    RETURNING id
                    "#,
                )
                .bind(id.value())
                .bind(page.parent_id.map(|id| id.value()))
                .bind(page.position)
                .bind(&page.title)
                .bind(&page.slug)
                .bind(&page.breadcrumb)
                .bind(&page.keywords)
                .bind(&page.description)
                .bind(page.layout_id.map(|id| id.value()))
                .bind(&page.behavior_id)
                .bind(page.status.id())
                .bind(page.needs_login.id())
                .bind(page.is_protected)
                .bind(page.published_on)
                .bind(page.updated_on)
                .bind(page.updated_by_id.map(|id| id.value()))
                .fetch_optional(&self.pool)
                .await?
                .ok_or(PageError::PageNotFound)?
            }
        };

        tracing::debug!(page_id = id, "Page row written");
        Ok(PageId::new(id))
    }

    async fn delete_page(&self, id: PageId) -> PageResult<bool> {
        let deleted = sqlx::query("DELETE FROM pages WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

// ============================================================================
// Page Part Repository Implementation
// ============================================================================

impl PagePartRepository for PgPageStore {
    async fn parts_of(&self, page_id: PageId) -> PageResult<Vec<PagePart>> {
        let rows = sqlx::query_as::<_, PagePartRow>(
            r#"
            SELECT id, page_id, name, filter_id, content
            FROM page_parts
            WHERE page_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(page_id.value())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PagePartRow::into_part).collect())
    }

    async fn save_part(&self, part: &PagePart) -> PageResult<PagePartId> {
        let id = match part.id {
            None => {
                sqlx::query_scalar::<_, i64>(
                    r#"
                    INSERT INTO page_parts (page_id, name, filter_id, content)
                    VALUES ($1, $2, $3, $4)
                    RETURNING id
                    "#,
                )
                .bind(part.page_id.value())
                .bind(&part.name)
                .bind(&part.filter_id)
                .bind(&part.content)
                .fetch_one(&self.pool)
                .await?
            }
            Some(id) => {
                sqlx::query(
                    r#"
                    UPDATE page_parts SET
                        page_id = $2,
                        name = $3,
                        filter_id = $4,
                        content = $5
                    WHERE id = $1
                    "#,
                )
                .bind(id.value())
                .bind(part.page_id.value())
                .bind(&part.name)
                .bind(&part.filter_id)
                .bind(&part.content)
                .execute(&self.pool)
                .await?;
                id.value()
            }
        };

        Ok(PagePartId::new(id))
    }

    async fn delete_part(&self, id: PagePartId) -> PageResult<()> {
        sqlx::query("DELETE FROM page_parts WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_parts_of(&self, page_id: PageId) -> PageResult<u64> {
        let deleted = sqlx::query("DELETE FROM page_parts WHERE page_id = $1")
            .bind(page_id.value())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Tag Repository Implementation
// ============================================================================

impl TagRepository for PgPageStore {
    async fn tags_of(&self, page_id: PageId) -> PageResult<Vec<Tag>> {
        let rows = sqlx::query_as::<_, TagRow>(
            r#"
            SELECT t.id, t.name, t.count
            FROM tags t
            JOIN page_tags pt ON pt.tag_id = t.id
            WHERE pt.page_id = $1
            ORDER BY t.name ASC
            "#,
        )
        .bind(page_id.value())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TagRow::into_tag).collect())
    }

    async fn find_tag(&self, name: &str) -> PageResult<Option<Tag>> {
        let row = sqlx::query_as::<_, TagRow>("SELECT id, name, count FROM tags WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(TagRow::into_tag))
    }

    async fn save_tag(&self, tag: &Tag) -> PageResult<TagId> {
        let id = match tag.id {
            None => {
                sqlx::query_scalar::<_, i64>(
                    "INSERT INTO tags (name, count) VALUES ($1, $2) RETURNING id",
                )
                .bind(&tag.name)
                .bind(tag.count)
                .fetch_one(&self.pool)
                .await?
            }
            Some(id) => {
                sqlx::query("UPDATE tags SET name = $2, count = $3 WHERE id = $1")
                    .bind(id.value())
                    .bind(&tag.name)
                    .bind(tag.count)
                    .execute(&self.pool)
                    .await?;
                id.value()
            }
        };

        Ok(TagId::new(id))
    }

    async fn delete_tag(&self, id: TagId) -> PageResult<()> {
        sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn link_tag(&self, page_id: PageId, tag_id: TagId) -> PageResult<()> {
        sqlx::query(
            "INSERT INTO page_tags (page_id, tag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(page_id.value())
        .bind(tag_id.value())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn unlink_tag(&self, page_id: PageId, tag_id: TagId) -> PageResult<()> {
        sqlx::query("DELETE FROM page_tags WHERE page_id = $1 AND tag_id = $2")
            .bind(page_id.value())
            .bind(tag_id.value())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// ============================================================================
// Layout / Editor / Flash Implementations
// ============================================================================

impl LayoutRepository for PgPageStore {
    async fn all_layouts(&self) -> PageResult<Vec<Layout>> {
        let rows = sqlx::query_as::<_, LayoutRow>(
            "SELECT id, name, position FROM layouts ORDER BY position ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Layout {
                id: LayoutId::new(r.id),
                name: r.name,
                position: r.position,
            })
            .collect())
    }
}

impl EditorRepository for PgPageStore {
    async fn find_editor_by_session(&self, session_id: Uuid) -> PageResult<Option<Editor>> {
        let now_ms = Utc::now().timestamp_millis();

        let row = sqlx::query_as::<_, EditorRow>(
            r#"
            SELECT u.id, u.name
            FROM editor_sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.session_id = $1 AND s.expires_at_ms > $2
            "#,
        )
        .bind(session_id)
        .bind(now_ms)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let codes = sqlx::query_scalar::<_, String>(
            "SELECT role FROM user_roles WHERE user_id = $1 ORDER BY role",
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?;

        let roles = codes
            .iter()
            .filter_map(|code| {
                let role = Role::from_code(code);
                if role.is_none() {
                    tracing::warn!(user_id = row.id, role = %code, "Unknown role ignored");
                }
                role
            })
            .collect();

        Ok(Some(Editor {
            id: UserId::new(row.id),
            name: row.name,
            roles,
        }))
    }
}

impl FlashRepository for PgPageStore {
    async fn put_flash(&self, id: Uuid, flash: &FlashData, expires_at_ms: i64) -> PageResult<()> {
        let payload = serde_json::to_string(flash)?;

        sqlx::query(
            "INSERT INTO flash_messages (flash_id, payload, expires_at_ms) VALUES ($1, $2, $3)",
        )
        .bind(id)
        .bind(payload)
        .bind(expires_at_ms)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn take_flash(&self, id: Uuid) -> PageResult<Option<FlashData>> {
        let now_ms = Utc::now().timestamp_millis();

        // Expired rows are consumed too, just not returned.
        let row = sqlx::query_as::<_, (String, i64)>(
            r#"
            DELETE FROM flash_messages
            WHERE flash_id = $1
            RETURNING payload, expires_at_ms
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((payload, expires_at_ms)) if expires_at_ms > now_ms => {
                Ok(Some(serde_json::from_str(&payload)?))
            }
            Some(_) => {
                tracing::debug!(flash_id = %id, "Flash expired before it was read");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn cleanup_expired_flash(&self) -> PageResult<u64> {
        let now_ms = Utc::now().timestamp_millis();

        let deleted = sqlx::query("DELETE FROM flash_messages WHERE expires_at_ms < $1")
            .bind(now_ms)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct PageRow {
    id: i64,
    parent_id: Option<i64>,
    position: i32,
    title: String,
    slug: String,
    breadcrumb: String,
    keywords: String,
    description: String,
    layout_id: Option<i64>,
    behavior_id: String,
    status_id: i16,
    needs_login: i16,
    is_protected: bool,
    created_on: Option<DateTime<Utc>>,
    published_on: Option<DateTime<Utc>>,
    updated_on: Option<DateTime<Utc>>,
    created_by_id: Option<i64>,
    updated_by_id: Option<i64>,
}

impl PageRow {
    fn into_page(self) -> PageResult<Page> {
        let status = PageStatus::from_id(self.status_id).ok_or_else(|| {
            PageError::Internal(format!("page {} has unknown status {}", self.id, self.status_id))
        })?;
        let needs_login = LoginRequirement::from_id(self.needs_login).ok_or_else(|| {
            PageError::Internal(format!(
                "page {} has unknown login requirement {}",
                self.id, self.needs_login
            ))
        })?;

        Ok(Page {
            id: Some(PageId::new(self.id)),
            parent_id: self.parent_id.map(PageId::new),
            position: self.position,
            title: self.title,
            slug: self.slug,
            breadcrumb: self.breadcrumb,
            keywords: self.keywords,
            description: self.description,
            layout_id: self.layout_id.map(LayoutId::new),
            behavior_id: self.behavior_id,
            status,
            needs_login,
            is_protected: self.is_protected,
            created_on: self.created_on,
            published_on: self.published_on,
            updated_on: self.updated_on,
            created_by_id: self.created_by_id.map(UserId::new),
            updated_by_id: self.updated_by_id.map(UserId::new),
        })
    }
}

#[derive(sqlx::FromRow)]
struct PagePartRow {
    id: i64,
    page_id: i64,
    name: String,
    filter_id: String,
    content: String,
}

impl PagePartRow {
    fn into_part(self) -> PagePart {
        PagePart {
            id: Some(PagePartId::new(self.id)),
            page_id: PageId::new(self.page_id),
            name: self.name,
            filter_id: self.filter_id,
            content: self.content,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TagRow {
    id: i64,
    name: String,
    count: i32,
}

impl TagRow {
    fn into_tag(self) -> Tag {
        Tag {
            id: Some(TagId::new(self.id)),
            name: self.name,
            count: self.count,
        }
    }
}

#[derive(sqlx::FromRow)]
struct LayoutRow {
    id: i64,
    name: String,
    position: i32,
}

#[derive(sqlx::FromRow)]
struct EditorRow {
    id: i64,
    name: String,
}
