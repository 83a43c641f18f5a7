//! Page Tag Maintenance
//!
//! A page's tag set is replaced wholesale. Tag counts follow every link and
//! unlink, and a tag nobody uses anymore is removed.

use kernel::id::PageId;

use crate::domain::entities::Tag;
use crate::domain::repository::TagRepository;
use crate::domain::services::diff_tags;
use crate::error::PageResult;

/// Current tag names of a page
pub async fn tag_names_of<R>(repo: &R, page_id: PageId) -> PageResult<Vec<String>>
where
    R: TagRepository + Sync,
{
    let tags = repo.tags_of(page_id).await?;
    Ok(tags.into_iter().map(|tag| tag.name).collect())
}

/// Make `wanted` the exact tag set of `page_id`
pub async fn replace_page_tags<R>(repo: &R, page_id: PageId, wanted: &[String]) -> PageResult<()>
where
    R: TagRepository + Sync,
{
    let current = tag_names_of(repo, page_id).await?;
    let (added, removed) = diff_tags(&current, wanted);

    for name in &added {
        let mut tag = repo.find_tag(name).await?.unwrap_or_else(|| Tag::new(name.as_str()));
        tag.count += 1;
        let tag_id = repo.save_tag(&tag).await?;
        repo.link_tag(page_id, tag_id).await?;
    }

    for name in &removed {
        let Some(mut tag) = repo.find_tag(name).await? else {
            continue;
        };
        let Some(tag_id) = tag.id else {
            continue;
        };
        repo.unlink_tag(page_id, tag_id).await?;
        tag.count -= 1;
        if tag.count <= 0 {
            repo.delete_tag(tag_id).await?;
        } else {
            repo.save_tag(&tag).await?;
        }
    }

    if !added.is_empty() || !removed.is_empty() {
        tracing::debug!(
            page_id = %page_id,
            added = added.len(),
            removed = removed.len(),
            "Page tags replaced"
        );
    }

    Ok(())
}
