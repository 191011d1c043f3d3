//! Folder traversal and result assembly for the add-in endpoints.
//!
//! Both endpoints share one resolve-drive / resolve-folder / enumerate
//! traversal; only the per-item handling differs. Listing mode classifies
//! children without ever following shortcut contents; link mode resolves
//! shortcuts and mints sharing links.

use crate::client::GraphClient;
use crate::error::Result;
use crate::models::{DriveItem, ItemDescriptor, ItemKind, ItemLink};
use crate::shortcut;

/// A folder resolved in the caller's default drive, with its children fully
/// enumerated across all continuation pages.
struct ResolvedFolder {
    drive_id: String,
    folder: DriveItem,
    children: Vec<DriveItem>,
}

/// Shared traversal: default drive, folder path, drained child pages.
async fn resolve_children(client: &GraphClient, folder_path: &str) -> Result<ResolvedFolder> {
    let drive = client.default_drive().await?;
    let folder = client.resolve_folder(&drive.id, folder_path).await?;
    let children = client.list_children(&drive.id, &folder.id).await?;

    tracing::debug!(
        folder = %folder.name,
        count = children.len(),
        "enumerated folder children"
    );

    Ok(ResolvedFolder {
        drive_id: drive.id,
        folder,
        children,
    })
}

/// Flat, one-level listing of a folder's children.
///
/// `child_count` is fixed at 0 for every row; the listing never recurses.
/// The output preserves enumeration order.
pub async fn folder_listing(
    client: &GraphClient,
    folder_path: &str,
) -> Result<Vec<ItemDescriptor>> {
    let resolved = resolve_children(client, folder_path).await?;

    let rows = resolved
        .children
        .iter()
        .map(|child| ItemDescriptor {
            name: child.name.clone(),
            kind: ItemKind::classify(child),
            child_count: 0,
        })
        .collect();

    Ok(rows)
}

/// Per-item links for a folder and its children.
///
/// The folder's own minted link comes first, then one entry per child in
/// enumeration order: shortcuts resolve to their pointer target and are
/// omitted when resolution fails; everything else gets a minted view link,
/// and a mint failure aborts the whole request. The two policies are
/// intentionally different.
pub async fn folder_links(client: &GraphClient, folder_path: &str) -> Result<Vec<ItemLink>> {
    let resolved = resolve_children(client, folder_path).await?;
    let mut rows = Vec::with_capacity(resolved.children.len() + 1);

    let folder_url = client
        .create_view_link(&resolved.drive_id, &resolved.folder.id)
        .await?;
    rows.push(ItemLink {
        name: resolved.folder.name.clone(),
        kind: ItemKind::Folder,
        web_url: folder_url,
    });

    for child in &resolved.children {
        if let Some(row) = child_link(client, &resolved.drive_id, child).await? {
            rows.push(row);
        }
    }

    Ok(rows)
}

/// A link for a single item resolved by path.
///
/// Returns zero or one entries: zero when the item is a shortcut whose
/// target cannot be resolved.
pub async fn item_link(client: &GraphClient, item_path: &str) -> Result<Vec<ItemLink>> {
    let drive = client.default_drive().await?;
    let item = client.resolve_item(&drive.id, item_path).await?;

    let row = child_link(client, &drive.id, &item).await?;
    Ok(row.into_iter().collect())
}

/// Link-mode handling for one item. `Ok(None)` means the item is skipped
/// (unresolvable shortcut); mint errors propagate.
async fn child_link(
    client: &GraphClient,
    drive_id: &str,
    item: &DriveItem,
) -> Result<Option<ItemLink>> {
    let kind = ItemKind::classify(item);

    if kind == ItemKind::Shortcut {
        let target = shortcut::resolve(client, drive_id, &item.id).await;
        return Ok(target.map(|web_url| ItemLink {
            name: item.name.clone(),
            kind,
            web_url,
        }));
    }

    let web_url = client.create_view_link(drive_id, &item.id).await?;
    Ok(Some(ItemLink {
        name: item.name.clone(),
        kind,
        web_url,
    }))
}

#[cfg(test)]
mod tests {
    // Tests are in tests/pipeline_test.rs
}
