//! Data models for Microsoft Graph API responses and the add-in result shapes.

use serde::{Deserialize, Serialize};

/// Filename suffix that marks an internet-shortcut pointer file.
const SHORTCUT_SUFFIX: &str = ".url";

/// A drive returned by `/me/drive`.
#[derive(Debug, Deserialize)]
pub struct Drive {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Folder facet on a drive item.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderFacet {
    #[serde(default)]
    pub child_count: Option<u64>,
}

/// File facet on a drive item.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFacet {
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// Metadata for a file or folder in the drive.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub folder: Option<FolderFacet>,
    #[serde(default)]
    pub file: Option<FileFacet>,
    #[serde(default)]
    pub web_url: Option<String>,
}

/// One page of a `/children` listing.
#[derive(Debug, Deserialize)]
pub struct ChildrenPage {
    #[serde(default)]
    pub value: Vec<DriveItem>,
    #[serde(rename = "@odata.nextLink", default)]
    pub next_link: Option<String>,
}

/// Item metadata selected for shortcut resolution.
#[derive(Debug, Deserialize)]
pub struct DownloadInfo {
    pub id: String,
    #[serde(rename = "@microsoft.graph.downloadUrl", default)]
    pub download_url: Option<String>,
}

/// Response from the `createLink` action.
#[derive(Debug, Deserialize)]
pub struct CreateLinkResponse {
    pub link: SharingLink,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharingLink {
    pub web_url: String,
}

/// Graph API error response body.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

/// OAuth2 token response from the identity platform.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Error body returned by the identity platform on a failed exchange.
#[derive(Debug, Deserialize)]
pub struct IdentityErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub suberror: Option<String>,
}

/// Classification of a drive item as seen by the add-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ItemKind {
    File,
    Folder,
    Shortcut,
}

impl ItemKind {
    /// Classify a drive item.
    ///
    /// A case-sensitive `.url` suffix always wins, overriding whatever facet
    /// the store reports. Otherwise the folder facet decides.
    pub fn classify(item: &DriveItem) -> Self {
        if item.name.ends_with(SHORTCUT_SUFFIX) {
            ItemKind::Shortcut
        } else if item.folder.is_some() {
            ItemKind::Folder
        } else {
            ItemKind::File
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ItemKind::File => "File",
            ItemKind::Folder => "Folder",
            ItemKind::Shortcut => "Shortcut",
        };
        write!(f, "{}", s)
    }
}

/// Row shape for the flat folder listing endpoint.
///
/// `child_count` is always 0; the add-in never recurses to count
/// grandchildren.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDescriptor {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub kind: ItemKind,
    #[serde(rename = "ChildCount")]
    pub child_count: u64,
}

/// Row shape for the link endpoints. Array order is positional: entry *i*
/// lands at spreadsheet cell offset *i*.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemLink {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub kind: ItemKind,
    #[serde(rename = "WebUrl")]
    pub web_url: String,
}

impl<'de> Deserialize<'de> for ItemKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "File" => Ok(ItemKind::File),
            "Folder" => Ok(ItemKind::Folder),
            "Shortcut" => Ok(ItemKind::Shortcut),
            other => Err(serde::de::Error::custom(format!(
                "unknown item kind: {}",
                other
            ))),
        }
    }
}
