//! Hub catalog wire model.

use serde::{Deserialize, Serialize};

/// One catalog entry as published by the hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubPackInfo {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub downloads: Option<u64>,
    #[serde(default)]
    pub checksum: Option<String>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_author() -> String {
    "Unknown".to_string()
}

impl HubPackInfo {
    /// Minimal entry, mostly useful for tests and manual installs.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            description: String::new(),
            url: url.into(),
            version: version.into(),
            author: default_author(),
            size: None,
            preview_url: None,
            downloads: None,
            checksum: None,
        }
    }

    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }
}

/// Response envelope of `GET <hub>/packs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubCatalog {
    pub status: String,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub packs: Vec<HubPackInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HubCatalog {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Default template for raw files in a GitHub repository.
pub const DEFAULT_GITHUB_RAW_TEMPLATE: &str =
    "https://raw.githubusercontent.com/{owner}/{repo}/{ref}/{path}";

/// Default template for GitHub release assets.
pub const DEFAULT_GITHUB_RELEASE_TEMPLATE: &str =
    "https://github.com/{owner}/{repo}/releases/download/{tag}/{filename}";

/// Metadata file read from a pack's source directory.
pub const METADATA_FILE: &str = "metadata.json";

/// Where a pack listed in the hub index lives on GitHub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubSource {
    #[serde(rename = "type", default = "default_source_type")]
    pub kind: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub repo: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default)]
    pub path: String,
}

fn default_source_type() -> String {
    "github".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

impl Default for GitHubSource {
    fn default() -> Self {
        Self {
            kind: default_source_type(),
            owner: String::new(),
            repo: String::new(),
            branch: default_branch(),
            path: String::new(),
        }
    }
}

impl GitHubSource {
    /// Raw URL of `filename` inside this source's directory.
    pub fn raw_url(&self, template: &str, filename: &str) -> String {
        github_raw_url(
            template,
            &self.owner,
            &self.repo,
            &self.branch,
            &self.path,
            filename,
        )
    }
}

/// One entry of the hub index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubPackReference {
    pub slug: String,
    #[serde(default)]
    pub source: GitHubSource,
}

/// The hub index document: either a bare list or `{"packs": [...]}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum HubIndex {
    List(Vec<HubPackReference>),
    Envelope {
        #[serde(default)]
        packs: Vec<HubPackReference>,
    },
}

impl HubIndex {
    pub fn into_packs(self) -> Vec<HubPackReference> {
        match self {
            HubIndex::List(packs) | HubIndex::Envelope { packs } => packs,
        }
    }
}

/// `metadata.json` as published next to a pack's sources. Every field is
/// optional; [`RemotePackMetadata::into_pack_info`] fills the gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePackMetadata {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    /// Archive URL; when absent the release asset `<slug>.zip` tagged with
    /// the version is used.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub checksum: Option<String>,
}

impl RemotePackMetadata {
    /// Catalog entry for `reference`, as if the hub had listed it.
    pub fn into_pack_info(
        self,
        reference: &HubPackReference,
        release_template: &str,
    ) -> HubPackInfo {
        let version = self.version.unwrap_or_else(default_version);
        let source = &reference.source;
        let url = self.url.unwrap_or_else(|| {
            github_release_url(
                release_template,
                &source.owner,
                &source.repo,
                &version,
                &format!("{}.zip", reference.slug),
            )
        });

        HubPackInfo {
            name: reference.slug.clone(),
            display_name: self.display_name.unwrap_or_else(|| reference.slug.clone()),
            description: self.description.unwrap_or_default(),
            url,
            version,
            author: self.author.unwrap_or_else(default_author),
            size: None,
            preview_url: None,
            downloads: None,
            checksum: self.checksum,
        }
    }
}

/// Fill a raw-file template. `path` and `filename` are joined and leading
/// slashes dropped, so an empty `path` addresses the repository root.
pub fn github_raw_url(
    template: &str,
    owner: &str,
    repo: &str,
    git_ref: &str,
    path: &str,
    filename: &str,
) -> String {
    let full_path = format!("{}/{}", path, filename);
    template
        .replace("{owner}", owner)
        .replace("{repo}", repo)
        .replace("{ref}", git_ref)
        .replace("{path}", full_path.trim_start_matches('/'))
}

/// Fill a release-asset template.
pub fn github_release_url(
    template: &str,
    owner: &str,
    repo: &str,
    tag: &str,
    filename: &str,
) -> String {
    template
        .replace("{owner}", owner)
        .replace("{repo}", repo)
        .replace("{tag}", tag)
        .replace("{filename}", filename)
}
