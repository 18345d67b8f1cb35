//! Document reference nodes.

use chrono::{DateTime, TimeZone, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::tree::TreeNode;

/// Type name used by the explorer service for folders.
pub const FOLDER_TYPE: &str = "Folder";

/// A folder or document in the explorer hierarchy.
///
/// A node with `children` (possibly empty) is a folder, a node without
/// them is a leaf document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocRef {
    /// Globally unique identifier, immutable after creation.
    pub uuid: String,

    /// Document type ("Folder", "Dictionary", "Pipeline", ...).
    #[serde(rename = "type")]
    pub doc_type: CompactString,

    /// Display name.
    #[serde(default)]
    pub name: CompactString,

    /// Children, present on folders only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<DocRef>>,
}

impl DocRef {
    /// Create a folder with no children.
    pub fn new_folder(uuid: impl Into<String>, name: impl Into<CompactString>) -> Self {
        Self {
            uuid: uuid.into(),
            doc_type: FOLDER_TYPE.into(),
            name: name.into(),
            children: Some(Vec::new()),
        }
    }

    /// Create a leaf document.
    pub fn new_document(
        uuid: impl Into<String>,
        doc_type: impl Into<CompactString>,
        name: impl Into<CompactString>,
    ) -> Self {
        Self {
            uuid: uuid.into(),
            doc_type: doc_type.into(),
            name: name.into(),
            children: None,
        }
    }

    /// Append a child, turning this node into a folder if it was a leaf.
    pub fn with_child(mut self, child: DocRef) -> Self {
        self.children.get_or_insert_with(Vec::new).push(child);
        self
    }

    /// Check if this node is a folder.
    pub fn is_folder(&self) -> bool {
        self.children.is_some()
    }

    /// Copy of this reference reduced to `{uuid, type, name}`.
    ///
    /// Requests to the explorer service carry stripped references so that
    /// client-side children never leave the process.
    pub fn stripped(&self) -> Self {
        Self {
            uuid: self.uuid.clone(),
            doc_type: self.doc_type.clone(),
            name: self.name.clone(),
            children: None,
        }
    }
}

impl TreeNode for DocRef {
    type Update = DocRefUpdate;

    fn uuid(&self) -> Option<&str> {
        if self.uuid.is_empty() {
            None
        } else {
            Some(&self.uuid)
        }
    }

    fn set_uuid(&mut self, uuid: Option<String>) {
        self.uuid = uuid.unwrap_or_default();
    }

    fn children(&self) -> Option<&[Self]> {
        self.children.as_deref()
    }

    fn children_mut(&mut self) -> Option<&mut Vec<Self>> {
        self.children.as_mut()
    }

    fn apply_update(&mut self, update: &DocRefUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(doc_type) = &update.doc_type {
            self.doc_type = doc_type.clone();
        }
    }
}

/// Shallow patch applied to a [`DocRef`]. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocRefUpdate {
    pub name: Option<CompactString>,
    pub doc_type: Option<CompactString>,
}

impl DocRefUpdate {
    /// Patch that only renames.
    pub fn rename(name: impl Into<CompactString>) -> Self {
        Self {
            name: Some(name.into()),
            doc_type: None,
        }
    }
}

/// How permissions are assigned to copied or moved documents.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum PermissionInheritance {
    /// Keep no permissions from either side.
    #[default]
    None,
    /// Keep the permissions of the source document.
    Source,
    /// Take the permissions of the destination folder.
    Destination,
    /// Union of source and destination permissions.
    Combined,
}

/// Audit information about a single document, from `GET /info/{type}/{uuid}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocRefInfo {
    pub doc_ref: DocRef,
    /// Creation time in epoch milliseconds.
    #[serde(default)]
    pub create_time: Option<i64>,
    /// Last update time in epoch milliseconds.
    #[serde(default)]
    pub update_time: Option<i64>,
    #[serde(default)]
    pub create_user: Option<String>,
    #[serde(default)]
    pub update_user: Option<String>,
    #[serde(default)]
    pub other_info: Option<String>,
}

impl DocRefInfo {
    /// Creation time, if the service reported one.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.create_time
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }

    /// Last update time, if the service reported one.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.update_time
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }
}
