//! Request bodies sent to the explorer service.
//!
//! Every document reference leaving the client is stripped to
//! `{uuid, type, name}`.

use serde::{Deserialize, Serialize};

use doctree_core::{DocRef, PermissionInheritance};

/// Body of `PUT /rename`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    pub doc_ref: DocRef,
    pub name: String,
}

impl RenameRequest {
    pub fn new(doc_ref: &DocRef, name: impl Into<String>) -> Self {
        Self {
            doc_ref: doc_ref.stripped(),
            name: name.into(),
        }
    }
}

/// Body of `POST /copy` and `PUT /move`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRequest {
    pub doc_refs: Vec<DocRef>,
    pub destination_folder_ref: DocRef,
    pub permission_inheritance: PermissionInheritance,
}

impl BulkRequest {
    pub fn new(
        doc_refs: &[DocRef],
        destination: &DocRef,
        permission_inheritance: PermissionInheritance,
    ) -> Self {
        Self {
            doc_refs: stripped_refs(doc_refs),
            destination_folder_ref: destination.stripped(),
            permission_inheritance,
        }
    }
}

/// Strip a list of references, e.g. for the body of `DELETE /delete`.
pub fn stripped_refs(doc_refs: &[DocRef]) -> Vec<DocRef> {
    doc_refs.iter().map(DocRef::stripped).collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn folder_with_child() -> DocRef {
        DocRef::new_folder("f1", "Feeds").with_child(DocRef::new_document("d1", "Feed", "RAW"))
    }

    #[test]
    fn test_rename_body() {
        let body = RenameRequest::new(&folder_with_child(), "Inputs");
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "docRef": {"uuid": "f1", "type": "Folder", "name": "Feeds"},
                "name": "Inputs"
            })
        );
    }

    #[test]
    fn test_bulk_body() {
        let body = BulkRequest::new(
            &[folder_with_child()],
            &DocRef::new_folder("dest", "Archive"),
            PermissionInheritance::Combined,
        );
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "docRefs": [{"uuid": "f1", "type": "Folder", "name": "Feeds"}],
                "destinationFolderRef": {"uuid": "dest", "type": "Folder", "name": "Archive"},
                "permissionInheritance": "COMBINED"
            })
        );
    }
}
