use tracing::info;

use crate::document::{Document, DocumentId};

/// The set of open documents and the active pointers. All mutation goes
/// through the named operations here; nothing else touches the list.
#[derive(Debug, Default)]
pub struct Workspace {
    documents: Vec<Document>,
    active: Option<DocumentId>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn active_id(&self) -> Option<DocumentId> {
        self.active
    }

    pub fn active_document(&self) -> Option<&Document> {
        self.active
            .and_then(|id| self.documents.iter().find(|d| d.id == id))
    }

    fn active_document_mut(&mut self) -> Option<&mut Document> {
        let id = self.active?;
        self.documents.iter_mut().find(|d| d.id == id)
    }

    /// Append a decoded document and make it the active one
    pub fn open(&mut self, document: Document) -> DocumentId {
        let id = document.id;
        info!(file = %document.file_name, tables = document.tables.len(), "opened document");
        self.documents.push(document);
        self.active = Some(id);
        id
    }

    /// Remove a document. If it was active and others remain, the first
    /// remaining document becomes active; closing the last clears the
    /// pointer. Unknown ids are ignored.
    pub fn close(&mut self, id: DocumentId) {
        let Some(idx) = self.documents.iter().position(|d| d.id == id) else {
            return;
        };
        self.documents.remove(idx);
        if self.active == Some(id) {
            self.active = self.documents.first().map(|d| d.id);
        }
    }

    pub fn set_active(&mut self, id: DocumentId) -> bool {
        if self.documents.iter().any(|d| d.id == id) {
            self.active = Some(id);
            true
        } else {
            false
        }
    }

    pub fn set_active_table(&mut self, document_id: DocumentId, table_id: &str) -> bool {
        self.documents
            .iter_mut()
            .find(|d| d.id == document_id)
            .map(|d| d.set_active_table(table_id))
            .unwrap_or(false)
    }

    /// Set the active table of the active document
    pub fn select_table(&mut self, table_id: &str) -> bool {
        self.active_document_mut()
            .map(|d| d.set_active_table(table_id))
            .unwrap_or(false)
    }

    pub fn activate_next(&mut self) {
        self.activate_offset(1);
    }

    pub fn activate_prev(&mut self) {
        self.activate_offset(-1);
    }

    fn activate_offset(&mut self, step: isize) {
        if self.documents.is_empty() {
            return;
        }
        let current = self
            .active
            .and_then(|id| self.documents.iter().position(|d| d.id == id))
            .unwrap_or(0);
        let len = self.documents.len() as isize;
        let next = (current as isize + step).rem_euclid(len) as usize;
        self.active = Some(self.documents[next].id);
    }
}
