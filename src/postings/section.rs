use std::{collections::HashMap, io};

use crate::DocId;

/// One section of a doc: a run of `length` positions of one field.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SectionMeta {
    pub field_id: u8,
    pub section_weight: u16,
    pub length: u32,
}

impl SectionMeta {
    pub fn new(field_id: u8, section_weight: u16, length: u32) -> Self {
        Self {
            field_id,
            section_weight,
            length,
        }
    }
}

/// Per-doc section layout, consulted while iterating positions.
pub trait SectionAttributeReader: Send + Sync {
    /// Sections of `docid` in position order; empty when the doc has none.
    fn read(&self, docid: DocId) -> io::Result<Vec<SectionMeta>>;
}

#[derive(Default)]
pub struct InMemorySectionAttributeReader {
    sections: HashMap<DocId, Vec<SectionMeta>>,
}

impl InMemorySectionAttributeReader {
    pub fn add_doc(&mut self, docid: DocId, sections: Vec<SectionMeta>) {
        self.sections.insert(docid, sections);
    }
}

impl SectionAttributeReader for InMemorySectionAttributeReader {
    fn read(&self, docid: DocId) -> io::Result<Vec<SectionMeta>> {
        Ok(self.sections.get(&docid).cloned().unwrap_or_default())
    }
}
