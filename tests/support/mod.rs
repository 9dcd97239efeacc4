#![allow(dead_code)]

use collection_reconciler::{EditBatch, IndexPath, ListRenderer, RenderError};

/// A list double that checks pre-update positions against its row counts and
/// records every batch and reload it receives.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub attached: bool,
    pub visible_rows: bool,
    pub section_rows: Vec<usize>,
    pub applied: Vec<EditBatch>,
    pub reloads: usize,
}

impl RecordingRenderer {
    pub fn attached(section_rows: &[usize]) -> Self {
        RecordingRenderer {
            attached: true,
            visible_rows: true,
            section_rows: section_rows.to_vec(),
            ..Self::default()
        }
    }

    pub fn detached(section_rows: &[usize]) -> Self {
        RecordingRenderer {
            attached: false,
            ..Self::attached(section_rows)
        }
    }

    fn check_section(&self, section: usize) -> Result<(), RenderError> {
        if section < self.section_rows.len() {
            Ok(())
        } else {
            Err(RenderError::SectionOutOfRange { section })
        }
    }

    fn check_existing(&self, path: &IndexPath) -> Result<(), RenderError> {
        match self.section_rows.get(path.section) {
            Some(&rows) if path.row < rows => Ok(()),
            _ => Err(RenderError::IndexOutOfRange { path: *path }),
        }
    }
}

impl ListRenderer for RecordingRenderer {
    fn is_attached(&self) -> bool {
        self.attached
    }

    fn has_visible_rows(&self) -> bool {
        self.visible_rows
    }

    fn apply_batch(&mut self, batch: &EditBatch) -> Result<(), RenderError> {
        for &section in &batch.deleted_sections {
            self.check_section(section)?;
        }
        for path in batch.deleted_items.iter().chain(&batch.reloaded_items) {
            self.check_existing(path)?;
        }
        for item_move in &batch.moves {
            self.check_existing(&item_move.from)?;
        }
        self.applied.push(batch.clone());
        Ok(())
    }

    fn reload_all(&mut self) {
        self.reloads += 1;
    }
}

pub fn p(section: usize, row: usize) -> IndexPath {
    IndexPath::new(section, row)
}
