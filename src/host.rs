//! Host seam: where effects meet a concrete row structure
use crate::diff_engine::apply_patches;
use crate::errors::TableError;
use crate::table::{Change, Effect, Notification, SortSync};
use crate::types::PatchOp;
use log::trace;
use std::collections::BTreeSet;

/// Applies table effects to a rendered structure (a DOM, a terminal buffer, ...).
pub trait TableHost {
    fn apply(&mut self, effect: &Effect) -> Result<(), TableError>;

    /// Called once after the last effect of a transition.
    fn flush(&mut self) -> Result<(), TableError> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRow {
    pub html: String,
    pub just_updated: bool,
}

/// In-memory host that keeps body rows as markup strings.
///
/// Patched rows must end up identical to a full render of the same
/// datasource, which makes this host the reference when checking
/// incremental output.
#[derive(Debug, Clone, Default)]
pub struct MarkupHost {
    html: String,
    rows: Vec<HostRow>,
    pending: Vec<PatchOp<HostRow>>,
    checked: BTreeSet<usize>,
    all_checked: Option<bool>,
    sort: Option<SortSync>,
    no_data: Option<String>,
    changes: Vec<Change>,
    notifications: Vec<Notification>,
}

impl MarkupHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Markup of the last full render.
    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn rows(&self) -> &[HostRow] {
        &self.rows
    }

    pub fn row_html(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.html.as_str()).collect()
    }

    pub fn just_updated(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.just_updated)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn checked(&self) -> &BTreeSet<usize> {
        &self.checked
    }

    pub fn all_checked(&self) -> Option<bool> {
        self.all_checked
    }

    pub fn sort(&self) -> Option<&SortSync> {
        self.sort.as_ref()
    }

    pub fn no_data(&self) -> Option<&str> {
        self.no_data.as_deref()
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    fn flush_pending(&mut self) {
        if !self.pending.is_empty() {
            trace!("MarkupHost: applying {} row patches", self.pending.len());
            apply_patches(&mut self.rows, self.pending.drain(..));
        }
    }
}

impl TableHost for MarkupHost {
    fn apply(&mut self, effect: &Effect) -> Result<(), TableError> {
        if let Effect::Patch(op) = effect {
            self.pending.push(op.clone().map(|row| HostRow {
                html: row.html,
                just_updated: true,
            }));
            return Ok(());
        }
        self.flush_pending();

        match effect {
            Effect::RenderAll { html, rows, no_data } => {
                self.html = html.clone();
                self.rows = rows
                    .iter()
                    .map(|row| HostRow {
                        html: row.html.clone(),
                        just_updated: false,
                    })
                    .collect();
                self.no_data = no_data.clone();
            }
            Effect::ClearJustUpdated => {
                for row in &mut self.rows {
                    row.just_updated = false;
                }
            }
            Effect::SyncSelection(sync) => {
                self.checked = sync.checked.clone();
                self.all_checked = sync.all_checked;
            }
            Effect::SyncSort(sync) => self.sort = Some(sync.clone()),
            Effect::SyncNoData { html } => self.no_data = html.clone(),
            Effect::Changed(change) => self.changes.push(change.clone()),
            Effect::Fire(notification) => self.notifications.push(*notification),
            Effect::Patch(_) => {}
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TableError> {
        self.flush_pending();
        Ok(())
    }
}
