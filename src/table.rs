//! The table control as an explicit state machine.
//!
//! [`LightTable::handle`] takes one [`TableEvent`] and returns the [`Effect`]s
//! a host must perform to bring its markup up to date. Datasource changes go
//! through [`DiffEngine`] and come out as row patches. Fields changes, the
//! first render, and non-incremental tables re-render everything.
use crate::config::TableOptions;
use crate::diff_engine::DiffEngine;
use crate::errors::TableError;
use crate::field::{Field, FieldSpec};
use crate::host::TableHost;
use crate::html_generator::{sort_icon_class, HtmlTemplates, RenderedRow, TemplateEngine};
use crate::identity::{RowIdentity, ValueIdentity};
use crate::types::{PatchOp, SelectMode, Selection, SortOrder, SortState};
use crate::view::{compute_headers, compute_row_data, kebab_case, ControlHelper, PropertyData, RowData, ViewData};
use log::{debug, warn};
use serde_json::Value;
use std::collections::BTreeSet;

/// Events fired by the table for its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notification {
    /// The user changed the selection.
    Select,
    /// The user clicked a sort label.
    Sort,
}

/// A change to an observable property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Fields,
    Datasource { previous_len: usize, current_len: usize },
    SelectedIndex { old: Selection, new: Selection },
    Sort { old: SortState, new: SortState },
    NoDataHtml,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSync {
    /// Rows whose selection input is checked; every other input is cleared.
    pub checked: BTreeSet<usize>,
    /// State of the check-all box, in multiple mode only.
    pub all_checked: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSync {
    pub order_by: Option<String>,
    pub order: Option<SortOrder>,
    /// Class of the sorted header cell; every other sort label shows the unsorted icon.
    pub head_class: Option<String>,
    pub icon_class: &'static str,
}

/// Something the host has to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Replace the whole control markup. `rows` and `no_data` repeat the body
    /// rows and placeholder contained in `html`.
    RenderAll {
        html: String,
        rows: Vec<RenderedRow>,
        no_data: Option<String>,
    },
    /// Drop the just-updated highlight left by the previous patch.
    ClearJustUpdated,
    /// Patch one body row; inserted and replaced rows get the just-updated
    /// highlight. Removal indices refer to the rows as they were before the
    /// patch, so a run of removals must be applied highest index first.
    Patch(PatchOp<RenderedRow>),
    SyncSelection(SelectionSync),
    SyncSort(SortSync),
    /// Show the placeholder after the table, or remove it when `None`.
    SyncNoData { html: Option<String> },
    Changed(Change),
    Fire(Notification),
}

/// Several properties set at once. Fields not set are left alone.
pub struct Properties<T> {
    pub fields: Option<Vec<Field<T>>>,
    pub datasource: Option<Vec<T>>,
    pub selected_index: Option<Selection>,
    pub sort: Option<SortState>,
    pub no_data_html: Option<String>,
}

impl<T> Default for Properties<T> {
    fn default() -> Self {
        Properties {
            fields: None,
            datasource: None,
            selected_index: None,
            sort: None,
            no_data_html: None,
        }
    }
}

impl<T> Properties<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(mut self, fields: Vec<Field<T>>) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn datasource(mut self, datasource: Vec<T>) -> Self {
        self.datasource = Some(datasource);
        self
    }

    pub fn selected_index(mut self, selection: Selection) -> Self {
        self.selected_index = Some(selection);
        self
    }

    pub fn sort(mut self, sort: SortState) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn no_data_html(mut self, html: impl Into<String>) -> Self {
        self.no_data_html = Some(html.into());
        self
    }
}

struct PreparedPatch {
    ops: Vec<PatchOp<RenderedRow>>,
    no_data: Option<String>,
}

pub enum TableEvent<T> {
    /// First render, or a forced full re-render.
    Render,
    SetProperties(Properties<T>),
    /// The check-all box changed.
    SelectAll { checked: bool },
    /// The selection input of row `index` changed.
    SelectRow { index: usize, checked: bool },
    /// A sort label was clicked in header column `column`, counting the
    /// selection column when there is one.
    SortClicked { column: usize },
    /// The host finished applying the last incremental patch.
    PatchApplied,
}

pub struct LightTable<T, E = HtmlTemplates, I = ValueIdentity> {
    fields: Vec<Field<T>>,
    datasource: Vec<T>,
    select_mode: SelectMode,
    selection: Selection,
    sort: SortState,
    no_data_html: String,
    incremental: bool,
    helper: ControlHelper,
    engine: E,
    identity: I,
    rendered: bool,
    patch_in_flight: bool,
}

impl<T: PartialEq, E: TemplateEngine> LightTable<T, E, ValueIdentity> {
    pub fn new(options: TableOptions, fields: Vec<Field<T>>, engine: E) -> Result<Self, TableError> {
        Self::with_identity(options, fields, engine, ValueIdentity)
    }
}

impl<T, E: TemplateEngine, I: RowIdentity<T>> LightTable<T, E, I> {
    pub fn with_identity(
        options: TableOptions,
        fields: Vec<Field<T>>,
        engine: E,
        identity: I,
    ) -> Result<Self, TableError> {
        let sort = options.sort();
        if let Some(order_by) = &sort.order_by {
            if !fields.iter().any(|field| field.field == *order_by) {
                return Err(TableError::UnknownField(order_by.clone()));
            }
        }
        let selection = options.selected_index.clone().into_selection(options.select_mode)?;
        let helper = ControlHelper::new(options.id.clone(), options.class_prefix());

        Ok(LightTable {
            fields,
            datasource: Vec::new(),
            select_mode: options.select_mode,
            selection,
            sort,
            no_data_html: options.no_data_html,
            incremental: options.incremental,
            helper,
            engine,
            identity,
            rendered: false,
            patch_in_flight: false,
        })
    }

    pub fn fields(&self) -> &[Field<T>] {
        &self.fields
    }

    pub fn datasource(&self) -> &[T] {
        &self.datasource
    }

    pub fn select_mode(&self) -> SelectMode {
        self.select_mode
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn helper(&self) -> &ControlHelper {
        &self.helper
    }

    pub fn is_rendered(&self) -> bool {
        self.rendered
    }

    /// An incremental patch was emitted and not yet acknowledged.
    pub fn patch_in_flight(&self) -> bool {
        self.patch_in_flight
    }

    pub fn handle(&mut self, event: TableEvent<T>) -> Result<Vec<Effect>, TableError> {
        match event {
            TableEvent::Render => {
                let mut effects = Vec::new();
                self.render_all(&mut effects)?;
                Ok(effects)
            }
            TableEvent::SetProperties(props) => self.set_properties(props),
            TableEvent::SelectAll { checked } => Ok(self.select_all(checked)),
            TableEvent::SelectRow { index, checked } => self.select_row(index, checked),
            TableEvent::SortClicked { column } => self.sort_clicked(column),
            TableEvent::PatchApplied => {
                self.patch_in_flight = false;
                Ok(Vec::new())
            }
        }
    }

    /// Handle `event` and apply its effects to `host`, acknowledging any patch.
    pub fn dispatch<H: TableHost + ?Sized>(
        &mut self,
        event: TableEvent<T>,
        host: &mut H,
    ) -> Result<(), TableError> {
        let effects = self.handle(event)?;
        for effect in &effects {
            host.apply(effect)?;
        }
        host.flush()?;
        self.patch_in_flight = false;
        Ok(())
    }

    /// Convenience for `SetProperties` with only a new datasource.
    pub fn set_datasource(&mut self, datasource: Vec<T>) -> Result<Vec<Effect>, TableError> {
        self.handle(TableEvent::SetProperties(Properties::new().datasource(datasource)))
    }

    fn set_properties(&mut self, props: Properties<T>) -> Result<Vec<Effect>, TableError> {
        let Properties {
            fields,
            datasource,
            selected_index,
            sort,
            no_data_html,
        } = props;

        if self.patch_in_flight && (fields.is_some() || datasource.is_some()) {
            return Err(TableError::PatchInFlight);
        }
        if let Some(selection) = &selected_index {
            if selection.mode() != self.select_mode {
                return Err(TableError::SelectionModeMismatch {
                    mode: self.select_mode.to_string(),
                    selection: selection.to_string(),
                });
            }
        }
        if let Some(order_by) = sort.as_ref().and_then(|sort| sort.order_by.as_ref()) {
            let known = fields
                .as_deref()
                .unwrap_or(self.fields.as_slice())
                .iter()
                .any(|field| field.field == *order_by);
            if !known {
                return Err(TableError::UnknownField(order_by.clone()));
            }
        }

        let full_render = self.rendered
            && (fields.is_some() || (datasource.is_some() && !self.incremental));

        // Render first; nothing is committed if the engine fails.
        let no_data_source = no_data_html.as_deref().unwrap_or(self.no_data_html.as_str());
        let markup = if full_render {
            Some(self.render_markup(
                fields.as_deref().unwrap_or(self.fields.as_slice()),
                datasource.as_deref().unwrap_or(self.datasource.as_slice()),
                no_data_source,
            )?)
        } else {
            None
        };
        let patch = match &datasource {
            Some(current) if self.rendered && !full_render => {
                Some(self.prepare_patch(current, no_data_source)?)
            }
            _ => None,
        };

        let mut effects = Vec::new();
        if let Some(fields) = fields {
            self.fields = fields;
            effects.push(Effect::Changed(Change::Fields));
        }
        if let Some(html) = no_data_html {
            self.no_data_html = html;
            effects.push(Effect::Changed(Change::NoDataHtml));
        }

        if let Some(current) = datasource {
            if let Some(patch) = patch {
                self.commit_patch(current, patch, &mut effects);
            } else {
                let previous = std::mem::replace(&mut self.datasource, current);
                effects.push(Effect::Changed(Change::Datasource {
                    previous_len: previous.len(),
                    current_len: self.datasource.len(),
                }));
                // Before the first render, selected indices refer to whatever
                // datasource is current when rendering starts.
                if self.rendered {
                    let remapped = self.remapped_selection(&previous);
                    self.update_selection(remapped, &mut effects);
                }
            }
        }

        let live = self.rendered && !full_render;
        if let Some(mut selection) = selected_index {
            // Set together with a datasource, this overrides the remapped selection.
            if self.rendered {
                self.drop_out_of_range(&mut selection);
            }
            self.update_selection(selection, &mut effects);
            if live {
                self.push_selection_sync(&mut effects);
            }
        }
        if let Some(sort) = sort {
            self.update_sort(sort, &mut effects);
            if live {
                effects.push(Effect::SyncSort(self.sort_sync()));
            }
        }

        if let Some(markup) = markup {
            self.finish_render(markup, &mut effects);
        }
        Ok(effects)
    }

    /// Plan and render an incremental datasource transition without touching state.
    fn prepare_patch(&self, current: &[T], no_data_html: &str) -> Result<PreparedPatch, TableError> {
        let props = self.property_data(&self.fields, no_data_html, current.len());
        let engine = DiffEngine::with_identity(&self.datasource, current, &self.identity);
        let (direction, ops) = engine.reconcile();
        debug!(
            "LightTable '{}': datasource {} -> {} rows via {:?}",
            self.helper.id(),
            self.datasource.len(),
            current.len(),
            direction
        );
        let ops = ops
            .into_iter()
            .map(|op| op.try_map(|item| self.render_row(item, &props)))
            .collect::<Result<Vec<_>, _>>()?;
        let no_data = if current.is_empty() {
            Some(self.engine.render_no_data(&props)?)
        } else {
            None
        };
        Ok(PreparedPatch { ops, no_data })
    }

    fn commit_patch(&mut self, current: Vec<T>, patch: PreparedPatch, effects: &mut Vec<Effect>) {
        let previous = std::mem::replace(&mut self.datasource, current);
        effects.push(Effect::Changed(Change::Datasource {
            previous_len: previous.len(),
            current_len: self.datasource.len(),
        }));
        effects.push(Effect::ClearJustUpdated);
        self.patch_in_flight = !patch.ops.is_empty();
        effects.extend(patch.ops.into_iter().map(Effect::Patch));

        let remapped = self.remapped_selection(&previous);
        self.update_selection(remapped, effects);
        self.push_selection_sync(effects);
        effects.push(Effect::SyncNoData { html: patch.no_data });
    }

    fn drop_out_of_range(&self, selection: &mut Selection) {
        let dropped = selection.retain_below(self.datasource.len());
        if !dropped.is_empty() {
            warn!("LightTable: selected rows {:?} out of range, dropped", dropped);
        }
    }

    fn render_all(&mut self, effects: &mut Vec<Effect>) -> Result<(), TableError> {
        let markup = self.render_markup(&self.fields, &self.datasource, &self.no_data_html)?;
        self.finish_render(markup, effects);
        Ok(())
    }

    /// The `RenderAll` effect for the given columns and rows.
    fn render_markup(&self, fields: &[Field<T>], datasource: &[T], no_data_html: &str) -> Result<Effect, TableError> {
        let rows: Vec<RowData> = datasource
            .iter()
            .map(|item| compute_row_data(fields, item, &self.helper))
            .collect();
        let view = ViewData {
            props: self.property_data(fields, no_data_html, datasource.len()),
            rows,
        };
        let html = self.engine.render_main(&view)?;
        let rows = view
            .rows
            .iter()
            .map(|row| self.engine.render_rendered_row(row, &view.props))
            .collect::<Result<Vec<_>, _>>()?;
        let no_data = if view.rows.is_empty() {
            Some(self.engine.render_no_data(&view.props)?)
        } else {
            None
        };
        Ok(Effect::RenderAll { html, rows, no_data })
    }

    /// Commit a full render. Whatever patch was in flight is superseded.
    fn finish_render(&mut self, markup: Effect, effects: &mut Vec<Effect>) {
        debug!(
            "LightTable '{}': full render of {} rows",
            self.helper.id(),
            self.datasource.len()
        );
        let mut selection = self.selection.clone();
        self.drop_out_of_range(&mut selection);
        self.update_selection(selection, effects);

        effects.push(markup);
        effects.push(Effect::SyncSort(self.sort_sync()));
        self.push_selection_sync(effects);
        self.rendered = true;
        self.patch_in_flight = false;
    }

    fn render_row(&self, item: &T, props: &PropertyData) -> Result<RenderedRow, TableError> {
        let row = compute_row_data(&self.fields, item, &self.helper);
        self.engine.render_rendered_row(&row, props)
    }

    fn property_data(&self, fields: &[Field<T>], no_data_html: &str, row_count: usize) -> PropertyData {
        PropertyData {
            helper: self.helper.clone(),
            select_mode: self.select_mode,
            no_data_html: no_data_html.to_string(),
            headers: compute_headers(fields, &self.helper),
            row_count,
        }
    }

    fn remapped_selection(&self, previous: &[T]) -> Selection {
        if self.selection.is_empty() {
            return Selection::empty(self.select_mode);
        }
        let engine = DiffEngine::with_identity(previous, &self.datasource, &self.identity);
        Selection::from_indices(self.select_mode, engine.remap(&self.selection.indices()))
    }

    fn update_selection(&mut self, selection: Selection, effects: &mut Vec<Effect>) {
        if selection != self.selection {
            let old = std::mem::replace(&mut self.selection, selection);
            effects.push(Effect::Changed(Change::SelectedIndex {
                old,
                new: self.selection.clone(),
            }));
        }
    }

    fn update_sort(&mut self, sort: SortState, effects: &mut Vec<Effect>) {
        if sort != self.sort {
            let old = std::mem::replace(&mut self.sort, sort);
            effects.push(Effect::Changed(Change::Sort {
                old,
                new: self.sort.clone(),
            }));
        }
    }

    fn push_selection_sync(&self, effects: &mut Vec<Effect>) {
        if self.select_mode == SelectMode::None {
            return;
        }
        let checked = self.selection.indices();
        let all_checked = (self.select_mode == SelectMode::Multiple)
            .then(|| !self.datasource.is_empty() && checked.len() == self.datasource.len());
        effects.push(Effect::SyncSelection(SelectionSync { checked, all_checked }));
    }

    fn sort_sync(&self) -> SortSync {
        let order = self.sort.effective_order();
        SortSync {
            order_by: self.sort.order_by.clone(),
            order,
            head_class: self
                .sort
                .order_by
                .as_ref()
                .map(|field| self.helper.primary_class(&format!("head-cell-for-{}", kebab_case(field)))),
            icon_class: sort_icon_class(order),
        }
    }

    fn select_all(&mut self, checked: bool) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.select_mode != SelectMode::Multiple {
            debug!("LightTable: select-all ignored in {} mode", self.select_mode);
            return effects;
        }
        let selection = if checked {
            Selection::Multiple((0..self.datasource.len()).collect())
        } else {
            Selection::Multiple(BTreeSet::new())
        };
        self.update_selection(selection, &mut effects);
        self.push_selection_sync(&mut effects);
        effects.push(Effect::Fire(Notification::Select));
        effects
    }

    fn select_row(&mut self, index: usize, checked: bool) -> Result<Vec<Effect>, TableError> {
        if index >= self.datasource.len() {
            return Err(TableError::RowOutOfRange {
                index,
                len: self.datasource.len(),
            });
        }
        let mut effects = Vec::new();
        let selection = match &self.selection {
            Selection::None => {
                debug!("LightTable: row selection ignored in none mode");
                return Ok(effects);
            }
            Selection::Single(current) => {
                if checked {
                    Selection::Single(Some(index))
                } else if *current == Some(index) {
                    Selection::Single(None)
                } else {
                    Selection::Single(*current)
                }
            }
            Selection::Multiple(indices) => {
                let mut indices = indices.clone();
                if checked {
                    indices.insert(index);
                } else {
                    indices.remove(&index);
                }
                Selection::Multiple(indices)
            }
        };
        self.update_selection(selection, &mut effects);
        self.push_selection_sync(&mut effects);
        effects.push(Effect::Fire(Notification::Select));
        Ok(effects)
    }

    fn sort_clicked(&mut self, column: usize) -> Result<Vec<Effect>, TableError> {
        let offset = usize::from(self.select_mode != SelectMode::None);
        let field = column
            .checked_sub(offset)
            .and_then(|index| self.fields.get(index))
            .ok_or(TableError::ColumnOutOfRange {
                column,
                len: self.fields.len() + offset,
            })?;

        let mut effects = Vec::new();
        if !field.sortable {
            debug!("LightTable: field '{}' is not sortable", field.field);
            return Ok(effects);
        }
        let sort = self.sort.toggled(&field.field);
        self.update_sort(sort, &mut effects);
        effects.push(Effect::SyncSort(self.sort_sync()));
        effects.push(Effect::Fire(Notification::Sort));
        Ok(effects)
    }
}

/// Full markup for JSON `rows`, with options and field specs given as JSON.
pub fn render_json_table(options: Value, fields: Value, rows: Vec<Value>) -> Result<String, TableError> {
    let options: TableOptions = serde_json::from_value(options)?;
    let specs: Vec<FieldSpec> = serde_json::from_value(fields)?;
    let fields = specs.into_iter().map(FieldSpec::into_field).collect();

    let mut table = LightTable::new(options, fields, HtmlTemplates)?;
    table.set_datasource(rows)?;
    table
        .handle(TableEvent::Render)?
        .into_iter()
        .find_map(|effect| match effect {
            Effect::RenderAll { html, .. } => Some(html),
            _ => None,
        })
        .ok_or_else(|| TableError::TemplateError {
            template: "main".into(),
            details: "render produced no markup".into(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{KeyIdentity, PointerIdentity};
    use std::cell::Cell;
    use std::rc::Rc;

    fn fields() -> Vec<Field<&'static str>> {
        vec![
            Field::new("name", "Name", |row: &&str| row.to_string()).sortable(true),
            Field::new("size", "Size", |row: &&str| row.len().to_string()),
        ]
    }

    fn table(mode: SelectMode) -> LightTable<&'static str> {
        let options = TableOptions {
            id: "t".into(),
            ..TableOptions::default()
        }
        .select_mode(mode);
        LightTable::new(options, fields(), HtmlTemplates).unwrap()
    }

    fn patches(effects: &[Effect]) -> Vec<PatchOp<String>> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Patch(op) => Some(op.clone().map(|row| row.html)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn properties_before_render_only_emit_changes() {
        let mut table = table(SelectMode::Multiple);
        let effects = table.set_datasource(vec!["a", "b"]).unwrap();
        assert_eq!(
            effects,
            vec![Effect::Changed(Change::Datasource { previous_len: 0, current_len: 2 })]
        );
        assert!(!table.is_rendered());
    }

    #[test]
    fn render_emits_full_markup_then_sync() {
        let mut table = table(SelectMode::Multiple);
        table.set_datasource(vec!["a"]).unwrap();
        let effects = table.handle(TableEvent::Render).unwrap();
        assert!(matches!(&effects[0], Effect::RenderAll { rows, no_data: None, .. } if rows.len() == 1));
        assert!(matches!(&effects[1], Effect::SyncSort(sync) if sync.order_by.is_none()));
        assert_eq!(
            effects[2],
            Effect::SyncSelection(SelectionSync { checked: BTreeSet::new(), all_checked: Some(false) })
        );
    }

    #[test]
    fn initial_selection_applies_to_first_rendered_rows() {
        let options = TableOptions {
            selected_index: crate::config::SelectedIndex::Many(vec![1, 5]),
            ..TableOptions::default()
        }
        .select_mode(SelectMode::Multiple);
        let mut table = LightTable::new(options, fields(), HtmlTemplates).unwrap();
        table.set_datasource(vec!["a", "b"]).unwrap();
        assert_eq!(table.selection(), &Selection::Multiple(BTreeSet::from([1, 5])));

        let effects = table.handle(TableEvent::Render).unwrap();
        assert_eq!(table.selection(), &Selection::Multiple(BTreeSet::from([1])));
        assert!(matches!(&effects[0], Effect::Changed(Change::SelectedIndex { .. })));
        assert!(effects.contains(&Effect::SyncSelection(SelectionSync {
            checked: BTreeSet::from([1]),
            all_checked: Some(false),
        })));
    }

    #[test]
    fn append_is_patched_and_must_be_acknowledged() {
        let mut table = table(SelectMode::None);
        table.set_datasource(vec!["a"]).unwrap();
        table.handle(TableEvent::Render).unwrap();

        let effects = table.set_datasource(vec!["a", "bb"]).unwrap();
        let ops = patches(&effects);
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], PatchOp::InsertAtTail(html) if html.contains(">bb<")));
        assert!(effects.contains(&Effect::SyncNoData { html: None }));
        assert!(table.patch_in_flight());

        assert!(matches!(table.set_datasource(vec!["x"]), Err(TableError::PatchInFlight)));
        assert_eq!(table.datasource(), ["a", "bb"]);

        table.handle(TableEvent::PatchApplied).unwrap();
        assert!(table.set_datasource(vec!["x"]).is_ok());
    }

    #[test]
    fn unchanged_datasource_leaves_nothing_in_flight() {
        let mut table = table(SelectMode::None);
        table.set_datasource(vec!["a"]).unwrap();
        table.handle(TableEvent::Render).unwrap();
        let effects = table.set_datasource(vec!["a"]).unwrap();
        assert!(patches(&effects).is_empty());
        assert!(!table.patch_in_flight());
    }

    #[test]
    fn selection_follows_prepended_rows() {
        let mut table = table(SelectMode::Multiple);
        table.set_datasource(vec!["b", "c"]).unwrap();
        table.handle(TableEvent::Render).unwrap();
        table.handle(TableEvent::SelectRow { index: 1, checked: true }).unwrap();

        let effects = table.set_datasource(vec!["a", "b", "c"]).unwrap();
        assert!(matches!(&patches(&effects)[..], [PatchOp::InsertAtHead(_)]));
        assert_eq!(table.selection(), &Selection::Multiple(BTreeSet::from([2])));
        assert!(effects.contains(&Effect::Changed(Change::SelectedIndex {
            old: Selection::Multiple(BTreeSet::from([1])),
            new: Selection::Multiple(BTreeSet::from([2])),
        })));
    }

    #[test]
    fn explicit_selection_overrides_remap() {
        let mut table = table(SelectMode::Single);
        table.set_datasource(vec!["a", "b"]).unwrap();
        table.handle(TableEvent::Render).unwrap();
        table.handle(TableEvent::SelectRow { index: 0, checked: true }).unwrap();

        let props = Properties::new()
            .datasource(vec!["a", "b", "c"])
            .selected_index(Selection::Single(Some(2)));
        let effects = table.handle(TableEvent::SetProperties(props)).unwrap();
        assert_eq!(table.selection(), &Selection::Single(Some(2)));
        assert!(matches!(effects.last(), Some(Effect::SyncSelection(sync)) if sync.checked == BTreeSet::from([2])));
    }

    #[test]
    fn selection_of_wrong_mode_is_rejected() {
        let mut table = table(SelectMode::Single);
        let props = Properties::new().selected_index(Selection::Multiple(BTreeSet::new()));
        assert!(matches!(
            table.handle(TableEvent::SetProperties(props)),
            Err(TableError::SelectionModeMismatch { .. })
        ));
    }

    #[test]
    fn select_all_checks_every_row() {
        let mut table = table(SelectMode::Multiple);
        table.set_datasource(vec!["a", "b"]).unwrap();
        table.handle(TableEvent::Render).unwrap();
        let effects = table.handle(TableEvent::SelectAll { checked: true }).unwrap();
        assert_eq!(table.selection(), &Selection::Multiple(BTreeSet::from([0, 1])));
        assert!(effects.contains(&Effect::SyncSelection(SelectionSync {
            checked: BTreeSet::from([0, 1]),
            all_checked: Some(true),
        })));
        assert_eq!(effects.last(), Some(&Effect::Fire(Notification::Select)));
    }

    #[test]
    fn sort_click_toggles_and_fires() {
        let mut table = table(SelectMode::Multiple);
        table.handle(TableEvent::Render).unwrap();

        // Column 0 is the selection column.
        assert!(matches!(
            table.handle(TableEvent::SortClicked { column: 0 }),
            Err(TableError::ColumnOutOfRange { column: 0, len: 3 })
        ));

        let effects = table.handle(TableEvent::SortClicked { column: 1 }).unwrap();
        assert_eq!(table.sort(), &SortState::by("name", SortOrder::Asc));
        assert!(matches!(&effects[1], Effect::SyncSort(sync)
            if sync.head_class.as_deref() == Some("ui-light-table-head-cell-for-name")
                && sync.icon_class == "ui-icon-sort-asc"));
        assert_eq!(effects.last(), Some(&Effect::Fire(Notification::Sort)));

        table.handle(TableEvent::SortClicked { column: 1 }).unwrap();
        assert_eq!(table.sort(), &SortState::by("name", SortOrder::Desc));

        // Not sortable.
        assert!(table.handle(TableEvent::SortClicked { column: 2 }).unwrap().is_empty());
    }

    #[test]
    fn sorting_by_unknown_field_is_rejected() {
        let mut table = table(SelectMode::None);
        let props = Properties::new().sort(SortState::by("missing", SortOrder::Asc));
        assert!(matches!(
            table.handle(TableEvent::SetProperties(props)),
            Err(TableError::UnknownField(name)) if name == "missing"
        ));
    }

    #[test]
    fn fields_change_rerenders() {
        let mut table = table(SelectMode::None);
        table.set_datasource(vec!["a"]).unwrap();
        table.handle(TableEvent::Render).unwrap();
        let props = Properties::new().fields(fields()[..1].to_vec());
        let effects = table.handle(TableEvent::SetProperties(props)).unwrap();
        assert_eq!(effects[0], Effect::Changed(Change::Fields));
        assert!(matches!(&effects[1], Effect::RenderAll { .. }));
    }

    #[test]
    fn non_incremental_tables_rerender_on_datasource_change() {
        let options = TableOptions::default().incremental(false);
        let mut table = LightTable::new(options, fields(), HtmlTemplates).unwrap();
        table.handle(TableEvent::Render).unwrap();
        let effects = table.set_datasource(vec!["a"]).unwrap();
        assert!(patches(&effects).is_empty());
        assert!(effects.iter().any(|effect| matches!(effect, Effect::RenderAll { .. })));
        assert!(!table.patch_in_flight());
    }

    #[test]
    fn emptied_table_shows_placeholder() {
        let mut table = table(SelectMode::None);
        table.set_datasource(vec!["a"]).unwrap();
        table.handle(TableEvent::Render).unwrap();
        let effects = table.set_datasource(Vec::new()).unwrap();
        assert!(effects.contains(&Effect::SyncNoData {
            html: Some(r#"<div id="ctrl-t-no-data" class="ui-light-table-no-data">没有内容</div>"#.into()),
        }));
    }

    #[test]
    fn full_render_supersedes_patch_in_flight() {
        let mut table = table(SelectMode::None);
        table.set_datasource(vec!["a"]).unwrap();
        table.handle(TableEvent::Render).unwrap();
        table.set_datasource(vec!["a", "b"]).unwrap();
        assert!(table.patch_in_flight());

        table.handle(TableEvent::Render).unwrap();
        assert!(!table.patch_in_flight());
        assert!(table.set_datasource(vec!["c"]).is_ok());
    }

    /// Delegates to `HtmlTemplates` but can be told to fail the main template.
    struct SwitchableEngine {
        fail_main: Rc<Cell<bool>>,
    }

    impl TemplateEngine for SwitchableEngine {
        fn render_main(&self, view: &ViewData) -> Result<String, TableError> {
            if self.fail_main.get() {
                return Err(TableError::TemplateError {
                    template: "main".into(),
                    details: "unavailable".into(),
                });
            }
            HtmlTemplates.render_main(view)
        }

        fn render_row(&self, row: &RowData, props: &PropertyData) -> Result<String, TableError> {
            HtmlTemplates.render_row(row, props)
        }

        fn render_no_data(&self, props: &PropertyData) -> Result<String, TableError> {
            HtmlTemplates.render_no_data(props)
        }
    }

    #[test]
    fn failed_full_render_commits_nothing() {
        let fail_main = Rc::new(Cell::new(false));
        let engine = SwitchableEngine { fail_main: fail_main.clone() };
        let mut table = LightTable::new(TableOptions::default(), fields(), engine).unwrap();
        table.set_datasource(vec!["a"]).unwrap();
        table.handle(TableEvent::Render).unwrap();

        fail_main.set(true);
        let props = Properties::new()
            .fields(fields()[..1].to_vec())
            .datasource(vec!["b"])
            .no_data_html("none");
        assert!(matches!(
            table.handle(TableEvent::SetProperties(props)),
            Err(TableError::TemplateError { .. })
        ));
        assert_eq!(table.fields().len(), 2);
        assert_eq!(table.datasource(), ["a"]);

        fail_main.set(false);
        let effects = table.set_datasource(vec!["a", "b"]).unwrap();
        assert_eq!(patches(&effects).len(), 1);
    }

    #[test]
    fn pointer_identity_replaces_equal_but_distinct_rows() {
        let fields = vec![Field::new("name", "Name", |row: &Rc<String>| row.to_string())];
        let options = TableOptions::default().select_mode(SelectMode::Multiple);
        let mut table =
            LightTable::with_identity(options, fields, HtmlTemplates, PointerIdentity).unwrap();
        let a = Rc::new("a".to_string());
        let b = Rc::new("b".to_string());
        table.set_datasource(vec![a.clone(), b]).unwrap();
        table.handle(TableEvent::Render).unwrap();
        table.handle(TableEvent::SelectAll { checked: true }).unwrap();

        let effects = table.set_datasource(vec![a, Rc::new("b".to_string())]).unwrap();
        assert!(matches!(&patches(&effects)[..], [PatchOp::Replace(1, _)]));
        assert_eq!(table.selection(), &Selection::Multiple(BTreeSet::from([0])));
        assert!(effects.contains(&Effect::SyncSelection(SelectionSync {
            checked: BTreeSet::from([0]),
            all_checked: Some(false),
        })));
    }

    #[test]
    fn key_identity_keeps_rows_with_the_same_key() {
        let fields = vec![Field::new("id", "Id", |row: &(u32, char)| row.0.to_string())];
        let options = TableOptions::default().select_mode(SelectMode::Single);
        let by_id = KeyIdentity(|row: &(u32, char)| row.0);
        let mut table = LightTable::with_identity(options, fields, HtmlTemplates, by_id).unwrap();
        table.set_datasource(vec![(1, 'a'), (2, 'b')]).unwrap();
        table.handle(TableEvent::Render).unwrap();
        table.handle(TableEvent::SelectRow { index: 0, checked: true }).unwrap();

        let effects = table.set_datasource(vec![(0, 'z'), (1, 'x'), (2, 'b')]).unwrap();
        assert!(matches!(&patches(&effects)[..], [PatchOp::InsertAtHead(_)]));
        assert_eq!(table.selection(), &Selection::Single(Some(1)));
    }
}
