//! A sortable, selectable data table that patches its body incrementally.
//!
//! The table is a state machine ([`LightTable`]) that turns events into
//! effects for a host. Datasource changes are reconciled by [`DiffEngine`]
//! into row patches, so a host only touches the rows that actually changed.
//! Markup comes from an injected [`TemplateEngine`]; [`HtmlTemplates`] is the
//! built-in one.
//!
//! ```
//! use light_table::{Field, HtmlTemplates, LightTable, MarkupHost, TableEvent, TableOptions};
//!
//! let fields = vec![Field::new("name", "Name", |row: &String| row.clone())];
//! let mut table = LightTable::new(TableOptions::default(), fields, HtmlTemplates)?;
//! let mut host = MarkupHost::new();
//!
//! table.set_datasource(vec!["b".to_string()])?;
//! table.dispatch(TableEvent::Render, &mut host)?;
//! table.dispatch(
//!     TableEvent::SetProperties(light_table::Properties::new().datasource(vec!["a".into(), "b".into()])),
//!     &mut host,
//! )?;
//! assert_eq!(host.rows().len(), 2);
//! assert_eq!(host.just_updated(), vec![0]);
//! # Ok::<(), light_table::TableError>(())
//! ```
pub mod config;
pub mod diff_engine;
pub mod errors;
pub mod field;
pub mod host;
pub mod html_generator;
pub mod identity;
pub mod table;
pub mod types;
pub mod view;

#[cfg(feature = "python")]
mod converters;
#[cfg(feature = "python")]
mod python;

pub use config::{SelectedIndex, TableOptions};
pub use diff_engine::{apply_patches, detect, plan, remap_selection, DiffEngine};
pub use errors::TableError;
pub use field::{ContentType, Field, FieldSpec};
pub use host::{HostRow, MarkupHost, TableHost};
pub use html_generator::{HtmlTemplates, RenderedRow, TemplateEngine};
pub use identity::{KeyIdentity, PointerIdentity, RowIdentity, ValueIdentity};
pub use table::{
    render_json_table, Change, Effect, LightTable, Notification, Properties, SelectionSync, SortSync, TableEvent,
};
pub use types::{Direction, PatchAction, PatchOp, SelectMode, Selection, SortOrder, SortState};
