//! Table view state.
//!
//! The view owns an ordered list of rows and never reads back from markup.
//! Every user action is split into a synchronous step that validates and
//! produces the request to send, and a completion step that patches the list
//! once the store has answered. [`crate::controller::ViewController`] wires
//! the two together over an [`crate::controller::EntryApi`].

use crate::errors::{ValidationError, ViewError};
use crate::models::{Entry, EntryFields, Field};
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// How long a notice stays on screen.
pub const NOTICE_TTL_SECS: i64 = 5;

pub const MSG_ADDED: &str = "Entry added successfully!";
pub const MSG_ADD_FAILED: &str = "Failed to save entry.";
pub const MSG_UPDATED: &str = "Entry updated successfully!";
pub const MSG_UPDATE_FAILED: &str = "Failed to update entry.";
pub const MSG_DELETED: &str = "Entry deleted successfully!";
pub const MSG_DELETE_FAILED: &str = "Failed to delete entry from the database.";
pub const MSG_LOAD_FAILED: &str = "Failed to load entries.";
pub const MSG_FILL_ALL: &str = "Please fill in all fields.";
pub const MSG_FILL_ALL_ON_SAVE: &str = "All fields are required when saving.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: &'static str,
    pub raised_at: DateTime<Utc>,
}

impl Notice {
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now - self.raised_at < Duration::seconds(NOTICE_TTL_SECS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowMode {
    Disabled,
    Editable,
}

#[derive(Debug, Clone)]
pub struct Row {
    entry: Entry,
    draft: EntryFields,
    mode: RowMode,
    visible: bool,
}

impl Row {
    fn new(entry: Entry) -> Self {
        Self {
            draft: entry.fields.clone(),
            entry,
            mode: RowMode::Disabled,
            visible: true,
        }
    }

    pub fn id(&self) -> i64 {
        self.entry.id
    }

    /// The last values the store accepted.
    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    /// The values currently shown in the row's inputs.
    pub fn draft(&self) -> &EntryFields {
        &self.draft
    }

    pub fn mode(&self) -> RowMode {
        self.mode
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    fn matches(&self, needle: &str) -> bool {
        self.draft
            .values()
            .iter()
            .any(|value| value.to_uppercase().contains(needle))
    }
}

/// Result of pressing a row's edit/save button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggle {
    /// Inputs unlocked; the given field should take focus.
    Editing { focus: Field },
    /// Draft is valid and must be sent to the store before it commits.
    Save(EntryFields),
}

#[derive(Debug, Clone)]
pub struct TableView {
    rows: Vec<Row>,
    form: EntryFields,
    filter: String,
    notice: Option<Notice>,
}

impl TableView {
    /// Empty view whose add form defaults its date to `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            rows: Vec::new(),
            form: blank_form(today.format("%Y-%m-%d").to_string()),
            filter: String::new(),
            notice: None,
        }
    }

    pub fn with_entries(today: NaiveDate, entries: Vec<Entry>) -> Self {
        let mut view = Self::new(today);
        view.load(entries);
        view
    }

    /// Replaces every row with `entries`, dropping any unsaved edits.
    pub fn load(&mut self, entries: Vec<Entry>) {
        self.rows = entries.into_iter().map(Row::new).collect();
        self.refresh();
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, id: i64) -> Option<&Row> {
        self.rows.iter().find(|row| row.id() == id)
    }

    pub fn visible_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(|row| row.visible)
    }

    pub fn form(&self) -> &EntryFields {
        &self.form
    }

    pub fn set_form_field(&mut self, field: Field, value: impl Into<String>) {
        self.form.set(field, value);
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn entry_count(&self) -> usize {
        self.rows.len()
    }

    pub fn visible_count(&self) -> usize {
        self.visible_rows().count()
    }

    pub fn count_label(&self) -> String {
        let count = self.entry_count();
        format!("{count} {}", if count == 1 { "entry" } else { "entries" })
    }

    /// The "no entries yet" placeholder is shown.
    pub fn is_empty_state(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows exist but the filter hides every one of them.
    pub fn shows_no_results(&self) -> bool {
        !self.is_empty_state() && self.visible_count() == 0
    }

    pub fn notice_at(&self, now: DateTime<Utc>) -> Option<&Notice> {
        self.notice.as_ref().filter(|notice| notice.is_active_at(now))
    }

    /// Validates the add form. On failure raises an error notice and nothing
    /// should be sent.
    pub fn begin_add(&mut self, now: DateTime<Utc>) -> Result<EntryFields, ValidationError> {
        let fields = self.form.trimmed();
        if let Err(err) = fields.validate() {
            self.raise(NoticeKind::Error, MSG_FILL_ALL, now);
            return Err(err);
        }
        Ok(fields)
    }

    /// Appends the row the store just created and clears the form, keeping
    /// its date.
    pub fn complete_add(&mut self, id: i64, fields: EntryFields, now: DateTime<Utc>) {
        self.rows.push(Row::new(Entry { id, fields }));
        self.refresh();
        self.form = blank_form(std::mem::take(&mut self.form.date));
        self.raise(NoticeKind::Success, MSG_ADDED, now);
    }

    pub fn fail_add(&mut self, now: DateTime<Utc>) {
        self.raise(NoticeKind::Error, MSG_ADD_FAILED, now);
    }

    /// Changes one input of an editable row. Disabled rows ignore edits.
    pub fn edit_field(&mut self, id: i64, field: Field, value: impl Into<String>) -> Result<(), ViewError> {
        let row = self.row_mut(id)?;
        if row.mode == RowMode::Editable {
            row.draft.set(field, value);
        }
        Ok(())
    }

    pub fn toggle_edit(&mut self, id: i64, now: DateTime<Utc>) -> Result<Toggle, ViewError> {
        let row = self.row_mut(id)?;
        if row.mode == RowMode::Disabled {
            row.mode = RowMode::Editable;
            return Ok(Toggle::Editing {
                focus: Field::RegNumber,
            });
        }
        let fields = row.draft.trimmed();
        if let Err(err) = fields.validate() {
            self.raise(NoticeKind::Error, MSG_FILL_ALL_ON_SAVE, now);
            return Err(err.into());
        }
        Ok(Toggle::Save(fields))
    }

    /// The store accepted the update: lock the row and re-sort.
    pub fn commit_update(&mut self, id: i64, fields: EntryFields, now: DateTime<Utc>) -> Result<(), ViewError> {
        let row = self.row_mut(id)?;
        row.draft = fields.clone();
        row.entry.fields = fields;
        row.mode = RowMode::Disabled;
        self.refresh();
        self.raise(NoticeKind::Success, MSG_UPDATED, now);
        Ok(())
    }

    /// The row stays editable so the user's changes are not lost.
    pub fn fail_update(&mut self, now: DateTime<Utc>) {
        self.raise(NoticeKind::Error, MSG_UPDATE_FAILED, now);
    }

    pub fn complete_delete(&mut self, id: i64, now: DateTime<Utc>) -> Result<(), ViewError> {
        let index = self
            .rows
            .iter()
            .position(|row| row.id() == id)
            .ok_or(ViewError::UnknownRow(id))?;
        self.rows.remove(index);
        self.refresh();
        self.raise(NoticeKind::Success, MSG_DELETED, now);
        Ok(())
    }

    pub fn fail_delete(&mut self, now: DateTime<Utc>) {
        self.raise(NoticeKind::Error, MSG_DELETE_FAILED, now);
    }

    pub fn fail_load(&mut self, now: DateTime<Utc>) {
        self.raise(NoticeKind::Error, MSG_LOAD_FAILED, now);
    }

    /// Case-insensitive substring search over each row's input values.
    /// Hidden rows stay in the list.
    pub fn set_filter(&mut self, query: impl Into<String>) {
        self.filter = query.into();
        self.apply_filter();
    }

    /// Stable sort by `"{date}T{time}"` of the committed values.
    pub fn sort(&mut self) {
        self.rows.sort_by_key(|row| row.entry.fields.sort_key());
    }

    fn refresh(&mut self) {
        self.sort();
        self.apply_filter();
    }

    fn apply_filter(&mut self) {
        let needle = self.filter.to_uppercase();
        for row in &mut self.rows {
            row.visible = row.matches(&needle);
        }
    }

    fn raise(&mut self, kind: NoticeKind, message: &'static str, now: DateTime<Utc>) {
        self.notice = Some(Notice {
            kind,
            message,
            raised_at: now,
        });
    }

    fn row_mut(&mut self, id: i64) -> Result<&mut Row, ViewError> {
        self.rows
            .iter_mut()
            .find(|row| row.id() == id)
            .ok_or(ViewError::UnknownRow(id))
    }
}

fn blank_form(date: String) -> EntryFields {
    EntryFields {
        date,
        ..EntryFields::default()
    }
}
