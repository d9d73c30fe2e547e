use crate::errors::{ApiError, ViewError};
use crate::models::{Entry, EntryFields};
use crate::storage::EntryStore;
use crate::view::{TableView, Toggle};
use async_trait::async_trait;
use chrono::{Local, Utc};
use tracing::{error, warn};

/// The four entry operations as seen from the table view.
#[async_trait]
pub trait EntryApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Entry>, ApiError>;

    /// Returns the id the store assigned.
    async fn create(&self, fields: &EntryFields) -> Result<i64, ApiError>;

    async fn update(&self, id: i64, fields: &EntryFields) -> Result<(), ApiError>;

    async fn delete(&self, id: i64) -> Result<(), ApiError>;
}

#[async_trait]
impl EntryApi for EntryStore {
    async fn list(&self) -> Result<Vec<Entry>, ApiError> {
        Ok(EntryStore::list(self).await?)
    }

    async fn create(&self, fields: &EntryFields) -> Result<i64, ApiError> {
        Ok(EntryStore::create(self, fields).await?)
    }

    async fn update(&self, id: i64, fields: &EntryFields) -> Result<(), ApiError> {
        Ok(EntryStore::update(self, id, fields).await?)
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        Ok(EntryStore::delete(self, id).await?)
    }
}

/// Drives a [`TableView`]: one request per action, state patched only after
/// the store answers.
pub struct ViewController<A> {
    api: A,
    view: TableView,
}

impl<A: EntryApi> ViewController<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            view: TableView::new(Local::now().date_naive()),
        }
    }

    pub fn view(&self) -> &TableView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut TableView {
        &mut self.view
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub async fn load(&mut self) -> Result<(), ViewError> {
        match self.api.list().await {
            Ok(entries) => {
                self.view.load(entries);
                Ok(())
            }
            Err(err) => {
                error!("failed to load entries: {err}");
                self.view.fail_load(Utc::now());
                Err(err.into())
            }
        }
    }

    /// Submits the add form. Returns the new entry's id.
    pub async fn add(&mut self) -> Result<i64, ViewError> {
        let fields = self.view.begin_add(Utc::now())?;
        match self.api.create(&fields).await {
            Ok(id) => {
                self.view.complete_add(id, fields, Utc::now());
                Ok(id)
            }
            Err(err) => {
                error!("error saving entry: {err}");
                self.view.fail_add(Utc::now());
                Err(err.into())
            }
        }
    }

    /// Edit/save button. Saving sends the whole row; a failed save leaves the
    /// row editable.
    pub async fn toggle_edit(&mut self, id: i64) -> Result<Toggle, ViewError> {
        let toggle = self.view.toggle_edit(id, Utc::now())?;
        if let Toggle::Save(fields) = &toggle {
            if let Err(err) = self.api.update(id, fields).await {
                error!("error updating entry {id}: {err}");
                self.view.fail_update(Utc::now());
                return Err(err.into());
            }
            self.view.commit_update(id, fields.clone(), Utc::now())?;
        }
        Ok(toggle)
    }

    /// Deletes a row once `confirm` agrees. Returns `false` when the user
    /// backed out.
    pub async fn delete<F>(&mut self, id: i64, confirm: F) -> Result<bool, ViewError>
    where
        F: FnOnce(&Entry) -> bool,
    {
        let row = self.view.row(id).ok_or(ViewError::UnknownRow(id))?;
        if !confirm(row.entry()) {
            return Ok(false);
        }
        if let Err(err) = self.api.delete(id).await {
            warn!("error deleting entry {id}: {err}");
            self.view.fail_delete(Utc::now());
            return Err(err.into());
        }
        self.view.complete_delete(id, Utc::now())?;
        Ok(true)
    }

    pub fn set_filter(&mut self, query: impl Into<String>) {
        self.view.set_filter(query);
    }
}
