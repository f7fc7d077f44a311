//! State and actions of the workers page.
//!
//! The view never patches its list locally: every successful mutation is
//! followed by a full refetch, so what it shows converges to the server.

use log::{info, warn};

use super::{workers_table, Prompter};
use crate::api::{ApiError, Worker, WorkerPayload, WorkersApi};

const LOADING: &str = "Loading...";

/// Editable copy of a row, taken when editing starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub id: i64,
    pub name: String,
    pub title: String,
}

/// Identifies one list request. Only the newest ticket may update the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

pub struct WorkersView<A, P> {
    api: A,
    prompter: P,
    workers: Vec<Worker>,
    loading: bool,
    error: Option<String>,
    name: String,
    title: String,
    editing: Option<EditSession>,
    last_ticket: u64,
}

impl<A: WorkersApi, P: Prompter> WorkersView<A, P> {
    pub fn new(api: A, prompter: P) -> Self {
        Self {
            api,
            prompter,
            workers: Vec::new(),
            loading: false,
            error: None,
            name: String::new(),
            title: String::new(),
            editing: None,
            last_ticket: 0,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    /// Workers ordered by id, lowest first.
    pub fn workers(&self) -> Vec<&Worker> {
        let mut sorted: Vec<&Worker> = self.workers.iter().collect();
        sorted.sort_by_key(|w| w.id);
        sorted
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn editing(&self) -> Option<&EditSession> {
        self.editing.as_ref()
    }

    pub fn editing_id(&self) -> Option<i64> {
        self.editing.as_ref().map(|edit| edit.id)
    }

    /// Loads the list for the first time.
    pub async fn mount(&mut self) {
        self.fetch_workers().await;
    }

    /// Drops all page state, as when the page is closed. The ticket counter
    /// survives so responses issued before the reset are still ignored.
    pub fn reset(&mut self) {
        self.workers.clear();
        self.loading = false;
        self.error = None;
        self.name.clear();
        self.title.clear();
        self.editing = None;
    }

    pub async fn fetch_workers(&mut self) {
        let ticket = self.begin_fetch();
        self.prompter.show_status(LOADING);
        let result = self.api.list().await;
        self.finish_fetch(ticket, result);
    }

    /// Marks a list request as in flight and hands out its ticket.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.last_ticket += 1;
        self.loading = true;
        self.error = None;
        FetchTicket(self.last_ticket)
    }

    /// Applies a list response. Returns `false` when a newer request has
    /// started since `ticket` was issued; the response is then dropped.
    pub fn finish_fetch(&mut self, ticket: FetchTicket, result: Result<Vec<Worker>, ApiError>) -> bool {
        if ticket.0 != self.last_ticket {
            warn!(
                "Dropping stale worker list (request {}, latest {})",
                ticket.0, self.last_ticket
            );
            return false;
        }

        self.loading = false;
        match result {
            Ok(workers) => {
                info!("Loaded {} workers", workers.len());
                self.workers = workers;
            }
            Err(e) => {
                warn!("Failed to load workers: {}", e);
                self.error = Some(e.to_string());
            }
        }
        true
    }

    /// Submits the add form. Does nothing while the trimmed name is empty.
    pub async fn submit_add(&mut self) {
        if self.name.trim().is_empty() {
            return;
        }

        let payload = WorkerPayload::from_form(&self.name, &self.title);
        match self.api.create(&payload).await {
            Ok(()) => {
                info!("Created worker {}", payload.name);
                self.name.clear();
                self.title.clear();
                self.fetch_workers().await;
            }
            Err(e) => self.prompter.alert(&e.to_string()),
        }
    }

    /// Enters edit mode for a row, replacing any edit in progress.
    /// Returns `false` if no such row is displayed.
    pub fn start_edit(&mut self, id: i64) -> bool {
        let Some(worker) = self.workers.iter().find(|w| w.id == id) else {
            return false;
        };
        self.editing = Some(EditSession {
            id,
            name: worker.name.clone(),
            title: worker.title.clone().unwrap_or_default(),
        });
        true
    }

    pub fn set_edit_name(&mut self, name: impl Into<String>) {
        if let Some(edit) = self.editing.as_mut() {
            edit.name = name.into();
        }
    }

    pub fn set_edit_title(&mut self, title: impl Into<String>) {
        if let Some(edit) = self.editing.as_mut() {
            edit.title = title.into();
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Saves the edit in progress. On failure the row stays in edit mode.
    pub async fn save_edit(&mut self) {
        let Some(edit) = self.editing.as_ref() else {
            return;
        };
        let id = edit.id;
        let payload = WorkerPayload::from_form(&edit.name, &edit.title);

        match self.api.update(id, &payload).await {
            Ok(()) => {
                info!("Updated worker {}", id);
                self.editing = None;
                self.fetch_workers().await;
            }
            Err(e) => self.prompter.alert(&e.to_string()),
        }
    }

    /// Deletes a worker once the user confirms.
    pub async fn delete(&mut self, id: i64) {
        if !self.prompter.confirm("Delete this worker?") {
            return;
        }

        match self.api.delete(id).await {
            Ok(()) => {
                info!("Deleted worker {}", id);
                self.fetch_workers().await;
            }
            Err(e) => self.prompter.alert(&e.to_string()),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::from("Workers\n");
        out.push_str(&format!(
            "Name: [{}]  Title (optional): [{}]  (Add)\n\n",
            self.name, self.title
        ));
        if self.loading {
            out.push_str(LOADING);
            out.push('\n');
        }
        if let Some(error) = &self.error {
            out.push_str(&format!("! {}\n", error));
        }
        out.push_str(&workers_table::render_table(&self.workers(), self.editing()));
        out
    }
}
