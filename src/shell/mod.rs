//! Navigation shell: the nav bar and whichever page is active.

pub mod commands;
pub mod terminal;

use log::info;
use thiserror::Error;

use crate::api::WorkersApi;
use crate::view::{Prompter, WorkersView};
use commands::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Workers,
    Calendar,
    Schedule,
}

impl Route {
    pub const ALL: [Route; 3] = [Route::Workers, Route::Calendar, Route::Schedule];

    pub fn path(self) -> &'static str {
        match self {
            Route::Workers => "/",
            Route::Calendar => "/calendar",
            Route::Schedule => "/schedule",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Route::Workers => "Workers",
            Route::Calendar => "Calendar",
            Route::Schedule => "Today's Schedule",
        }
    }

    /// Exact match only, so `/` is the workers page and nothing else.
    pub fn from_path(path: &str) -> Option<Route> {
        Route::ALL.into_iter().find(|route| route.path() == path)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShellError {
    #[error("Open the workers page first (go /)")]
    NotOnWorkersPage,

    #[error("No worker with id {0}")]
    NoSuchWorker(i64),

    #[error("No edit in progress")]
    NotEditing,
}

pub struct Shell<A, P> {
    path: String,
    workers: WorkersView<A, P>,
}

impl<A: WorkersApi, P: Prompter> Shell<A, P> {
    /// Starts on no page; call [`Shell::navigate`] to mount one.
    pub fn new(workers: WorkersView<A, P>) -> Self {
        Self {
            path: String::new(),
            workers,
        }
    }

    pub fn route(&self) -> Option<Route> {
        Route::from_path(&self.path)
    }

    pub fn workers(&self) -> &WorkersView<A, P> {
        &self.workers
    }

    /// Switches pages. Opening the workers page from elsewhere remounts it.
    pub async fn navigate(&mut self, path: &str) {
        let was_on_workers = self.route() == Some(Route::Workers);
        self.path = path.to_string();
        info!("Navigated to {}", path);

        if self.route() == Some(Route::Workers) && !was_on_workers {
            self.workers.reset();
            self.workers.mount().await;
        }
    }

    /// Runs one command. `Help` and `Quit` belong to the caller and are ignored here.
    pub async fn apply(&mut self, command: Command) -> Result<(), ShellError> {
        if let Command::Go(path) = &command {
            self.navigate(path).await;
            return Ok(());
        }
        if matches!(command, Command::Help | Command::Quit) {
            return Ok(());
        }
        if self.route() != Some(Route::Workers) {
            return Err(ShellError::NotOnWorkersPage);
        }

        let view = &mut self.workers;
        match command {
            Command::Refresh => view.fetch_workers().await,
            Command::Add { name, title } => {
                view.set_name(name);
                view.set_title(title);
                view.submit_add().await;
            }
            Command::Edit(id) => {
                if !view.start_edit(id) {
                    return Err(ShellError::NoSuchWorker(id));
                }
            }
            Command::EditName(name) => {
                if view.editing().is_none() {
                    return Err(ShellError::NotEditing);
                }
                view.set_edit_name(name);
            }
            Command::EditTitle(title) => {
                if view.editing().is_none() {
                    return Err(ShellError::NotEditing);
                }
                view.set_edit_title(title);
            }
            Command::Save => {
                if view.editing().is_none() {
                    return Err(ShellError::NotEditing);
                }
                view.save_edit().await;
            }
            Command::Cancel => view.cancel_edit(),
            Command::Delete(id) => view.delete(id).await,
            Command::Go(_) | Command::Help | Command::Quit => {}
        }
        Ok(())
    }

    pub fn render_nav(&self) -> String {
        let active = self.route();
        let links: Vec<String> = Route::ALL
            .iter()
            .map(|&route| {
                if Some(route) == active {
                    format!("[{}]", route.label())
                } else {
                    format!(" {} ", route.label())
                }
            })
            .collect();
        links.join("  ")
    }

    pub fn render(&self) -> String {
        let page = match self.route() {
            Some(Route::Workers) => self.workers.render(),
            Some(Route::Calendar) => placeholder(Route::Calendar),
            Some(Route::Schedule) => placeholder(Route::Schedule),
            None => format!("No page at '{}'\n", self.path),
        };
        format!("{}\n\n{}", self.render_nav(), page)
    }
}

fn placeholder(route: Route) -> String {
    format!("{}\nComing soon.\n", route.label())
}
