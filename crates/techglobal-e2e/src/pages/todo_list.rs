//! To-do list demo page.

use crate::driver::Session;
use crate::helpers::{click_button, type_text};
use crate::locator::{Locator, Role};
use crate::page_object::PageObject;
use crate::result::E2eResult;
use async_trait::async_trait;

/// Selector table for the to-do app
pub mod selectors {
    /// Modal container; narrowed by [`MODAL_TITLE_TEXT`]
    pub const MODAL: &str = "nav";
    /// Text identifying the modal
    pub const MODAL_TITLE_TEXT: &str = "My Tasks";
    /// New task input
    pub const TASK_INPUT: &str = "#input-add";
    /// ADD button
    pub const ADD_BUTTON: &str = "#add-btn";
    /// Search input
    pub const SEARCH_FIELD: &str = "#search";
    /// One row per task
    pub const TASK_ROWS: &str = "#panel .panel-block div";
    /// Task name; clicking toggles completion
    pub const TASK_NAMES: &str = "#panel .panel-block span";
    /// Delete icon of every task
    pub const DELETE_BUTTONS: &str = "[class*=\"has-text-danger\"]";
    /// "Remove completed tasks!" button
    pub const REMOVE_COMPLETED: &str = "button#clear";
    /// "No tasks found!" message
    pub const EMPTY_MESSAGE: &str = "div[class$=\"danger\"]";
    /// Inline validation error
    pub const ERROR_MESSAGE: &str = ".is-danger";
}

/// Link on the frontend index that opens the app
pub const TODO_LINK_NAME: &str = "Todo List";
/// Placeholder of the new task input
pub const TASK_INPUT_PLACEHOLDER: &str = "New todo";
/// Placeholder of the search input
pub const SEARCH_PLACEHOLDER: &str = "Type to search";
/// Accessible name of the ADD button
pub const ADD_BUTTON_NAME: &str = "ADD";
/// Message shown when no task is listed
pub const EMPTY_LIST_MESSAGE: &str = "No tasks found!";
/// Longest accepted task name
pub const MAX_TASK_LEN: usize = 30;
/// Error for names longer than [`MAX_TASK_LEN`]
pub const TOO_LONG_ERROR: &str = "Error: Todo cannot be more than 30 characters!";

/// Error shown when a task with the same name is already listed
#[must_use]
pub fn duplicate_error(name: &str) -> String {
    format!("Error: You already have {name} in your todo list.")
}

/// Page object for the to-do app modal
#[derive(Debug, Clone)]
pub struct TodoListPage {
    session: Session,
    modal_title: Locator,
    task_input: Locator,
    add_button: Locator,
    search_field: Locator,
    task_rows: Locator,
    task_names: Locator,
    delete_buttons: Locator,
    remove_completed_button: Locator,
    empty_message: Locator,
    error_message: Locator,
}

#[async_trait]
impl PageObject for TodoListPage {
    const SHARED_STATE: &'static str = "todo-list";

    fn new(session: Session) -> Self {
        Self {
            modal_title: session
                .locator(selectors::MODAL)
                .filter_has_text(selectors::MODAL_TITLE_TEXT),
            task_input: session.locator(selectors::TASK_INPUT),
            add_button: session.locator(selectors::ADD_BUTTON),
            search_field: session.locator(selectors::SEARCH_FIELD),
            task_rows: session.locator(selectors::TASK_ROWS),
            task_names: session.locator(selectors::TASK_NAMES),
            delete_buttons: session.locator(selectors::DELETE_BUTTONS),
            remove_completed_button: session.locator(selectors::REMOVE_COMPLETED),
            empty_message: session.locator(selectors::EMPTY_MESSAGE),
            error_message: session.locator(selectors::ERROR_MESSAGE),
            session,
        }
    }

    fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self) -> String {
        self.session.config().todo_entry_url()
    }

    /// The app opens from the frontend index through its link
    async fn navigate(&self) -> E2eResult<()> {
        tracing::info!(page = self.page_name(), "navigate");
        self.session.goto(&self.url()).await?;
        self.session
            .get_by_role(Role::Link, TODO_LINK_NAME)
            .click()
            .await
    }
}

impl TodoListPage {
    /// Modal title ("My Tasks")
    #[must_use]
    pub const fn modal_title(&self) -> &Locator {
        &self.modal_title
    }

    /// New task input
    #[must_use]
    pub const fn task_input(&self) -> &Locator {
        &self.task_input
    }

    /// ADD button
    #[must_use]
    pub const fn add_button(&self) -> &Locator {
        &self.add_button
    }

    /// Search input
    #[must_use]
    pub const fn search_field(&self) -> &Locator {
        &self.search_field
    }

    /// Task rows
    #[must_use]
    pub const fn task_rows(&self) -> &Locator {
        &self.task_rows
    }

    /// Task names / completion toggles
    #[must_use]
    pub const fn task_names(&self) -> &Locator {
        &self.task_names
    }

    /// Delete controls
    #[must_use]
    pub const fn delete_buttons(&self) -> &Locator {
        &self.delete_buttons
    }

    /// "Remove completed tasks!" button
    #[must_use]
    pub const fn remove_completed_button(&self) -> &Locator {
        &self.remove_completed_button
    }

    /// Empty-list message
    #[must_use]
    pub const fn empty_message(&self) -> &Locator {
        &self.empty_message
    }

    /// Inline validation error
    #[must_use]
    pub const fn error_message(&self) -> &Locator {
        &self.error_message
    }

    /// Type a task name and press ADD
    ///
    /// # Errors
    ///
    /// Returns error if the input or the button cannot be used
    pub async fn add_task(&self, name: &str) -> E2eResult<()> {
        tracing::debug!(task = name, "add task");
        type_text(&self.session, TASK_INPUT_PLACEHOLDER, name).await?;
        click_button(&self.session, ADD_BUTTON_NAME).await
    }

    /// Add tasks one by one, in order
    ///
    /// # Errors
    ///
    /// Stops at the first task that cannot be added
    pub async fn add_tasks<S: AsRef<str>>(&self, names: &[S]) -> E2eResult<()> {
        for name in names {
            self.add_task(name.as_ref()).await?;
        }
        Ok(())
    }

    /// Type into the search field
    ///
    /// # Errors
    ///
    /// Returns error if the search field cannot be filled
    pub async fn search(&self, text: &str) -> E2eResult<()> {
        type_text(&self.session, SEARCH_PLACEHOLDER, text).await
    }

    /// Toggle completion of the task at `index`
    ///
    /// # Errors
    ///
    /// Returns error if no task is listed at `index`
    pub async fn toggle_task(&self, index: usize) -> E2eResult<()> {
        self.task_names.nth(index).click().await
    }

    /// Delete the task at `index`
    ///
    /// # Errors
    ///
    /// Returns error if no delete control is listed at `index`
    pub async fn delete_task(&self, index: usize) -> E2eResult<()> {
        self.delete_buttons.nth(index).click().await
    }

    /// Press "Remove completed tasks!"
    ///
    /// # Errors
    ///
    /// Returns error if the button cannot be clicked
    pub async fn remove_completed(&self) -> E2eResult<()> {
        self.remove_completed_button.click().await
    }

    /// Names of the listed tasks, in display order
    ///
    /// # Errors
    ///
    /// Returns error if the session is closed
    pub async fn task_list(&self) -> E2eResult<Vec<String>> {
        self.task_rows.all_text_contents().await
    }
}
