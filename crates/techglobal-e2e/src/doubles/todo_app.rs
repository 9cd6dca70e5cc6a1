//! In-process double of the to-do list app.

use super::dom::Node;
use crate::pages::todo_list::{
    duplicate_error, ADD_BUTTON_NAME, EMPTY_LIST_MESSAGE, MAX_TASK_LEN, SEARCH_PLACEHOLDER,
    TASK_INPUT_PLACEHOLDER, TOO_LONG_ERROR,
};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Task {
    name: String,
    completed: bool,
}

/// To-do list state and rendering
#[derive(Debug, Clone, Default)]
pub struct TodoApp {
    tasks: Vec<Task>,
    input: String,
    search: String,
    error: Option<String>,
}

impl TodoApp {
    /// Fresh app with an empty list
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of all tasks, ignoring the search filter
    #[must_use]
    pub fn task_names(&self) -> Vec<String> {
        self.tasks.iter().map(|t| t.name.clone()).collect()
    }

    fn add(&mut self) {
        let name = self.input.trim().to_string();
        if name.is_empty() {
            return;
        }
        if name.chars().count() > MAX_TASK_LEN {
            self.error = Some(TOO_LONG_ERROR.to_string());
        } else if self
            .tasks
            .iter()
            .any(|t| t.name.eq_ignore_ascii_case(&name))
        {
            self.error = Some(duplicate_error(&name));
        } else {
            self.tasks.push(Task {
                name,
                completed: false,
            });
            self.error = None;
            self.input.clear();
        }
    }

    /// Apply a click handler
    pub fn click(&mut self, handler: &str) {
        match handler.split_once(':') {
            Some(("toggle", index)) => {
                if let Some(task) = index.parse::<usize>().ok().and_then(|i| self.tasks.get_mut(i)) {
                    task.completed = !task.completed;
                }
            }
            Some(("delete", index)) => {
                if let Ok(i) = index.parse::<usize>() {
                    if i < self.tasks.len() {
                        self.tasks.remove(i);
                    }
                }
            }
            _ if handler == "add" => self.add(),
            _ if handler == "clear" => self.tasks.retain(|t| !t.completed),
            _ => tracing::trace!(handler, "unhandled click"),
        }
    }

    /// Apply a fill to the input with `id`
    pub fn fill(&mut self, id: &str, text: &str) {
        match id {
            "input-add" => self.input = text.to_string(),
            "search" => self.search = text.to_string(),
            _ => tracing::trace!(id, "fill on unknown input"),
        }
    }

    /// Render the page
    #[must_use]
    pub fn render(&self) -> Node {
        let needle = self.search.trim().to_lowercase();
        let rows: Vec<Node> = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| needle.is_empty() || t.name.to_lowercase().contains(&needle))
            .map(|(i, t)| {
                let name_class = if t.completed {
                    "is-clickable has-text-success"
                } else {
                    "is-clickable"
                };
                Node::new("div").class("panel-block").child(
                    Node::new("div")
                        .class("is-flex is-justify-content-space-between is-fullwidth")
                        .on_click(format!("toggle:{i}"))
                        .child(Node::new("span").class(name_class).text(&t.name))
                        .child(
                            Node::new("i")
                                .class("fa-solid fa-trash-can has-text-danger")
                                .on_click(format!("delete:{i}")),
                        ),
                )
            })
            .collect();
        let empty = rows.is_empty();

        let mut panel = Node::new("nav")
            .id("panel")
            .class("panel")
            .child(Node::new("p").class("panel-heading").text("My Tasks"))
            .child(
                Node::new("div").class("panel-block").child(
                    Node::new("p")
                        .class("control is-expanded")
                        .child(
                            Node::new("input")
                                .id("input-add")
                                .class("input")
                                .attr("type", "text")
                                .attr("placeholder", TASK_INPUT_PLACEHOLDER)
                                .value(&self.input),
                        )
                        .child(
                            Node::new("button")
                                .id("add-btn")
                                .class("button is-link")
                                .text(ADD_BUTTON_NAME)
                                .on_click("add"),
                        ),
                ),
            );
        if let Some(error) = &self.error {
            panel = panel.child(Node::new("p").class("help is-danger").text(error));
        }
        panel = panel.child(
            Node::new("div").class("panel-block").child(
                Node::new("p").class("control").child(
                    Node::new("input")
                        .id("search")
                        .class("input")
                        .attr("type", "search")
                        .attr("placeholder", SEARCH_PLACEHOLDER)
                        .value(&self.search),
                ),
            ),
        );
        panel = panel.children(rows);
        if empty {
            panel = panel.child(
                Node::new("div")
                    .class("panel-block has-text-danger")
                    .text(EMPTY_LIST_MESSAGE),
            );
        }
        panel = panel.child(
            Node::new("p").class("panel-footer").child(
                Node::new("button")
                    .id("clear")
                    .class("button is-link is-outlined is-fullwidth")
                    .text("Remove completed tasks!")
                    .on_click("clear"),
            ),
        );

        super::page_shell("Todo List", panel)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn with_tasks(names: &[&str]) -> TodoApp {
        let mut app = TodoApp::new();
        for name in names {
            app.fill("input-add", name);
            app.click("add");
        }
        app
    }

    #[test]
    fn test_add_clears_input() {
        let app = with_tasks(&["homework"]);
        assert_eq!(app.task_names(), vec!["homework"]);
        assert!(app.input.is_empty());
        assert!(app.error.is_none());
    }

    #[test]
    fn test_empty_input_ignored() {
        let mut app = TodoApp::new();
        app.fill("input-add", "   ");
        app.click("add");
        assert!(app.tasks.is_empty());
        assert!(app.error.is_none());
    }

    #[test]
    fn test_thirty_chars_is_the_limit() {
        let mut app = with_tasks(&[&"x".repeat(30)]);
        assert_eq!(app.tasks.len(), 1);
        app.fill("input-add", &"y".repeat(31));
        app.click("add");
        assert_eq!(app.tasks.len(), 1);
        assert_eq!(app.error.as_deref(), Some(TOO_LONG_ERROR));
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut app = with_tasks(&["Study"]);
        app.fill("input-add", "Study");
        app.click("add");
        assert_eq!(app.tasks.len(), 1);
        assert_eq!(app.error, Some(duplicate_error("Study")));
    }

    #[test]
    fn test_toggle_delete_clear() {
        let mut app = with_tasks(&["a", "b", "c"]);
        app.click("toggle:0");
        app.click("toggle:2");
        app.click("delete:1");
        assert_eq!(app.task_names(), vec!["a", "c"]);
        app.click("clear");
        assert!(app.tasks.is_empty());
    }
}
