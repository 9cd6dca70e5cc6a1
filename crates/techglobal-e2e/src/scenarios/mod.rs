//! Scripted user journeys.
//!
//! Each case is a plain async function taking the page object and the running
//! [`Scenario`](crate::Scenario) and handing the scenario back, so the same
//! script runs against the in-process doubles and a live browser:
//!
//! ```ignore
//! let report = Fixture::<TodoListPage>::new(DoubleProvider::new(config))
//!     .run_scenario(todo_list::CASE_02, todo_list::case_02_single_task)
//!     .await?;
//! report.into_result()?;
//! ```

pub mod shopping_cart;
pub mod todo_list;
