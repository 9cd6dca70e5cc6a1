//! To-do app journeys.
//!
//! Every case starts on the opened modal; the fixture records the navigation
//! as step 1.

use crate::assertion::expect;
use crate::page_object::PageObject;
use crate::pages::todo_list::{duplicate_error, EMPTY_LIST_MESSAGE, TOO_LONG_ERROR};
use crate::pages::TodoListPage;
use crate::scenario::Scenario;

/// Case 01 name
pub const CASE_01: &str = "Case 01 - Todo-app Modal Verification";
/// Case 02 name
pub const CASE_02: &str = "Case 02 - Single Task Addition and Removal";
/// Case 03 name
pub const CASE_03: &str = "Case 03 - Multiple Task Operations";
/// Case 04 name
pub const CASE_04: &str = "Case 04 - Search and Filter Functionality in Todo App";
/// Case 05 name
pub const CASE_05: &str = "Case 05 - Task Validation and Error Handling";

const SINGLE_TASK: &str = "homework";
const TASKS: [&str; 5] = ["task1", "task2", "task3", "task4", "task5"];
const INVALID_TASK: &str = "This task is to long to be completed";
const VALID_TASK: &str = "Study";

/// Controls of an empty modal are usable
pub async fn case_01_modal_verification(page: TodoListPage, mut scenario: Scenario) -> Scenario {
    scenario
        .step(
            "2. Verify modal title is visible",
            expect(page.modal_title()).to_be_visible(),
        )
        .await;
    scenario
        .step(
            "3. Validate New todo input field is enabled",
            expect(page.task_input()).to_be_editable(),
        )
        .await;
    scenario
        .step(
            "4. Validate ADD button is enabled",
            expect(page.add_button()).to_be_enabled(),
        )
        .await;
    scenario
        .step(
            "5. Validate Search field is enabled",
            expect(page.search_field()).to_be_editable(),
        )
        .await;
    scenario
        .step(
            "6. Validate task list is empty",
            expect(page.empty_message()).to_be_visible(),
        )
        .await;
    scenario
}

/// Add one task, complete it, delete it
pub async fn case_02_single_task(page: TodoListPage, mut scenario: Scenario) -> Scenario {
    let first_name = page.task_names().first();

    scenario
        .step(
            "2. Enter new task in todo input and add to list",
            page.add_task(SINGLE_TASK),
        )
        .await;
    scenario
        .step(
            "3. Validate new task appears in the list",
            expect(page.task_rows()).to_have_text(SINGLE_TASK),
        )
        .await;
    scenario
        .step(
            "4. Validate that the number of tasks in the list is exactly one",
            expect(page.task_rows()).to_have_count(1),
        )
        .await;
    scenario
        .step(
            "5. Mark the task as completed by clicking on it",
            first_name.click(),
        )
        .await;
    scenario
        .step("6. Validate item is marked as completed", async {
            expect(&first_name).to_have_class("has-text-success")?.await
        })
        .await;
    scenario
        .step(
            "7. Click on the button to remove the item you have added",
            page.delete_task(0),
        )
        .await;
    scenario
        .step(
            "8. Validate that the task list is empty, displaying the message \"No tasks found!\"",
            async {
                expect(page.task_rows()).to_have_count(0).await?;
                expect(&page.session().get_by_text(EMPTY_LIST_MESSAGE))
                    .to_be_visible()
                    .await
            },
        )
        .await;
    scenario
}

/// Add five tasks, complete all, remove completed
pub async fn case_03_multiple_tasks(page: TodoListPage, mut scenario: Scenario) -> Scenario {
    scenario
        .step(
            "2. Enter and add 5 to-do items individually",
            page.add_tasks(&TASKS),
        )
        .await;
    scenario
        .step(
            "3. Validate that all added items match the items displayed on the list",
            async {
                expect(page.task_rows()).to_have_count(TASKS.len()).await?;
                for (row, name) in page.task_rows().all().await?.iter().zip(TASKS) {
                    expect(row).to_have_text(name).await?;
                }
                Ok(())
            },
        )
        .await;
    scenario
        .step(
            "4. Mark all the tasks as completed by clicking on them",
            async {
                for row in page.task_rows().all().await? {
                    row.click().await?;
                }
                Ok(())
            },
        )
        .await;
    scenario
        .step(
            "5. Click on the \"Remove completed tasks!\" button to clear them",
            page.remove_completed(),
        )
        .await;
    scenario
        .step(
            "6. Validate that the task list is empty, displaying the message \"No tasks found!\"",
            expect(&page.session().get_by_text(EMPTY_LIST_MESSAGE)).to_be_visible(),
        )
        .await;
    scenario
}

/// Search narrows the list to the matching task
pub async fn case_04_search(page: TodoListPage, mut scenario: Scenario) -> Scenario {
    scenario
        .step(
            "2. Enter and add 5 to-do items individually",
            page.add_tasks(&TASKS),
        )
        .await;
    scenario
        .step(
            "3. Validate that all added items match the items displayed on the list",
            async {
                for name in TASKS {
                    expect(&page.session().get_by_text(name))
                        .to_be_visible()
                        .await?;
                }
                Ok(())
            },
        )
        .await;
    scenario
        .step(
            "4. Enter the complete name of the previously added to-do item into the search bar",
            page.search(TASKS[0]),
        )
        .await;
    scenario
        .step(
            "5. Validate that the list is now filtered to show only the item you searched for",
            expect(page.task_rows()).to_have_text(TASKS[0]),
        )
        .await;
    scenario
        .step(
            "6. Validate that the number of tasks visible in the list is exactly one",
            expect(page.task_rows()).to_have_count(1),
        )
        .await;
    scenario
}

/// Empty, too long and duplicate names are rejected
pub async fn case_05_validation(page: TodoListPage, mut scenario: Scenario) -> Scenario {
    scenario
        .step(
            "2. Attempt to add an empty task to the to-do list",
            page.add_button().click(),
        )
        .await;
    scenario
        .step(
            "3. Validate that the task list is empty, displaying the message \"No tasks found!\"",
            async {
                expect(page.task_rows()).to_have_count(0).await?;
                expect(page.empty_message())
                    .to_have_text(EMPTY_LIST_MESSAGE)
                    .await
            },
        )
        .await;
    scenario
        .step(
            "4. Enter an item name exceeding 30 characters into the list",
            page.add_task(INVALID_TASK),
        )
        .await;
    scenario
        .step(
            "5. Validate error message appears and says \"Error: Todo cannot be more than 30 characters!\"",
            async {
                expect(page.error_message())
                    .to_have_text(TOO_LONG_ERROR)
                    .await?;
                expect(page.task_rows()).to_have_count(0).await
            },
        )
        .await;
    scenario
        .step("6. Add a valid item name to the list", page.add_task(VALID_TASK))
        .await;
    scenario
        .step(
            "7. Validate that the active task count is exactly one",
            expect(page.task_rows()).to_have_count(1),
        )
        .await;
    scenario
        .step(
            "8. Try to enter an item with the same name already present on the list",
            page.add_task(VALID_TASK),
        )
        .await;
    scenario
        .step(
            "9. Validate that an error message is displayed, indicating \"Error: You already have {ITEM} in your todo list.\"",
            async {
                expect(page.error_message())
                    .to_have_text(duplicate_error(VALID_TASK))
                    .await?;
                expect(page.task_rows()).to_have_count(1).await
            },
        )
        .await;
    scenario
}
