//! To-do app journeys against the in-process double

use std::time::Duration;
use techglobal_e2e::pages::todo_list::{duplicate_error, TOO_LONG_ERROR};
use techglobal_e2e::pages::TodoListPage;
use techglobal_e2e::scenarios::todo_list;
use techglobal_e2e::{
    expect, logging, DoubleProvider, E2eError, Fixture, PageObject, Scenario, StepOutcome,
    SuiteConfig, NAVIGATE_STEP,
};

fn config() -> SuiteConfig {
    SuiteConfig::default()
        .with_expect_timeout(1_000)
        .with_action_timeout(1_000)
        .with_poll_interval(5)
        .with_serialized_shared_state(false)
}

fn fixture() -> Fixture<TodoListPage> {
    logging::init();
    Fixture::new(DoubleProvider::new(config()))
}

fn slow_fixture() -> Fixture<TodoListPage> {
    logging::init();
    Fixture::new(DoubleProvider::new(config()).with_render_delay(Duration::from_millis(20)))
}

// ===== Journeys =====

#[tokio::test]
async fn case_01_modal_verification() {
    let report = fixture()
        .run_scenario(todo_list::CASE_01, todo_list::case_01_modal_verification)
        .await
        .unwrap();

    assert_eq!(report.steps.len(), 6);
    assert_eq!(report.steps[0].name, NAVIGATE_STEP);
    report.into_result().unwrap();
}

#[tokio::test]
async fn case_02_single_task() {
    let report = fixture()
        .run_scenario(todo_list::CASE_02, todo_list::case_02_single_task)
        .await
        .unwrap();

    assert_eq!(report.count(StepOutcome::Passed), 8);
    report.into_result().unwrap();
}

#[tokio::test]
async fn case_03_multiple_tasks() {
    fixture()
        .run_scenario(todo_list::CASE_03, todo_list::case_03_multiple_tasks)
        .await
        .unwrap()
        .into_result()
        .unwrap();
}

#[tokio::test]
async fn case_04_search() {
    fixture()
        .run_scenario(todo_list::CASE_04, todo_list::case_04_search)
        .await
        .unwrap()
        .into_result()
        .unwrap();
}

#[tokio::test]
async fn case_05_validation() {
    let report = fixture()
        .run_scenario(todo_list::CASE_05, todo_list::case_05_validation)
        .await
        .unwrap();

    assert_eq!(report.steps.len(), 9);
    report.into_result().unwrap();
}

#[tokio::test]
async fn journeys_survive_delayed_repaints() {
    let fixture = slow_fixture();
    for (name, report) in [
        (
            todo_list::CASE_02,
            fixture
                .run_scenario(todo_list::CASE_02, todo_list::case_02_single_task)
                .await,
        ),
        (
            todo_list::CASE_03,
            fixture
                .run_scenario(todo_list::CASE_03, todo_list::case_03_multiple_tasks)
                .await,
        ),
        (
            todo_list::CASE_04,
            fixture
                .run_scenario(todo_list::CASE_04, todo_list::case_04_search)
                .await,
        ),
        (
            todo_list::CASE_05,
            fixture
                .run_scenario(todo_list::CASE_05, todo_list::case_05_validation)
                .await,
        ),
    ] {
        let report = report.unwrap();
        assert!(report.passed(), "{name}:\n{report}");
    }
}

#[tokio::test]
async fn journey_starts_from_separate_todo_origin() {
    logging::init();
    let fixture = Fixture::<TodoListPage>::new(DoubleProvider::new(
        config().with_todo_url("https://techglobal-training.com/frontend"),
    ));
    let report = fixture
        .run_scenario(todo_list::CASE_02, todo_list::case_02_single_task)
        .await
        .unwrap();
    assert!(report.passed(), "{report}");
}

// ===== Properties =====

#[tokio::test]
async fn too_long_name_leaves_count_unchanged() {
    fixture()
        .run("too long", |page| async move {
            page.add_task("short").await?;
            page.add_task(&"x".repeat(31)).await?;
            expect(page.error_message()).to_have_text(TOO_LONG_ERROR).await?;
            expect(page.task_rows()).to_have_count(1).await
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn duplicate_name_is_rejected() {
    fixture()
        .run("duplicate", |page| async move {
            page.add_tasks(&["Laundry", "Laundry"]).await?;
            expect(page.error_message())
                .to_have_text(duplicate_error("Laundry"))
                .await?;
            expect(page.task_rows()).to_have_count(1).await
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn completing_all_then_removing_empties_list() {
    fixture()
        .run("complete all", |page| async move {
            page.add_tasks(&["a", "b", "c"]).await?;
            for index in 0..3 {
                page.toggle_task(index).await?;
            }
            page.remove_completed().await?;
            expect(page.task_rows()).to_have_count(0).await?;
            expect(page.empty_message()).to_be_visible().await
        })
        .await
        .unwrap();
}

// ===== Failure reporting =====

#[tokio::test]
async fn failed_assertion_continues_and_is_reported() {
    let report = fixture()
        .run_scenario("wrong count", |page, mut scenario: Scenario| async move {
            scenario
                .step("2. add", page.add_task("only one"))
                .await;
            scenario
                .step("3. expect two", expect(page.task_rows()).to_have_count(2))
                .await;
            scenario
                .step("4. expect one", expect(page.task_rows()).to_have_count(1))
                .await;
            scenario
        })
        .await
        .unwrap();

    let outcomes: Vec<_> = report.steps.iter().map(|s| s.outcome).collect();
    assert_eq!(
        outcomes,
        vec![
            StepOutcome::Passed,
            StepOutcome::Passed,
            StepOutcome::Failed,
            StepOutcome::Passed
        ]
    );
    let message = report.steps[2].error.clone().unwrap();
    assert!(message.contains("count 2"), "{message}");

    match report.into_result().unwrap_err() {
        E2eError::ScenarioFailed { scenario, failures } => {
            assert_eq!(scenario, "wrong count");
            assert_eq!(failures.len(), 1);
            assert!(failures[0].starts_with("3. expect two"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn failed_action_skips_remaining_steps() {
    let report = fixture()
        .run_scenario("missing row", |page, mut scenario: Scenario| async move {
            scenario.step("2. toggle", page.toggle_task(4)).await;
            scenario
                .step("3. never runs", expect(page.task_rows()).to_have_count(0))
                .await;
            scenario
        })
        .await
        .unwrap();

    assert_eq!(report.steps[1].outcome, StepOutcome::Failed);
    assert_eq!(report.steps[2].outcome, StepOutcome::Skipped);
}

#[tokio::test]
async fn page_name_is_type_name() {
    fixture()
        .run("name", |page| async move {
            assert_eq!(page.page_name(), "TodoListPage");
            Ok(())
        })
        .await
        .unwrap();
}
