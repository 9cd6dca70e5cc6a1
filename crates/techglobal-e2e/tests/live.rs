//! Journeys against the live demo site.
//!
//! Requires Chromium and network access:
//!
//! ```text
//! cargo test -p techglobal-e2e --features browser -- --ignored
//! ```
//!
//! `E2E_CONFIG`, `E2E_BASE_URL`, `CHROMIUM_PATH` and friends are honoured.
//! `E2E_TODO_URL=https://techglobal-training.com/frontend` starts the to-do
//! journeys from the apex host instead of `www.`.

#![cfg(feature = "browser")]

use techglobal_e2e::pages::{ShoppingCartPage, TodoListPage};
use techglobal_e2e::scenarios::{shopping_cart, todo_list};
use techglobal_e2e::{logging, ChromiumProvider, Fixture, ScenarioReport, SuiteConfig};

fn config() -> SuiteConfig {
    logging::init();
    SuiteConfig::load().unwrap()
}

fn todo() -> Fixture<TodoListPage> {
    Fixture::new(ChromiumProvider::new(config()))
}

fn cart() -> Fixture<ShoppingCartPage> {
    Fixture::new(ChromiumProvider::new(config()))
}

fn check(report: ScenarioReport) {
    println!("{report}");
    report.into_result().unwrap();
}

#[tokio::test]
#[ignore = "drives a real browser against the live site"]
async fn live_todo_case_01() {
    check(
        todo()
            .run_scenario(todo_list::CASE_01, todo_list::case_01_modal_verification)
            .await
            .unwrap(),
    );
}

#[tokio::test]
#[ignore = "drives a real browser against the live site"]
async fn live_todo_case_02() {
    check(
        todo()
            .run_scenario(todo_list::CASE_02, todo_list::case_02_single_task)
            .await
            .unwrap(),
    );
}

#[tokio::test]
#[ignore = "drives a real browser against the live site"]
async fn live_todo_case_03() {
    check(
        todo()
            .run_scenario(todo_list::CASE_03, todo_list::case_03_multiple_tasks)
            .await
            .unwrap(),
    );
}

#[tokio::test]
#[ignore = "drives a real browser against the live site"]
async fn live_todo_case_04() {
    check(
        todo()
            .run_scenario(todo_list::CASE_04, todo_list::case_04_search)
            .await
            .unwrap(),
    );
}

#[tokio::test]
#[ignore = "drives a real browser against the live site"]
async fn live_todo_case_05() {
    check(
        todo()
            .run_scenario(todo_list::CASE_05, todo_list::case_05_validation)
            .await
            .unwrap(),
    );
}

#[tokio::test]
#[ignore = "drives a real browser against the live site"]
async fn live_cart_case_01() {
    check(
        cart()
            .run_scenario(shopping_cart::CASE_01, shopping_cart::case_01_available_courses)
            .await
            .unwrap(),
    );
}

#[tokio::test]
#[ignore = "drives a real browser against the live site"]
async fn live_cart_case_02() {
    check(
        cart()
            .run_scenario(shopping_cart::CASE_02, shopping_cart::case_02_cart_section)
            .await
            .unwrap(),
    );
}

#[tokio::test]
#[ignore = "drives a real browser against the live site"]
async fn live_cart_case_03() {
    check(
        cart()
            .run_scenario(shopping_cart::CASE_03, shopping_cart::case_03_single_course)
            .await
            .unwrap(),
    );
}

#[tokio::test]
#[ignore = "drives a real browser against the live site"]
async fn live_cart_case_04() {
    check(
        cart()
            .run_scenario(shopping_cart::CASE_04, shopping_cart::case_04_two_courses)
            .await
            .unwrap(),
    );
}

#[tokio::test]
#[ignore = "drives a real browser against the live site"]
async fn live_cart_case_05() {
    check(
        cart()
            .run_scenario(shopping_cart::CASE_05, shopping_cart::case_05_all_courses)
            .await
            .unwrap(),
    );
}
