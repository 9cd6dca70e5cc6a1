//! Shopping cart journeys.

use crate::assertion::{assert_close, assert_equals, expect};
use crate::helpers::money_digits;
use crate::pages::shopping_cart::{
    selectors, ADD_TO_CART_TEXT, CART_HEADING_TEXT, HEADING_TEXT, ORDER_PLACED_TEXT,
    PLACE_ORDER_TEXT,
};
use crate::pages::ShoppingCartPage;
use crate::result::{E2eError, E2eResult};
use crate::scenario::Scenario;

/// Case 1 name
pub const CASE_01: &str = "Test Case 01 - Available Courses Section Validation";
/// Case 2 name
pub const CASE_02: &str = "Test Case 02 - Cart Section Validation";
/// Case 3 name
pub const CASE_03: &str = "Test Case 03 - Add a Course to the Cart and Validate";
/// Case 4 name
pub const CASE_04: &str = "Test Case 04 - Add 2 courses to the cart and validate";
/// Case 5 name
pub const CASE_05: &str = "Test Case 05 - Add All Three Courses to the Cart and Validate";

/// Tolerance when comparing dollar amounts
pub const PRICE_TOLERANCE: f64 = 0.01;

const COURSE_COUNT: usize = 3;
const DISCOUNTED_COURSES: usize = 2;

/// Cart entry `slot` shows the image, name and discount tag of `course`
async fn verify_cart_item(page: &ShoppingCartPage, slot: usize, course: usize) -> E2eResult<()> {
    let item = page.items_in_cart().nth(slot);
    expect(&item.locator("img")).to_be_visible().await?;

    let name = page.course_names().nth(course).text_content().await?;
    expect(&item.locator("h3")).to_have_text(name).await?;

    let tag = page.courses().nth(course).locator(selectors::COURSE_DISCOUNTS);
    if tag.count().await? > 0 {
        expect(&item).to_contain_text(tag.text_content().await?).await?;
    }
    Ok(())
}

async fn verify_cart_items(page: &ShoppingCartPage, courses: &[usize]) -> E2eResult<()> {
    expect(page.items_in_cart()).to_have_count(courses.len()).await?;
    for (slot, &course) in courses.iter().enumerate() {
        verify_cart_item(page, slot, course).await?;
    }
    Ok(())
}

/// Total shown equals Σ (price − discount) over `courses`
async fn verify_total(page: &ShoppingCartPage, courses: &[usize]) -> E2eResult<()> {
    let mut expected = 0.0;
    for &course in courses {
        expected += page.course_price(course).await? - page.course_discount(course).await?;
    }
    let total = page.total_price().await?;
    tracing::debug!(total, expected, "cart total");
    assert_close(total, expected, PRICE_TOLERANCE)
}

/// Order, confirmation and empty cart; shared tail of cases 3 to 5
async fn order_and_verify(page: &ShoppingCartPage, scenario: &mut Scenario, first_step: usize) {
    scenario
        .step(
            format!("{first_step}. Click on the \"Place Order\" button"),
            page.place_order(),
        )
        .await;
    scenario
        .step(
            format!(
                "{}. Validate a success message is displayed with the text \"Your order has been placed.\"",
                first_step + 1
            ),
            expect(page.success_message()).to_contain_text(ORDER_PLACED_TEXT),
        )
        .await;
    scenario
        .step(
            format!("{}. Validate that the cart is empty", first_step + 2),
            expect(page.items_in_cart()).to_have_count(0),
        )
        .await;
}

/// Course list: heading, three complete cards, two discounts, add buttons
pub async fn case_01_available_courses(
    page: ShoppingCartPage,
    mut scenario: Scenario,
) -> Scenario {
    scenario
        .step(
            "2. Validate the heading is \"Available Courses\"",
            expect(page.heading()).to_have_text(HEADING_TEXT),
        )
        .await;
    scenario
        .step(
            "3. Validate that there are 3 courses displayed",
            expect(page.courses()).to_have_count(COURSE_COUNT),
        )
        .await;
    scenario
        .step(
            "4. Validate that each course has an image, name, TechGlobal School tag, and a price of more than zero",
            async {
                for parts in [
                    page.course_images(),
                    page.course_names(),
                    page.school_tags(),
                    page.course_prices(),
                ] {
                    expect(parts).to_have_count(COURSE_COUNT).await?;
                    for part in parts.all().await? {
                        expect(&part).to_be_visible().await?;
                    }
                }
                for course in 0..COURSE_COUNT {
                    let price = page.course_price(course).await?;
                    if price <= 0.0 {
                        return Err(E2eError::value(format!(
                            "course {course} costs {price}, expected more than zero"
                        )));
                    }
                }
                Ok(())
            },
        )
        .await;
    scenario
        .step(
            "5. Validate the first 2 courses have discount tags",
            async {
                for course in 0..DISCOUNTED_COURSES {
                    let tags = page.courses().nth(course).locator(selectors::COURSE_DISCOUNTS);
                    assert_equals(&tags.count().await?, &1)?;
                    expect(&page.course_discounts().nth(course))
                        .to_be_visible()
                        .await?;
                }
                Ok(())
            },
        )
        .await;
    scenario
        .step(
            "6. Validate that there is an \"Add to Cart\" button under each course which is displayed, enabled, and has the text \"Add to Cart\"",
            async {
                for course in 0..COURSE_COUNT {
                    let buttons = page.courses().nth(course).locator("button");
                    assert_equals(&buttons.count().await?, &1)?;
                    let button = page.add_to_cart_buttons().nth(course);
                    expect(&button).to_be_visible().await?;
                    expect(&button).to_be_enabled().await?;
                    expect(&button).to_have_text(ADD_TO_CART_TEXT).await?;
                }
                Ok(())
            },
        )
        .await;
    scenario
}

/// Cart column before anything is added
pub async fn case_02_cart_section(page: ShoppingCartPage, mut scenario: Scenario) -> Scenario {
    scenario
        .step(
            "2. Validate the heading is \"Items Added to Cart\"",
            expect(page.cart_heading()).to_have_text(CART_HEADING_TEXT),
        )
        .await;
    scenario
        .step(
            "3. Validate that the cart is empty by default",
            expect(page.items_in_cart()).to_have_count(0),
        )
        .await;
    scenario
        .step(
            "4. Validate that the total price is zero \"$0\" by default",
            async {
                let shown = page.total_price_display().all_text_contents().await?;
                assert_equals(&money_digits(&shown.join(""))?, &"$0".to_string())
            },
        )
        .await;
    scenario
        .step(
            "5. Validate that there is a \"Place Order\" button is displayed, disabled, and has the text \"Place Order\"",
            async {
                let button = page.place_order_button();
                expect(button).to_be_visible().await?;
                expect(button).to_be_disabled().await?;
                expect(button).to_have_text(PLACE_ORDER_TEXT).await
            },
        )
        .await;
    scenario
}

/// One course through to a placed order
pub async fn case_03_single_course(page: ShoppingCartPage, mut scenario: Scenario) -> Scenario {
    const ADDED: [usize; 1] = [1];

    scenario
        .step(
            "2. Click on the \"Add to Cart\" button for one of the courses",
            page.add_to_cart(ADDED[0]),
        )
        .await;
    scenario
        .step(
            "3. Validate that the course is displayed in the cart with its image, name, and discount amount if available",
            verify_cart_items(&page, &ADDED),
        )
        .await;
    scenario
        .step(
            "4. Validate that the course price is added to the total price excluding the discount amount",
            verify_total(&page, &ADDED),
        )
        .await;
    order_and_verify(&page, &mut scenario, 5).await;
    scenario
}

/// Two courses through to a placed order
pub async fn case_04_two_courses(page: ShoppingCartPage, mut scenario: Scenario) -> Scenario {
    const ADDED: [usize; 2] = [0, 1];

    scenario
        .step(
            "2. Click on the \"Add to Cart\" button for one of the courses",
            page.add_to_cart(ADDED[0]),
        )
        .await;
    scenario
        .step(
            "3. Click on the \"Add to Cart\" button for another course",
            page.add_to_cart(ADDED[1]),
        )
        .await;
    scenario
        .step(
            "4. Validate that the courses are displayed in the cart with their image, name, and discount amount if available",
            verify_cart_items(&page, &ADDED),
        )
        .await;
    scenario
        .step(
            "5. Validate that the course prices are added to the total price excluding the discount amounts",
            verify_total(&page, &ADDED),
        )
        .await;
    order_and_verify(&page, &mut scenario, 6).await;
    scenario
}

/// Every course through to a placed order
pub async fn case_05_all_courses(page: ShoppingCartPage, mut scenario: Scenario) -> Scenario {
    let added = scenario
        .step(
            "2. Click on the \"Add to Cart\" button for all three courses",
            page.add_all_to_cart(),
        )
        .await
        .unwrap_or(COURSE_COUNT);
    let courses: Vec<usize> = (0..added).collect();

    scenario
        .step(
            "3. Validate that the courses are displayed in the cart with their image, name, and discount amount if available",
            verify_cart_items(&page, &courses),
        )
        .await;
    scenario
        .step(
            "4. Validate that the course prices are added to the total price excluding the discount amounts",
            async {
                let expected = page.expected_total(courses.len()).await?;
                assert_close(page.total_price().await?, expected, PRICE_TOLERANCE)
            },
        )
        .await;
    order_and_verify(&page, &mut scenario, 5).await;
    scenario
}
