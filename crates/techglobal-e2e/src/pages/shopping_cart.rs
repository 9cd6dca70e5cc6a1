//! Shopping cart demo page (project 8).

use crate::driver::Session;
use crate::helpers::{parse_discount, parse_price};
use crate::locator::Locator;
use crate::page_object::PageObject;
use crate::result::E2eResult;

/// Selector table for the shopping cart
pub mod selectors {
    /// "Available Courses" heading
    pub const HEADING: &str = ".mt-2";
    /// Course cards
    pub const COURSES: &str = "[id^=\"course\"]";
    /// Course images
    pub const COURSE_IMAGES: &str = "[id^=\"course\"] img";
    /// Course names
    pub const COURSE_NAMES: &str = "[id^=\"course\"] h3";
    /// "TechGlobal School" tags
    pub const SCHOOL_TAGS: &str = "[id^=\"course\"] .my-3";
    /// Full price of every course
    pub const COURSE_PRICES: &str = "[data-testid=\"full-price\"] strong";
    /// Discount tags (only on discounted courses)
    pub const COURSE_DISCOUNTS: &str = "[data-testid=\"discount\"]";
    /// "Add to Cart" buttons
    pub const ADD_TO_CART_BUTTONS: &str = "[id^=\"course\"] button";
    /// "Items Added to Cart" heading
    pub const CART_HEADING: &str = ".mb-2";
    /// Cart entries
    pub const ITEMS_IN_CART: &str = ".course-card-content";
    /// "Total: $N"
    pub const TOTAL_PRICE: &str = "#total-price";
    /// Page columns; the last one holds the cart
    pub const COLUMNS: &str = ".columns > div";
    /// Order confirmation
    pub const SUCCESS_MESSAGE: &str = ".is-success";
}

/// Path of the cart page below the base URL
pub const PATH: &str = "project-8";
/// Text of the course list heading
pub const HEADING_TEXT: &str = "Available Courses";
/// Text of the cart heading
pub const CART_HEADING_TEXT: &str = "Items Added to Cart";
/// Text on every add-to-cart button
pub const ADD_TO_CART_TEXT: &str = "Add to Cart";
/// Text on the place-order button
pub const PLACE_ORDER_TEXT: &str = "Place Order";
/// Confirmation after a successful order
pub const ORDER_PLACED_TEXT: &str = "Your order has been placed.";

/// Page object for the shopping cart
#[derive(Debug, Clone)]
pub struct ShoppingCartPage {
    session: Session,
    heading: Locator,
    courses: Locator,
    course_images: Locator,
    course_names: Locator,
    school_tags: Locator,
    course_prices: Locator,
    course_discounts: Locator,
    add_to_cart_buttons: Locator,
    cart_heading: Locator,
    items_in_cart: Locator,
    total_price: Locator,
    place_order_button: Locator,
    success_message: Locator,
}

impl PageObject for ShoppingCartPage {
    const SHARED_STATE: &'static str = "shopping-cart";

    fn new(session: Session) -> Self {
        Self {
            heading: session.locator(selectors::HEADING),
            courses: session.locator(selectors::COURSES),
            course_images: session.locator(selectors::COURSE_IMAGES),
            course_names: session.locator(selectors::COURSE_NAMES),
            school_tags: session.locator(selectors::SCHOOL_TAGS),
            course_prices: session.locator(selectors::COURSE_PRICES),
            course_discounts: session.locator(selectors::COURSE_DISCOUNTS),
            add_to_cart_buttons: session.locator(selectors::ADD_TO_CART_BUTTONS),
            cart_heading: session.locator(selectors::CART_HEADING),
            items_in_cart: session.locator(selectors::ITEMS_IN_CART),
            total_price: session.locator(selectors::TOTAL_PRICE),
            place_order_button: session.locator(selectors::COLUMNS).last().locator("button"),
            success_message: session.locator(selectors::SUCCESS_MESSAGE),
            session,
        }
    }

    fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self) -> String {
        self.session.config().url(PATH)
    }
}

impl ShoppingCartPage {
    /// "Available Courses" heading
    #[must_use]
    pub const fn heading(&self) -> &Locator {
        &self.heading
    }

    /// Course cards
    #[must_use]
    pub const fn courses(&self) -> &Locator {
        &self.courses
    }

    /// Course images
    #[must_use]
    pub const fn course_images(&self) -> &Locator {
        &self.course_images
    }

    /// Course names
    #[must_use]
    pub const fn course_names(&self) -> &Locator {
        &self.course_names
    }

    /// School tags
    #[must_use]
    pub const fn school_tags(&self) -> &Locator {
        &self.school_tags
    }

    /// Course prices
    #[must_use]
    pub const fn course_prices(&self) -> &Locator {
        &self.course_prices
    }

    /// Discount tags
    #[must_use]
    pub const fn course_discounts(&self) -> &Locator {
        &self.course_discounts
    }

    /// Add-to-cart buttons
    #[must_use]
    pub const fn add_to_cart_buttons(&self) -> &Locator {
        &self.add_to_cart_buttons
    }

    /// Cart heading
    #[must_use]
    pub const fn cart_heading(&self) -> &Locator {
        &self.cart_heading
    }

    /// Cart entries
    #[must_use]
    pub const fn items_in_cart(&self) -> &Locator {
        &self.items_in_cart
    }

    /// Total price display
    #[must_use]
    pub const fn total_price_display(&self) -> &Locator {
        &self.total_price
    }

    /// Place-order button
    #[must_use]
    pub const fn place_order_button(&self) -> &Locator {
        &self.place_order_button
    }

    /// Order confirmation
    #[must_use]
    pub const fn success_message(&self) -> &Locator {
        &self.success_message
    }

    /// Click the add-to-cart control of course `index`.
    ///
    /// Waits for the button collection to reach `index` first.
    ///
    /// # Errors
    ///
    /// Returns [`crate::E2eError::IndexOutOfRange`] if fewer than `index + 1`
    /// courses appear within the action timeout
    pub async fn add_to_cart(&self, index: usize) -> E2eResult<()> {
        self.add_to_cart_buttons.wait_for_index(index).await?;
        tracing::debug!(index, "add to cart");
        self.add_to_cart_buttons.nth(index).click().await
    }

    /// Add every listed course, in order
    ///
    /// # Errors
    ///
    /// Stops at the first course that cannot be added
    pub async fn add_all_to_cart(&self) -> E2eResult<usize> {
        let count = self.add_to_cart_buttons.count().await?;
        for index in 0..count {
            self.add_to_cart(index).await?;
        }
        Ok(count)
    }

    /// Click "Place Order"
    ///
    /// # Errors
    ///
    /// Returns error if the button stays disabled (empty cart)
    pub async fn place_order(&self) -> E2eResult<()> {
        self.place_order_button.click().await
    }

    /// Number of cart entries
    ///
    /// # Errors
    ///
    /// Returns error if the session is closed
    pub async fn cart_count(&self) -> E2eResult<usize> {
        self.items_in_cart.count().await
    }

    /// Full price of course `index`
    ///
    /// # Errors
    ///
    /// Returns error if the card or its price cannot be read
    pub async fn course_price(&self, index: usize) -> E2eResult<f64> {
        let text = self
            .courses
            .nth(index)
            .locator(selectors::COURSE_PRICES)
            .text_content()
            .await?;
        parse_price(&text)
    }

    /// Discount amount of course `index`; 0 when the card has no tag
    ///
    /// # Errors
    ///
    /// Returns error if the card cannot be read
    pub async fn course_discount(&self, index: usize) -> E2eResult<f64> {
        let tag = self.courses.nth(index).locator(selectors::COURSE_DISCOUNTS);
        if tag.count().await? == 0 {
            return Ok(0.0);
        }
        let price = self.course_price(index).await?;
        parse_discount(&tag.text_content().await?, price)
    }

    /// Amount shown in the total display
    ///
    /// # Errors
    ///
    /// Returns error if the display is missing or holds no amount
    pub async fn total_price(&self) -> E2eResult<f64> {
        parse_price(&self.total_price.text_content().await?)
    }

    /// Σ (price − discount) over the first `count` courses
    ///
    /// # Errors
    ///
    /// Returns error if any of those cards cannot be read
    pub async fn expected_total(&self, count: usize) -> E2eResult<f64> {
        let mut total = 0.0;
        for index in 0..count {
            total += self.course_price(index).await? - self.course_discount(index).await?;
        }
        Ok(total)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::SuiteConfig;
    use crate::doubles::DemoSite;
    use crate::result::E2eError;

    async fn open() -> ShoppingCartPage {
        let config = SuiteConfig::default()
            .with_expect_timeout(200)
            .with_action_timeout(200)
            .with_poll_interval(5);
        let page = ShoppingCartPage::new(Session::new(DemoSite::new(&config), config));
        page.navigate().await.unwrap();
        page
    }

    mod reading_tests {
        use super::*;

        #[tokio::test]
        async fn test_prices_and_discounts() {
            let page = open().await;
            for index in 0..3 {
                assert!(page.course_price(index).await.unwrap() > 0.0);
            }
            assert!(page.course_discount(0).await.unwrap() > 0.0);
            assert!(page.course_discount(1).await.unwrap() > 0.0);
            assert_eq!(page.course_discount(2).await.unwrap(), 0.0);
        }

        #[tokio::test]
        async fn test_empty_cart_total_is_zero() {
            let page = open().await;
            assert_eq!(page.total_price().await.unwrap(), 0.0);
            assert_eq!(page.expected_total(0).await.unwrap(), 0.0);
            assert_eq!(page.cart_count().await.unwrap(), 0);
        }
    }

    mod action_tests {
        use super::*;

        #[tokio::test]
        async fn test_add_to_cart_updates_total() {
            let page = open().await;
            page.add_to_cart(0).await.unwrap();
            page.add_to_cart(1).await.unwrap();
            let expected = page.expected_total(2).await.unwrap();
            let total = page.total_price().await.unwrap();
            assert!((total - expected).abs() < 0.01);
        }

        #[tokio::test]
        async fn test_add_out_of_range() {
            let page = open().await;
            let err = page.add_to_cart(7).await.unwrap_err();
            assert!(matches!(
                err,
                E2eError::IndexOutOfRange {
                    index: 7,
                    len: 3,
                    ..
                }
            ));
            assert_eq!(page.cart_count().await.unwrap(), 0);
        }

        #[tokio::test]
        async fn test_add_all_then_order() {
            let page = open().await;
            assert_eq!(page.add_all_to_cart().await.unwrap(), 3);
            assert_eq!(page.cart_count().await.unwrap(), 3);
            page.place_order().await.unwrap();
            assert_eq!(page.cart_count().await.unwrap(), 0);
            assert_eq!(
                page.success_message().text_content().await.unwrap(),
                ORDER_PLACED_TEXT
            );
        }
    }
}
