//! In-process double of the shopping cart app.

use super::dom::Node;
use crate::pages::shopping_cart::{
    ADD_TO_CART_TEXT, CART_HEADING_TEXT, HEADING_TEXT, ORDER_PLACED_TEXT, PLACE_ORDER_TEXT,
};

/// A course offered on the page
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    /// Course title
    pub name: String,
    /// Full price in dollars
    pub price: f64,
    /// Discount in percent, if the course is discounted
    pub discount_percent: Option<f64>,
}

impl Course {
    fn new(name: &str, price: f64, discount_percent: Option<f64>) -> Self {
        Self {
            name: name.to_string(),
            price,
            discount_percent,
        }
    }

    /// Price after discount
    #[must_use]
    pub fn net_price(&self) -> f64 {
        self.price - self.price * self.discount_percent.unwrap_or(0.0) / 100.0
    }
}

/// The three courses the demo page lists
#[must_use]
pub fn default_catalog() -> Vec<Course> {
    vec![
        Course::new("SDET Course | Cypress Playwright", 100.0, Some(10.0)),
        Course::new("Playwright Automation Testing", 50.0, Some(20.0)),
        Course::new("Cypress Automation Course", 100.0, None),
    ]
}

/// Format dollars the way the page does (`$90`, `$12.50`)
#[must_use]
pub fn format_money(amount: f64) -> String {
    // an empty sum is -0.0
    let amount = amount + 0.0;
    if amount.fract().abs() < f64::EPSILON {
        format!("${amount:.0}")
    } else {
        format!("${amount:.2}")
    }
}

/// Cart state and rendering
#[derive(Debug, Clone)]
pub struct CartApp {
    catalog: Vec<Course>,
    cart: Vec<usize>,
    order_placed: bool,
}

impl Default for CartApp {
    fn default() -> Self {
        Self::new(default_catalog())
    }
}

impl CartApp {
    /// App listing `catalog`
    #[must_use]
    pub fn new(catalog: Vec<Course>) -> Self {
        Self {
            catalog,
            cart: Vec::new(),
            order_placed: false,
        }
    }

    /// Sum of net prices in the cart
    #[must_use]
    pub fn total(&self) -> f64 {
        self.cart
            .iter()
            .map(|&i| self.catalog[i].net_price())
            .fold(0.0, |total, price| total + price)
    }

    /// Apply a click handler
    pub fn click(&mut self, handler: &str) {
        match handler.split_once(':') {
            Some(("add", index)) => {
                if let Ok(i) = index.parse::<usize>() {
                    if i < self.catalog.len() && !self.cart.contains(&i) {
                        self.cart.push(i);
                        self.order_placed = false;
                    }
                }
            }
            _ if handler == "order" && !self.cart.is_empty() => {
                self.cart.clear();
                self.order_placed = true;
            }
            _ => tracing::trace!(handler, "unhandled click"),
        }
    }

    fn discount_text(course: &Course) -> Option<String> {
        course
            .discount_percent
            .map(|pct| format!("({pct:.0}% OFF)"))
    }

    fn course_card(&self, index: usize, course: &Course) -> Node {
        let mut content = Node::new("div")
            .class("card-content")
            .child(Node::new("h3").class("is-size-6 has-text-black").text(&course.name))
            .child(Node::new("p").class("my-3").text("TechGlobal School"))
            .child(
                Node::new("p")
                    .attr("data-testid", "full-price")
                    .text("Price:")
                    .child(Node::new("strong").text(&format_money(course.price))),
            );
        if let Some(discount) = Self::discount_text(course) {
            content = content.child(
                Node::new("p")
                    .class("has-text-danger")
                    .attr("data-testid", "discount")
                    .text(&discount),
            );
        }
        content = content.child(
            Node::new("button")
                .class("button is-primary")
                .text(ADD_TO_CART_TEXT)
                .disabled(self.cart.contains(&index))
                .on_click(format!("add:{index}")),
        );

        Node::new("div")
            .id(&format!("course-{}", index + 1))
            .class("card mb-4")
            .child(
                Node::new("img")
                    .attr("src", &format!("/images/course-{}.png", index + 1))
                    .attr("alt", &course.name),
            )
            .child(content)
    }

    fn cart_item(course: &Course, index: usize) -> Node {
        let mut item = Node::new("div")
            .class("course-card-content mb-3")
            .child(
                Node::new("img")
                    .attr("src", &format!("/images/course-{}.png", index + 1))
                    .attr("alt", &course.name),
            )
            .child(Node::new("h3").text(&course.name))
            .child(
                Node::new("p")
                    .class("is-size-7")
                    .text(&format_money(course.price)),
            );
        if let Some(discount) = Self::discount_text(course) {
            item = item.child(Node::new("p").class("is-size-7").text(&discount));
        }
        item
    }

    /// Render the page
    #[must_use]
    pub fn render(&self) -> Node {
        let courses = self
            .catalog
            .iter()
            .enumerate()
            .map(|(i, c)| self.course_card(i, c));
        let items = self
            .cart
            .iter()
            .map(|&i| Self::cart_item(&self.catalog[i], i));

        let mut cart = Node::new("div")
            .class("column")
            .child(Node::new("p").class("mb-2 is-size-4").text(CART_HEADING_TEXT))
            .children(items)
            .child(
                Node::new("p")
                    .id("total-price")
                    .text(&format!("Total: {}", format_money(self.total()))),
            );
        if self.order_placed {
            cart = cart.child(
                Node::new("div")
                    .class("notification is-success")
                    .text(ORDER_PLACED_TEXT),
            );
        }
        cart = cart.child(
            Node::new("button")
                .class("button is-link is-fullwidth")
                .text(PLACE_ORDER_TEXT)
                .disabled(self.cart.is_empty())
                .on_click("order"),
        );

        let columns = Node::new("div")
            .class("columns")
            .child(
                Node::new("div")
                    .class("column")
                    .child(Node::new("h1").class("mt-2 is-size-3").text(HEADING_TEXT))
                    .children(courses),
            )
            .child(cart);

        super::page_shell("Shopping Cart", columns)
    }
}
