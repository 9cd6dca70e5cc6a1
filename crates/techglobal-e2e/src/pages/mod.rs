//! Page objects for the two demo pages.

pub mod shopping_cart;
pub mod todo_list;

pub use shopping_cart::ShoppingCartPage;
pub use todo_list::TodoListPage;
