//! Domain models for the storefront.
//!
//! Row types double as API payloads: they derive `sqlx::FromRow` for reads and
//! serialize in camelCase for clients.

pub mod address;
pub mod cart;
pub mod order;
pub mod product;
pub mod rating;
pub mod store;
pub mod user;

pub use address::{Address, NewAddress};
pub use cart::Cart;
pub use order::{Order, OrderDetails, OrderItem, OrderItemDetails};
pub use product::{NewProduct, Product};
pub use rating::{NewRating, Rating};
pub use store::{NewStore, Store, StoreWithOwner};
pub use user::User;
