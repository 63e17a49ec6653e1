//! Domain models.
//!
//! These are the types held in memory and serialized to the wire. The JSON
//! representation is camelCase throughout; populated cart and order line
//! items serialize the joined product under the `productId` key, matching
//! the shape the frontend consumes.

pub mod cart;
pub mod order;
pub mod otp;
pub mod product;
pub mod user;

pub use cart::{Cart, CartLine};
pub use order::{Order, OrderLine, ShippingInfo};
pub use otp::OtpRecord;
pub use product::Product;
pub use user::User;
