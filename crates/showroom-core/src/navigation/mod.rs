//! Stateless browse navigation: token codec and view rendering.

pub mod codec;
pub mod navigator;

pub use navigator::{Navigator, product_card};
