//! Storefront entities and the pure rules that act on them.
//!
//! Nothing in this module performs I/O; services load data through the
//! stores and call into these functions.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod notification;
pub mod order;
pub mod rating;
pub mod sidebar;
