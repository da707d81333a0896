//! FFI crate exposing the Ticklist core to the mobile presentation layer.

pub mod api;
