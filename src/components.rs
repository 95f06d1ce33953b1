pub mod clipboard;
pub mod controller;
pub mod gateway;
pub mod overlay;
pub mod panel;
pub mod snapshot;
