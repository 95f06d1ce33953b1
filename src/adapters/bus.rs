pub mod errors;
pub mod message_bus;
