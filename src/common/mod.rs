pub mod envelope;
pub mod events;
pub mod json_guard;
pub mod rejection;
