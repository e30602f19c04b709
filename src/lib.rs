pub mod common;
pub mod config;
pub mod feed;
pub mod observability;
pub mod pipeline;
pub mod publisher;
pub mod translator;
