pub mod client;
pub mod config;
pub mod models;
pub mod operations;

pub use client::{ClientConfig, Credentials, Error, RedditClient, Request, Result};
pub use models::{Kind, Listing, Thing};
