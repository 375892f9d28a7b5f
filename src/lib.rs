//! Read-only school roster: classrooms and their students over HTTP.

pub mod client;
pub mod config;
pub mod db;
pub mod handlers;
pub mod model;
pub mod server;
pub mod view;
