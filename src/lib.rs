pub mod api;
pub mod app;
pub mod cancel;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod prelude;
pub mod session;
