pub mod command;
pub mod input;
pub mod run;

pub use run::run_app;
