//! Terminal output helpers

mod cli;

pub use cli::print_error;
