//! CLI error output
//!
//! Prints an error followed by its chain of causes.

use std::error::Error;

/// Print an error and every cause below it
pub fn print_error(e: &dyn Error) {
    eprintln!("❌ {e}");
    for cause in causes(e) {
        eprintln!("   caused by: {cause}");
    }
}

fn causes(e: &dyn Error) -> Vec<String> {
    let mut out = Vec::new();
    let mut source = e.source();
    while let Some(cause) = source {
        out.push(cause.to_string());
        source = cause.source();
    }
    out
}
