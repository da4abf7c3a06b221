//! Output helpers shared by the CLI commands.
//!
//! Global flags are stashed in environment variables by `main` so every
//! module can check them without threading state through calls.

/// True when `--json` was passed.
pub fn is_json() -> bool {
    std::env::var("GOATHERD_JSON").map(|v| v == "1").unwrap_or(false)
}

/// True when `--quiet` was passed.
pub fn is_quiet() -> bool {
    std::env::var("GOATHERD_QUIET").map(|v| v == "1").unwrap_or(false)
}

/// Print a machine-readable JSON value to stdout.
pub fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(_) => println!("{value}"),
    }
}
