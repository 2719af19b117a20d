//! Print the frontmost application as one JSON line and exit.
//!
//! Exits with status 1 and no output when no frontmost application exists.

use std::process::ExitCode;

use floatball_lib::focus;

fn main() -> ExitCode {
    let provider = focus::system_provider();
    let mut stdout = std::io::stdout().lock();
    let status = focus::emit(provider.as_ref(), focus::now_ms(), &mut stdout);
    ExitCode::from(status.exit_code())
}
