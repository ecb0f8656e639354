//! spond-attendance main entrypoint.

use spond_attendance::errors::exit_code;
use spond_attendance::run;
use spond_attendance::ui::messages::error;

fn main() {
    let code = match run() {
        Ok(code) => code,
        Err(e) => {
            error(format!("Error: {e}"));
            e.exit_code()
        }
    };

    if code != exit_code::SUCCESS {
        std::process::exit(code);
    }
}
