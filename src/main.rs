use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let path = env::args_os().nth(1).map(PathBuf::from);
    match femto::editor::run(path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Raw mode is already restored by the guard's drop.
            eprintln!("femto: {err}");
            ExitCode::FAILURE
        }
    }
}
