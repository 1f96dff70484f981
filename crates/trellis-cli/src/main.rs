use std::process::ExitCode;

fn main() -> ExitCode {
    match trellis_core::run(std::env::args_os().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("trellis: {err:#}");
            ExitCode::FAILURE
        }
    }
}
