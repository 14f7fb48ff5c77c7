use std::process::ExitCode;

fn main() -> ExitCode {
    bookxchange_cli::run()
}
