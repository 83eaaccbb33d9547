use std::process::ExitCode;

fn main() -> ExitCode {
    basketwise_cli::run()
}
