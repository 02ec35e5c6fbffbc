use std::process::ExitCode;

use squishy::Diagnostic;

mod cli;
mod ui;

fn main() -> ExitCode {
    let settings = match cli::CommandLineInterface::load().into_settings() {
        Ok(settings) => settings,
        Err(error) => return fail(Diagnostic::report(error), false),
    };
    ui::init(ui::level(settings.debug, settings.verbose));

    match settings.run() {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => fail(Diagnostic::report(error), settings.debug),
    }
}

fn fail(diagnostic: Diagnostic, debug: bool) -> ExitCode {
    eprint!("{}", diagnostic.render(debug));
    ExitCode::from(u8::try_from(diagnostic.exit_code()).unwrap_or(1))
}
