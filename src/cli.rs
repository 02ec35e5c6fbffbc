//! Command line interface: arguments, interactive prompting and the compile run.

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    time::Instant,
};

use clap::{ArgAction, Parser};
use tracing::{debug, info};
use squishy::{
    CompileError,
    config::VERSION,
    generators::{CodeGenerator, luau::LuauGenerator},
    lexer, parser,
    source::{load_source, write_output},
};

/// compile a Squishy schema (.squishy, .sqy) into a Luau module that writes and reads it
#[derive(Parser, Debug)]
#[command(name = "squishy-compiler", version = VERSION)]
pub struct CommandLineInterface {
    /// schema to compile; prompted for when omitted
    input: Option<PathBuf>,

    /// directory the generated module is written to
    #[arg(short, long, default_value = "./")]
    output: PathBuf,

    /// log every stage and print the call path of errors
    #[arg(long, default_value_t = false)]
    debug: bool,

    /// log each token as well (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// What one run compiles, and how loudly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub input: PathBuf,
    pub output: PathBuf,
    pub debug: bool,
    pub verbose: u8,
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    /// Turns the arguments into settings, asking on stdin when no input was given.
    pub fn into_settings(self) -> Result<Settings, CompileError> {
        match self.input {
            Some(input) => Ok(Settings {
                input,
                output: self.output,
                debug: self.debug,
                verbose: self.verbose,
            }),
            None => {
                let mut settings = interactive(&mut io::stdin().lock(), &mut io::stdout())?;
                settings.verbose = self.verbose;
                Ok(settings)
            }
        }
    }
}

fn ask(input: &mut impl BufRead, output: &mut impl Write, question: &str) -> io::Result<String> {
    write!(output, "{question}")?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}

/// Prompts for the input file, the output directory and debug mode.
pub fn interactive(input: &mut impl BufRead, output: &mut impl Write) -> Result<Settings, CompileError> {
    let source = ask(input, output, "path to the schema: ")?;
    let directory = ask(input, output, "output directory [./]: ")?;
    let debug = ask(input, output, "debug mode? [y/N]: ")?;

    Ok(Settings {
        input: PathBuf::from(source),
        output: PathBuf::from(if directory.is_empty() { "./" } else { &directory }),
        debug: matches!(debug.to_ascii_lowercase().as_str(), "y" | "yes"),
        verbose: 0,
    })
}

impl Settings {
    /// Compiles the input and writes the module, returning where it was written.
    pub fn run(&self) -> Result<PathBuf, CompileError> {
        let started = Instant::now();
        info!("squishy-compiler {VERSION}");

        let source = load_source(&self.input)?;
        let tokens = lexer::scan(&source)?;
        if self.debug {
            for token in tokens.tokens() {
                debug!("{} {} '{}' at {}", token.index, token.kind, token.lexeme, token.position);
            }
        }

        let schema = parser::parse(&tokens)?;
        let mut generator = LuauGenerator::default().with_output_dir(&self.output);

        let mut written = Vec::new();
        for (name, content) in generator.generate(&schema)? {
            written.push(write_output(&self.output, &name, &content)?);
        }

        let path = written.pop().unwrap_or_else(|| self.output.clone());
        info!(
            "compiled in {:.2?}, output written to '{}'",
            started.elapsed(),
            path.display()
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use std::{env, fs, io::Cursor};

    use super::*;

    #[test]
    fn test_arguments() {
        let cli = CommandLineInterface::try_parse_from([
            "squishy-compiler",
            "schema.sqy",
            "-o",
            "out",
            "--debug",
            "-vv",
        ])
        .unwrap();
        assert_eq!(
            cli.into_settings().unwrap(),
            Settings {
                input: PathBuf::from("schema.sqy"),
                output: PathBuf::from("out"),
                debug: true,
                verbose: 2,
            }
        );
    }

    #[test]
    fn test_output_defaults_to_working_directory() {
        let cli = CommandLineInterface::try_parse_from(["squishy-compiler", "a.squishy"]).unwrap();
        let settings = cli.into_settings().unwrap();
        assert_eq!(settings.output, PathBuf::from("./"));
        assert!(!settings.debug);
    }

    #[test]
    fn test_interactive() {
        let mut answers = Cursor::new("schema.squishy\n\nY\n");
        let mut prompts = Vec::new();

        let settings = interactive(&mut answers, &mut prompts).unwrap();

        assert_eq!(settings.input, PathBuf::from("schema.squishy"));
        assert_eq!(settings.output, PathBuf::from("./"));
        assert!(settings.debug);
        assert!(String::from_utf8(prompts).unwrap().starts_with("path to the schema: "));
    }

    #[test]
    fn test_run_writes_module() {
        let dir = env::temp_dir().join(format!("squishy-cli-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let input = dir.join("point.squishy");
        fs::write(&input, "struct Point { field x : f32 field y : f32 } exports Point").unwrap();

        let settings = Settings {
            input,
            output: dir.clone(),
            debug: true,
            verbose: 0,
        };
        let path = settings.run().unwrap();

        assert_eq!(path, dir.join("Point.luau"));
        assert!(fs::read_to_string(path).unwrap().contains("function scheme.read(buff : buffer) : Point"));
    }
}
