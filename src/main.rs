// cpp-name-prettifier: canonical output for demangled C++ names

use std::fmt;
use std::io::{self, BufRead, Write};

use crossterm::style::Stylize;
use crossterm::tty::IsTty;

use cpp_name_prettifier::parser::parser::Parser;
use cpp_name_prettifier::{remove_template_details, PrintConfig, PrintVisitor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Type,
    Function,
}

#[derive(Debug)]
struct Options {
    mode: Mode,
    config: PrintConfig,
    names: Vec<String>,
    help: bool,
}

/// CLI error type
#[derive(Debug)]
enum CliError {
    Usage(String),
    Io(io::Error),
    Format(fmt::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Usage(message) => write!(f, "{}", message),
            CliError::Io(err) => write!(f, "I/O error: {}", err),
            CliError::Format(_) => write!(f, "failed to format output"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Usage(_) => None,
            CliError::Io(err) => Some(err),
            CliError::Format(err) => Some(err),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Io(err)
    }
}

impl From<fmt::Error> for CliError {
    fn from(err: fmt::Error) -> Self {
        CliError::Format(err)
    }
}

fn print_usage(program_name: &str) {
    eprintln!(
        "Usage: {} [--type | --function] [--alias FROM=TO]... [--ignore NAME]... [NAME]...",
        program_name
    );
    eprintln!();
    eprintln!("Prints the canonical form of each demangled C++ NAME, one per line.");
    eprintln!("Without NAME arguments, names are read from stdin, one per line.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --type             Treat names as types (default)");
    eprintln!("  --function         Treat names as function signatures");
    eprintln!("  --alias FROM=TO    Print identifier FROM as TO");
    eprintln!("  --ignore NAME      Drop scope NAME entirely");
    eprintln!("  -h, --help         Show this message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} 'std::vector<int, std::allocator<int>>'", program_name);
    eprintln!(
        "  {} --function 'void (anonymous namespace)::foo(int)'",
        program_name
    );
}

fn parse_args<I: Iterator<Item = String>>(mut args: I) -> Result<Options, CliError> {
    let mut options = Options {
        mode: Mode::Type,
        config: PrintConfig::default(),
        names: Vec::new(),
        help: false,
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--type" => options.mode = Mode::Type,
            "--function" => options.mode = Mode::Function,
            "--alias" => {
                let value = args
                    .next()
                    .ok_or_else(|| CliError::Usage("--alias expects FROM=TO".to_string()))?;
                let Some((from, to)) = value.split_once('=') else {
                    return Err(CliError::Usage(format!(
                        "invalid alias '{}', expected FROM=TO",
                        value
                    )));
                };
                options.config = options.config.with_alias(from, to);
            }
            "--ignore" => {
                let name = args
                    .next()
                    .ok_or_else(|| CliError::Usage("--ignore expects a NAME".to_string()))?;
                options.config = options.config.with_ignored(name);
            }
            "-h" | "--help" => options.help = true,
            "--" => options.names.extend(args.by_ref()),
            other if other.starts_with("--") => {
                return Err(CliError::Usage(format!("unknown option '{}'", other)));
            }
            _ => options.names.push(arg),
        }
    }

    Ok(options)
}

/// Returns the printed name and whether the parser recognized it.
fn prettify(mode: Mode, raw: &str, config: &PrintConfig) -> Result<(String, bool), CliError> {
    let result = match mode {
        Mode::Type => Parser::new(raw).parse_type(),
        Mode::Function => Parser::new(remove_template_details(raw)).parse_function(),
    };

    let mut visitor = PrintVisitor::with_config(String::new(), config);
    result.accept(&mut visitor);

    Ok((visitor.finish()?, result.is_recognized()))
}

fn warn_unrecognized(raw: &str) {
    if io::stderr().is_tty() {
        eprintln!("{} unrecognized name: {}", "warning:".yellow().bold(), raw);
    } else {
        eprintln!("warning: unrecognized name: {}", raw);
    }
}

fn run(options: &Options) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut process = |raw: &str| -> Result<(), CliError> {
        let (pretty, recognized) = prettify(options.mode, raw, &options.config)?;
        if !recognized {
            warn_unrecognized(raw);
        }
        writeln!(out, "{}", pretty)?;
        Ok(())
    };

    if options.names.is_empty() {
        for line in io::stdin().lock().lines() {
            let line = line?;
            if !line.trim().is_empty() {
                process(line.trim_end_matches('\r'))?;
            }
        }
    } else {
        for name in &options.names {
            process(name)?;
        }
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args();
    let program_name = args
        .next()
        .unwrap_or_else(|| "cpp-name-prettifier".to_string());

    let options = match parse_args(args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_usage(&program_name);
            std::process::exit(2);
        }
    };

    if options.help {
        print_usage(&program_name);
        return Ok(());
    }

    log::debug!(
        "mode {:?}, {} name(s) from arguments",
        options.mode,
        options.names.len()
    );
    run(&options)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn test_parse_args_defaults() {
        let options = parse_args(args(&["foo", "bar"])).unwrap();
        assert_eq!(options.mode, Mode::Type);
        assert_eq!(options.names, vec!["foo", "bar"]);
        assert!(!options.help);
    }

    #[test]
    fn test_parse_args_options() {
        let options = parse_args(args(&[
            "--function",
            "--alias",
            "std=s",
            "--ignore",
            "v1",
            "--",
            "--not-an-option",
        ]))
        .unwrap();
        assert_eq!(options.mode, Mode::Function);
        assert_eq!(options.config.alias("std"), Some("s"));
        assert!(options.config.is_ignored("v1"));
        assert_eq!(options.names, vec!["--not-an-option"]);
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(matches!(parse_args(args(&["--alias"])), Err(CliError::Usage(_))));
        assert!(matches!(parse_args(args(&["--alias", "nope"])), Err(CliError::Usage(_))));
        assert!(matches!(parse_args(args(&["--bogus"])), Err(CliError::Usage(_))));
    }

    #[test]
    fn test_prettify_reports_recognition() {
        let config = PrintConfig::default();
        let (pretty, recognized) = prettify(Mode::Type, "foo<int>", &config).unwrap();
        assert_eq!(pretty, "foo<...>");
        assert!(recognized);

        let (pretty, recognized) = prettify(Mode::Function, "Hello, World!", &config).unwrap();
        assert_eq!(pretty, "Hello, World!");
        assert!(!recognized);
    }
}
