use crate::driver;
use crate::error::Error;
use std::env;
use std::io::{self, Write};
use std::path::Path;

const USAGE: &str = "Usage: lumen [script]";

const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

pub fn run_main() -> Result<(), i32> {
    let args: Vec<String> = env::args().skip(1).collect();
    run_main_with_args(&args)
}

pub fn run_main_with_args(args: &[String]) -> Result<(), i32> {
    handle_args(args)
}

pub fn handle_args(args: &[String]) -> Result<(), i32> {
    match args.len() {
        0 => {
            eprintln!("{}", USAGE);
            Err(1)
        }
        1 => run_file(&args[0]),
        _ => {
            eprintln!("{}", USAGE);
            Err(64) // Standard exit code for command-line usage error
        }
    }
}

pub fn run_file(path: &str) -> Result<(), i32> {
    let stdout = io::stdout();
    let stderr = io::stderr();
    let mut err = stderr.lock();
    run_file_with_io(path, stdout.lock(), &mut err, use_color())
}

/// Runs the script at `path`, sending program output to `out` and any
/// reported error to `err`.
pub fn run_file_with_io<W, E>(path: &str, out: W, err: &mut E, color: bool) -> Result<(), i32>
where
    W: Write,
    E: Write,
{
    match driver::run_file(Path::new(path), out) {
        Ok(_) => Ok(()),
        Err(error) => {
            if let Err(io_error) = report(err, &error, color) {
                log::warn!("failed to report error: {}", io_error);
            }
            Err(exit_code(&error))
        }
    }
}

/// Process exit code for a failed run.
pub fn exit_code(error: &Error) -> i32 {
    match error {
        Error::Diagnostics(_) => 65, // Data format error
        Error::Runtime(_) => 70,     // Internal software error
        Error::Io { .. } => 74,      // I/O error
    }
}

fn report<E: Write>(err: &mut E, error: &Error, color: bool) -> io::Result<()> {
    let (red, dim, reset) = if color { (RED, DIM, RESET) } else { ("", "", "") };
    match error {
        Error::Diagnostics(diagnostics) => {
            for diagnostic in diagnostics.iter() {
                writeln!(err, "{}{}{}", red, diagnostic, reset)?;
            }
        }
        Error::Runtime(failure) => {
            writeln!(err, "{}{}{}", red, failure, reset)?;
            for entry in &failure.trace {
                writeln!(err, "{}{}{}", dim, entry, reset)?;
            }
        }
        Error::Io { .. } => writeln!(err, "{}{}{}", red, error, reset)?,
    }
    err.flush()
}

/// Colors are used only when standard error is a terminal and `NO_COLOR`
/// is unset.
fn use_color() -> bool {
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }
    #[cfg(unix)]
    {
        unsafe { libc::isatty(libc::STDERR_FILENO) != 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}
