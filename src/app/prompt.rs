// TesterMatch - app/prompt.rs
//
// Interactive query loop. Prompts for countries and devices, validates the
// input, runs the query, and writes the results. Generic over the input and
// output streams so tests can drive it with in-memory buffers.

use crate::app::state::AppState;
use crate::core::export::write_rows;
use crate::core::query::Query;
use crate::util::constants::{
    INPUT_ERROR_MSG, LIST_COMMAND, QUERY_INPUT_PATTERN, QUIT_COMMAND, RELOAD_COMMAND,
    RESULTS_BANNER,
};
use crate::util::error::{QueryError, Result, TesterMatchError};
use regex::Regex;
use std::io::{BufRead, Write};
use std::sync::OnceLock;

/// One line of user input, after normalisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptInput {
    Quit,
    Reload,
    List,
    Field(String),
}

impl PromptInput {
    pub fn parse(raw: &str) -> Self {
        let line = normalise_input(raw);
        match line.as_str() {
            QUIT_COMMAND => Self::Quit,
            RELOAD_COMMAND => Self::Reload,
            LIST_COMMAND => Self::List,
            _ => Self::Field(line),
        }
    }
}

/// Trim, lowercase, and drop the space after each comma.
pub fn normalise_input(raw: &str) -> String {
    raw.trim().to_lowercase().replace(", ", ",")
}

/// Check a normalised field: empty, or comma-separated word terms.
pub fn validate_field(field: &'static str, input: &str) -> std::result::Result<(), QueryError> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        // The pattern is a constant covered by the tests below.
        Regex::new(QUERY_INPUT_PATTERN).expect("QUERY_INPUT_PATTERN: invalid regex")
    });

    if input.is_empty() || pattern.is_match(input) {
        Ok(())
    } else {
        Err(QueryError::InvalidInput {
            field,
            input: input.to_string(),
        })
    }
}

/// What the loop should do after reading one field.
enum Step {
    Continue(String),
    Restart,
    Exit,
}

/// Run the query loop until `\q` or end of input.
pub fn run_prompt<R: BufRead, W: Write>(
    state: &mut AppState,
    mut input: R,
    mut output: W,
) -> Result<()> {
    loop {
        let countries = match read_field(state, "country", &mut input, &mut output)? {
            Step::Continue(text) => text,
            Step::Restart => continue,
            Step::Exit => return Ok(()),
        };
        let devices = match read_field(state, "device", &mut input, &mut output)? {
            Step::Continue(text) => text,
            Step::Restart => continue,
            Step::Exit => return Ok(()),
        };

        let rows = state.run_query(&Query::from_fields(&countries, &devices));
        writeln!(output, "{RESULTS_BANNER}").map_err(io_error)?;
        write_rows(&rows, state.format, &mut output)?;
        writeln!(output).map_err(io_error)?;
    }
}

fn read_field<R: BufRead, W: Write>(
    state: &mut AppState,
    field: &'static str,
    input: &mut R,
    output: &mut W,
) -> Result<Step> {
    write!(
        output,
        "Enter a {field} or a comma-separated list of each {field}, or \"all\" for every {field}"
    )
    .map_err(io_error)?;
    writeln!(output, " (enter to skip, {QUIT_COMMAND} to quit)").map_err(io_error)?;
    writeln!(output, "{field}: ").map_err(io_error)?;
    output.flush().map_err(io_error)?;

    // Non-UTF-8 input is rejected by validation like any other bad line.
    let mut buf = Vec::new();
    let read = input
        .read_until(b'\n', &mut buf)
        .map_err(|source| TesterMatchError::Io {
            operation: "reading query input",
            source,
        })?;
    if read == 0 {
        tracing::debug!("End of input; leaving query loop");
        return Ok(Step::Exit);
    }
    let line = String::from_utf8_lossy(&buf);

    match PromptInput::parse(&line) {
        PromptInput::Quit => Ok(Step::Exit),
        PromptInput::Reload => {
            match state.reload() {
                Ok(()) => writeln!(output, "Data reloaded").map_err(io_error)?,
                Err(e) => {
                    tracing::warn!(error = %e, "Reload failed; keeping previous data");
                    writeln!(output, "Reload failed, keeping previous data: {e}")
                        .map_err(io_error)?;
                }
            }
            Ok(Step::Restart)
        }
        PromptInput::List => {
            let repo = state.repository();
            writeln!(output, "Countries: {}", repo.countries().join(", ")).map_err(io_error)?;
            writeln!(output, "Devices: {}", repo.devices().join(", ")).map_err(io_error)?;
            Ok(Step::Restart)
        }
        PromptInput::Field(text) => match validate_field(field, &text) {
            Ok(()) => Ok(Step::Continue(text)),
            Err(e) => {
                tracing::debug!(error = %e, "Rejected query input");
                writeln!(output, "{INPUT_ERROR_MSG}").map_err(io_error)?;
                Ok(Step::Restart)
            }
        },
    }
}

fn io_error(source: std::io::Error) -> TesterMatchError {
    TesterMatchError::Io {
        operation: "writing query output",
        source,
    }
}
