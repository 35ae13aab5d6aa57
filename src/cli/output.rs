//! User-facing output for the CLI: coloured report lines, the error catalog and JSON.

use std::io::{self, IsTerminal, Write};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::errors::{ErrorRecord, ErrorTag};

// ============================================================================
// REPORT LINES
// ============================================================================

/// `ref:line: [level] message`, or the tag in place of the message.
pub fn format_record(record: &ErrorRecord, print_error_code: bool) -> String {
    let text = if print_error_code {
        record.tag.code().to_string()
    } else {
        record.message()
    };
    format!("{}: [{}] {}", record.position, record.level(), text)
}

/// Writes one line per record, coloured by level.
pub fn write_records<'a, W, I>(out: &mut W, records: I, print_error_code: bool) -> io::Result<()>
where
    W: WriteColor,
    I: IntoIterator<Item = &'a ErrorRecord>,
{
    for record in records {
        out.set_color(&level_color(record.level()))?;
        write!(out, "{}", format_record(record, print_error_code))?;
        out.reset()?;
        writeln!(out)?;
    }
    Ok(())
}

pub fn print_records<'a, I>(records: I, print_error_code: bool) -> io::Result<()>
where
    I: IntoIterator<Item = &'a ErrorRecord>,
{
    let mut stderr = StandardStream::stderr(color_choice(io::stderr().is_terminal()));
    write_records(&mut stderr, records, print_error_code)
}

fn color_choice(terminal: bool) -> ColorChoice {
    if terminal {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

fn level_color(level: u8) -> ColorSpec {
    let mut spec = ColorSpec::new();
    match level {
        1 => spec.set_fg(Some(Color::Red)).set_bold(true),
        2 => spec.set_fg(Some(Color::Red)),
        3 => spec.set_fg(Some(Color::Yellow)),
        _ => spec.set_fg(Some(Color::Cyan)),
    };
    spec
}

// ============================================================================
// CATALOG AND JSON
// ============================================================================

pub fn print_error_catalog() -> io::Result<()> {
    let mut stdout = StandardStream::stdout(color_choice(io::stdout().is_terminal()));
    for tag in ErrorTag::ALL {
        stdout.set_color(ColorSpec::new().set_bold(true))?;
        write!(stdout, "Error: {}", tag.code())?;
        stdout.reset()?;
        writeln!(stdout)?;
        writeln!(stdout, "Level: {}", tag.level())?;
        writeln!(stdout, "Message: {}", tag.template())?;
        writeln!(stdout)?;
    }
    Ok(())
}

/// Serializes records as a JSON array, each with its rendered message.
pub fn records_to_json<'a, I>(records: I) -> serde_json::Result<String>
where
    I: IntoIterator<Item = &'a ErrorRecord>,
{
    let values: Vec<serde_json::Value> = records
        .into_iter()
        .map(|record| {
            serde_json::json!({
                "file": &*record.position.reference,
                "line": record.position.line,
                "code": record.tag,
                "level": record.level(),
                "message": record.message(),
                "args": record.args,
            })
        })
        .collect();
    serde_json::to_string_pretty(&values)
}
