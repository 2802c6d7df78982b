use anyhow::Context;
use glob::Pattern;
use rusty_timetable::export;
use rusty_timetable::spreadsheet::load_grid;
use rusty_timetable::Criteria;
use rusty_timetable::ExtractOptions;
use rusty_timetable::Range;
use rusty_timetable::YearDigits;
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;

const USAGE: &str = "Usage: rusty_timetable <workbook.xlsx> [--sheet <glob>] [--range <A1:R60>] \
[--skip-label <label>] [--year-digits two|four|either] [--time-offset <n>]... [--bare-digit-times] [--output <path>]";

#[derive(Error, Debug, PartialEq)]
enum ArgumentError {
    #[error("Missing workbook path")]
    MissingWorkbook,

    #[error("{0} requires a value")]
    MissingValue(String),

    #[error("Invalid value for {flag} '{value}': {reason}")]
    InvalidValue { flag: String, value: String, reason: String },

    #[error("Unknown argument '{0}'")]
    UnknownArgument(String),
}

#[derive(Debug)]
struct Arguments {
    workbook: PathBuf,
    criteria: Criteria,
    options: ExtractOptions,
    output: Option<PathBuf>,
}

fn invalid(flag: &str, value: &str, reason: impl ToString) -> ArgumentError {
    ArgumentError::InvalidValue {
        flag: flag.to_owned(),
        value: value.to_owned(),
        reason: reason.to_string(),
    }
}

fn parse_arguments<I: IntoIterator<Item = String>>(raw_args: I) -> Result<Arguments, ArgumentError> {
    let mut raw_args = raw_args.into_iter();
    let mut workbook = None::<PathBuf>;
    let mut criteria = Criteria::default();
    let mut options = ExtractOptions::default();
    let mut time_offsets = Vec::<usize>::new();
    let mut output = None::<PathBuf>;

    while let Some(arg) = raw_args.next() {
        let flag = arg.as_str();
        if !flag.starts_with("--") {
            match workbook {
                None => workbook = Some(PathBuf::from(flag)),
                Some(_) => return Err(ArgumentError::UnknownArgument(arg)),
            }
            continue;
        }
        if flag == "--bare-digit-times" {
            options.bare_digit_times = true;
            continue;
        }

        let value = match flag {
            "--sheet" | "--range" | "--skip-label" | "--year-digits" | "--time-offset" | "--output" => raw_args
                .next()
                .ok_or_else(|| ArgumentError::MissingValue(flag.to_owned()))?,
            _ => return Err(ArgumentError::UnknownArgument(arg)),
        };
        match flag {
            "--sheet" => {
                let pattern = Pattern::new(&value).map_err(|e| invalid(flag, &value, e))?;
                criteria.sheet_name_patterns.get_or_insert_with(Vec::new).push(pattern);
            }
            "--range" => {
                let range = Range::try_from(value.as_str()).map_err(|e| invalid(flag, &value, e))?;
                criteria.range = Some(range);
            }
            "--skip-label" => options.skip_label = value,
            "--year-digits" => {
                options.year_digits = YearDigits::parse(&value)
                    .ok_or_else(|| invalid(flag, &value, "expected two, four or either"))?;
            }
            "--time-offset" => {
                let offset = value
                    .parse::<usize>()
                    .ok()
                    .filter(|offset| *offset > 0)
                    .ok_or_else(|| invalid(flag, &value, "expected a positive integer"))?;
                time_offsets.push(offset);
            }
            _ => output = Some(PathBuf::from(value)),
        }
    }

    if !time_offsets.is_empty() {
        options.time_row_offsets = time_offsets;
    }
    Ok(Arguments {
        workbook: workbook.ok_or(ArgumentError::MissingWorkbook)?,
        criteria,
        options,
        output,
    })
}

fn run(arguments: Arguments) -> anyhow::Result<()> {
    let grid = load_grid(&arguments.workbook, &arguments.criteria)
        .with_context(|| format!("Failed to read '{}'", arguments.workbook.display()))?;
    let entries = rusty_timetable::extract(&grid, &arguments.options)
        .with_context(|| format!("Failed to extract a timetable from '{}'", arguments.workbook.display()))?;
    log::info!("Extracted {} entries from '{}'", entries.len(), arguments.workbook.display());

    match &arguments.output {
        Some(path) => export::write_json(&entries, path)?,
        None => {
            let json = export::to_json(&entries)?;
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let arguments = match parse_arguments(std::env::args().skip(1)) {
        Ok(arguments) => arguments,
        Err(error) => {
            eprintln!("{error}\n{USAGE}");
            std::process::exit(2);
        }
    };
    if let Err(error) = run(arguments) {
        log::debug!("{error:?}");
        eprintln!("Error: {error:#}");
        std::process::exit(1);
    }
}
