use anyhow::{Context, Error, Result};
use camino::Utf8PathBuf;
use clap::{ArgAction, Parser, ValueEnum};
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use termcolor::{BufferedStandardStream, ColorChoice};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use ipgeo_inspect::client::{interpret_body, QueryOptions, DEFAULT_ENDPOINT};
use ipgeo_inspect::config::{Config, API_KEY_ENV};
use ipgeo_inspect::input::{self, Candidates, Cursor, FileOrStdin, Source};
use ipgeo_inspect::{Locator, Report, Value};

/// Check if the error chain contains a broken pipe error.
#[inline(always)]
fn is_broken_pipe(err: &Error) -> bool {
    for cause in err.chain() {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            if io_err.kind() == io::ErrorKind::BrokenPipe {
                return true;
            }
        }
    }
    false
}

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Text holding the address to inspect. Takes priority over every other source
    #[clap(value_name = "TARGET")]
    target: Option<String>,

    /// Selected text to search for an address
    #[clap(short, long, value_name = "TEXT")]
    selection: Option<String>,

    /// Buffer to resolve --cursor against. Use "-" to read it from stdin
    #[clap(short, long, value_name = "FILE", value_hint = clap::ValueHint::FilePath, requires = "cursor")]
    file: Option<Utf8PathBuf>,

    /// 1-based LINE:COLUMN inside --file; the address touching it is used
    #[clap(long, value_name = "LINE:COL", requires = "file")]
    cursor: Option<Cursor>,

    /// Read stdin as a candidate text (e.g. a piped clipboard)
    #[clap(long)]
    stdin: bool,

    /// Never prompt for an address when no other source has one
    #[clap(long)]
    no_prompt: bool,

    /// Skip candidates whose octets are out of range (e.g. 999.1.1.1)
    #[clap(long)]
    strict: bool,

    /// Print the located address and exit without querying the service
    #[clap(short = 'x', long, conflicts_with = "from_json")]
    extract_only: bool,

    /// Render a saved service response instead of querying. Use "-" for stdin
    #[clap(long, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    from_json: Option<Utf8PathBuf>,

    /// ipgeolocation.io API key
    #[clap(short = 'k', long, env = API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,

    /// Extra modules to include in the response, comma separated (e.g. security,abuse)
    #[clap(long, env = "IPGEOLOCATION_INCLUDE")]
    include: Option<String>,

    /// Restrict the response to these fields, comma separated
    #[clap(long, env = "IPGEOLOCATION_FIELDS")]
    fields: Option<String>,

    /// Drop these fields from the response, comma separated
    #[clap(long, env = "IPGEOLOCATION_EXCLUDES")]
    excludes: Option<String>,

    /// Base URL of the lookup API
    #[clap(long, env = "IPGEOLOCATION_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Use markers to highlight titles and labels
    #[clap(short = 'C', long, value_enum, default_value_t = ArgsColorChoice::Auto)]
    color: ArgsColorChoice,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides
    #[clap(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
enum ArgsColorChoice {
    Always,
    Never,
    Auto,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            api_key: self.api_key.clone(),
            endpoint: self.endpoint.clone(),
            strict_octets: self.strict,
            query: QueryOptions::new(
                self.include.clone(),
                self.fields.clone(),
                self.excludes.clone(),
            ),
        }
    }
}

fn main() -> ExitCode {
    let err = match run_main() {
        Ok(code) => return code,
        Err(err) => err,
    };

    if is_broken_pipe(&err) {
        return ExitCode::SUCCESS;
    }

    // Print detailed error information based on environment variables
    if std::env::var("RUST_BACKTRACE").is_ok_and(|v| v == "1")
        && std::env::var("RUST_LIB_BACKTRACE").map_or(true, |v| v == "1")
    {
        let _ = writeln!(&mut std::io::stderr(), "{:?}", err);
    } else {
        let _ = writeln!(&mut std::io::stderr(), "{:#}", err);
    }

    ExitCode::FAILURE
}

fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn run_main() -> Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.verbose);

    // determine appropriate colormode. auto simply
    // tests if stdout is a tty (if so, then yes color)
    // or otherwise don't color if it's to a file or another pipe
    let colormode = match args.color {
        ArgsColorChoice::Auto => {
            if io::stdout().is_terminal() {
                ColorChoice::Always
            } else {
                ColorChoice::Never
            }
        }
        ArgsColorChoice::Always => ColorChoice::Always,
        ArgsColorChoice::Never => ColorChoice::Never,
    };

    // Offline path: render a response captured earlier
    if let Some(path) = &args.from_json {
        let source = FileOrStdin::from_path(path.clone());
        let body = source.read_to_string()?;
        let payload =
            interpret_body(&body).with_context(|| format!("failed to render {}", source))?;
        write_report(&payload, colormode)?;
        return Ok(ExitCode::SUCCESS);
    }

    // Fail on a missing key before asking the user for anything
    let config = args.config();
    let client = if args.extract_only {
        None
    } else {
        Some(config.client()?)
    };

    let locator = config.locator()?;

    let ip = locate_address(&args, &locator)?.ok_or(ipgeo_inspect::Error::NoAddress)?;

    let Some(client) = client else {
        let mut out = io::stdout().lock();
        writeln!(out, "{ip}")?;
        out.flush()?;
        return Ok(ExitCode::SUCCESS);
    };

    info!(ip = %ip, "inspecting address");
    let payload = client.lookup(&ip, &config.query)?;
    write_report(&payload, colormode)?;

    Ok(ExitCode::SUCCESS)
}

/// Gather candidates in priority order and return the first address found.
///
/// The interactive prompt is only consulted when nothing else matched.
fn locate_address(args: &Args, locator: &Locator) -> Result<Option<String>> {
    let mut candidates = Candidates::new();
    candidates
        .push(Source::Argument, args.target.clone())
        .push(Source::Selection, args.selection.clone());

    let mut stdin_used = false;
    if let (Some(path), Some(cursor)) = (&args.file, args.cursor) {
        let source = FileOrStdin::from_path(path.clone());
        stdin_used |= matches!(source, FileOrStdin::Stdin);
        let buffer = source.read_to_string()?;
        let word = cursor.locate(locator, &buffer).map(str::to_string);
        debug!(%cursor, file = %source, found = word.is_some(), "resolved cursor");
        candidates.push(Source::Cursor, word);
    }

    if args.stdin && !stdin_used {
        stdin_used = true;
        candidates.push(Source::Stdin, Some(FileOrStdin::Stdin.read_to_string()?));
    }

    if let Some((_, ip)) = candidates.locate(locator) {
        return Ok(Some(ip.to_string()));
    }

    if args.no_prompt || stdin_used || !io::stdin().is_terminal() {
        return Ok(None);
    }

    let answer = input::prompt_for_address(
        io::stdin().lock(),
        io::stderr().lock(),
        "Enter IP address: ",
    )?;
    let mut prompted = Candidates::new();
    prompted.push(Source::Prompt, answer);
    let ip = prompted.locate(locator).map(|(_, ip)| ip.to_string());
    Ok(ip)
}

fn write_report(payload: &Value, colormode: ColorChoice) -> Result<()> {
    let mut out = BufferedStandardStream::stdout(colormode);
    Report::new(payload).write(&mut out)?;
    Ok(())
}
