mod output;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use fetch_core::{load_root_certs_file, ErrorKind, FetchClient, FetchError, UreqTransport};
use tracing_subscriber::EnvFilter;

use output::ColorChoice;

/// Answers with a 301 "Moved" page, which is printed rather than followed.
const DEFAULT_URL: &str = "https://google.com/";

/// Fetch a URL with a single GET request and print the response body.
///
/// Redirects are not followed: a 3xx response is printed as-is.
#[derive(Debug, Parser)]
#[command(name = "fetch", version, about, long_about = None)]
struct App {
    /// absolute https URL to fetch
    #[arg(env = "FETCH_URL", default_value = DEFAULT_URL)]
    url: String,

    /// trust only the PEM certificates in this file instead of the bundled roots
    #[arg(long, value_name = "PATH")]
    cacert: Option<PathBuf>,

    /// also accept plain http URLs
    #[arg(long)]
    allow_http: bool,

    /// when to color the response body
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// log more to stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = App::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            exit_code(&err)
        }
    }
}

fn run(args: &App) -> Result<()> {
    let client = if args.allow_http {
        FetchClient::allowing_http(&args.url)?
    } else {
        FetchClient::new(&args.url)?
    };
    let transport = match &args.cacert {
        Some(path) => UreqTransport::with_root_certs(load_root_certs_file(path)?),
        None => UreqTransport::new(),
    };
    let response = client
        .fetch(&transport)
        .with_context(|| format!("GET {} failed", client.uri()))?;

    let writer = output::select(args.color);
    let mut stdout = io::stdout().lock();
    writer
        .write_body(&mut stdout, &response.body)
        .and_then(|()| stdout.flush())
        .context("could not write response body")?;
    Ok(())
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// 2 for input that never reached the network, 1 for everything else.
fn exit_code(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<FetchError>().map(FetchError::kind) {
        Some(ErrorKind::InvalidInput) => ExitCode::from(2),
        _ => ExitCode::FAILURE,
    }
}
