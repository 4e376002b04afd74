#![forbid(unsafe_code)]

//! Command-line argument parsing for the invoice demo.
//!
//! Parses args manually to keep the binary lean. Supports environment
//! variable overrides via the `LOOKUP_DEMO_*` prefix.

use std::env;
use std::path::PathBuf;
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
Lookup Demo: an invoice form built from typeahead and select controls

USAGE:
    lookup-demo [OPTIONS]

OPTIONS:
    --customers=PATH     Customer records, a JSON array (default: bundled)
    --products=PATH      Product records, a JSON array (default: bundled)
    --min-search=N       Characters before the customer list opens (default: 2)
    --log=PATH           Write logs to PATH (default: no logging)
    --no-mouse           Disable mouse event capture
    --track-anchor       Move open dropdowns with their field on scroll
    --help, -h           Show this help message
    --version, -V        Show version

FIELDS:
    Customer   Typeahead with add-new and refresh
    Products   Multi-select with select-all
    Status     Single select

KEYBINDINGS:
    Tab / Shift-Tab   Move between fields
    Up / Down         Open the list, move the highlight
    Enter             Commit the highlighted row
    Esc               Close the list
    Ctrl+U            Clear the field
    Ctrl+R            Refresh customers
    Ctrl+A            Select or clear all products
    Ctrl+S            Validate and submit
    Ctrl+C            Quit

ENVIRONMENT VARIABLES:
    LOOKUP_DEMO_CUSTOMERS     Override --customers
    LOOKUP_DEMO_PRODUCTS      Override --products
    LOOKUP_DEMO_MIN_SEARCH    Override --min-search
    LOOKUP_DEMO_LOG           Override --log
    LOOKUP_LOG, RUST_LOG      Log filter (default: info)";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    /// Customer data file; bundled data when `None`.
    pub customers: Option<PathBuf>,
    /// Product data file; bundled data when `None`.
    pub products: Option<PathBuf>,
    /// `min_search_length` of the customer field.
    pub min_search: usize,
    /// Log file; logging is off when `None`.
    pub log: Option<PathBuf>,
    /// Whether mouse events are enabled.
    pub mouse: bool,
    /// Keep open dropdowns attached to their field while scrolling.
    pub track_anchor: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            customers: None,
            products: None,
            min_search: 2,
            log: None,
            mouse: true,
            track_anchor: false,
        }
    }
}

/// Why parsing stopped before producing options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Help,
    Version,
    Invalid(String),
}

impl Opts {
    /// Parse command-line arguments and environment variables.
    ///
    /// Environment variables take precedence over defaults but are overridden
    /// by explicit command-line flags. Exits the process for `--help`,
    /// `--version`, and invalid arguments.
    pub fn parse() -> Self {
        let env_lookup = |key: &str| env::var(key).ok();
        let args: Vec<String> = env::args().skip(1).collect();
        match Self::parse_from(&args, env_lookup) {
            Ok(opts) => opts,
            Err(ParseOutcome::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Err(ParseOutcome::Version) => {
                println!("lookup-demo {VERSION}");
                process::exit(0);
            }
            Err(ParseOutcome::Invalid(msg)) => {
                eprintln!("{msg}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    /// Parse `args` with environment values from `env_lookup`.
    pub fn parse_from(
        args: &[String],
        env_lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ParseOutcome> {
        let mut opts = Self::default();

        // Apply environment variable defaults first
        if let Some(val) = env_lookup("LOOKUP_DEMO_CUSTOMERS") {
            opts.customers = Some(val.into());
        }
        if let Some(val) = env_lookup("LOOKUP_DEMO_PRODUCTS") {
            opts.products = Some(val.into());
        }
        if let Some(val) = env_lookup("LOOKUP_DEMO_MIN_SEARCH")
            && let Ok(n) = val.parse()
        {
            opts.min_search = n;
        }
        if let Some(val) = env_lookup("LOOKUP_DEMO_LOG") {
            opts.log = Some(val.into());
        }

        // Parse command-line args (override env vars)
        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Err(ParseOutcome::Help),
                "--version" | "-V" => return Err(ParseOutcome::Version),
                "--no-mouse" => opts.mouse = false,
                "--track-anchor" => opts.track_anchor = true,
                other => {
                    if let Some(val) = other.strip_prefix("--customers=") {
                        opts.customers = Some(val.into());
                    } else if let Some(val) = other.strip_prefix("--products=") {
                        opts.products = Some(val.into());
                    } else if let Some(val) = other.strip_prefix("--log=") {
                        opts.log = Some(val.into());
                    } else if let Some(val) = other.strip_prefix("--min-search=") {
                        opts.min_search = val.parse().map_err(|_| {
                            ParseOutcome::Invalid(format!("Invalid --min-search value: {val}"))
                        })?;
                    } else {
                        return Err(ParseOutcome::Invalid(format!("Unknown argument: {other}")));
                    }
                }
            }
        }

        Ok(opts)
    }
}
