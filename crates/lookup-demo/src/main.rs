#![forbid(unsafe_code)]

//! Lookup demo binary entry point.

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lookup::prelude::*;
use lookup::{BufferDiff, Presenter, SessionOptions, TerminalSession};
use lookup_demo::app::{Flow, FormOptions, InvoiceForm};
use lookup_demo::cli;
use lookup_demo::data::DataSource;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

fn main() {
    let opts = cli::Opts::parse();

    if let Some(path) = &opts.log
        && let Err(e) = init_logging(path)
    {
        eprintln!("Cannot open log file {}: {e}", path.display());
        std::process::exit(1);
    }

    match run(&opts) {
        Ok(Some(summary)) => println!("{summary}"),
        Ok(None) => {}
        Err(e) => {
            tracing::error!(error = %e, "demo failed");
            eprintln!("lookup-demo: {e}");
            std::process::exit(1);
        }
    }
}

/// Logs go to a file; the terminal belongs to the form.
fn init_logging(path: &Path) -> io::Result<()> {
    let file = File::create(path)?;

    #[cfg(feature = "tracing-json")]
    {
        lookup::core::logging::init_json(Mutex::new(file));
    }

    #[cfg(not(feature = "tracing-json"))]
    {
        use tracing_subscriber::EnvFilter;

        let filter = EnvFilter::try_from_env(lookup::core::logging::LOG_FILTER_ENV)
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init();
    }

    Ok(())
}

/// Run the form until the user quits. Returns the submission summary.
fn run(opts: &cli::Opts) -> Result<Option<String>> {
    let customer_source = DataSource::customers(opts.customers.clone());
    let customers = customer_source.load()?;
    let products = DataSource::products(opts.products.clone()).load()?;
    let options = FormOptions {
        min_search: opts.min_search,
        track_anchor: opts.track_anchor,
    };
    let mut form = InvoiceForm::new(customer_source, customers, products, &options)?;

    let session = TerminalSession::new(SessionOptions {
        alternate_screen: true,
        mouse_capture: opts.mouse,
        bracketed_paste: true,
        focus_events: true,
    })?;
    let (mut width, mut height) = session.size()?;
    tracing::info!(width, height, mouse = opts.mouse, "session started");

    let mut presenter = Presenter::new(io::stdout()).with_sync_output(true);
    presenter.clear_screen()?;
    let mut prev = Buffer::new(width, height);
    let mut dirty = true;

    loop {
        if form.tick(Instant::now()) {
            dirty = true;
        }
        if dirty {
            let mut next = Buffer::new(width, height);
            form.render(&mut next);
            presenter.present(&next, &BufferDiff::compute(&prev, &next))?;
            match form.cursor() {
                Some((x, y)) => session.show_cursor_at(x, y)?,
                None => session.hide_cursor()?,
            }
            prev = next;
            dirty = false;
        }

        if !session.poll_event(POLL_INTERVAL)? {
            continue;
        }
        let Some(event) = session.read_event()? else {
            continue;
        };
        if let Event::Resize {
            width: w,
            height: h,
        } = event
        {
            tracing::debug!(width = w, height = h, "resized");
            width = w;
            height = h;
            prev = Buffer::new(width, height);
            presenter.clear_screen()?;
        }
        dirty = true;
        if form.handle_event(&event, Instant::now()) == Flow::Quit {
            break;
        }
    }

    drop(session);
    Ok(form.submission().map(ToString::to_string))
}
