use std::fs;

use anyhow::Context;
use clap::Parser;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod dates;
mod error;
mod render;
mod report;
mod sink;
mod status;
mod xml;

use crate::cli::Args;
use crate::error::ReportError;
use crate::render::{render, render_unavailable};
use crate::report::Source;
use crate::sink::{HtmlPage, OutputSink, SlotMap};
use crate::status::Icons;
use crate::xml::XmlNode;

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Render a loaded report, or mark the page unavailable when loading failed.
fn fill<S: OutputSink>(
    loaded: Result<XmlNode, ReportError>,
    sink: &mut S,
    icons: &Icons,
) -> anyhow::Result<()> {
    match loaded {
        Ok(document) => {
            let summary = render(&document, sink, icons);
            if !summary.is_complete() {
                warn!(failed = summary.failed, "some slots were not rendered");
            }
            Ok(())
        }
        Err(err) => {
            error!("snow report unavailable: {err}");
            render_unavailable(sink)?;
            Err(err.into())
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let source = match &args.file {
        Some(path) => Source::File(path.clone()),
        None => Source::remote(&args.url)?,
    };

    if args.preview {
        return app::run(&source);
    }

    let icons = Icons::html(&args.icons);
    let loaded = source.load();

    match &args.page {
        Some(page_path) => {
            let html = fs::read_to_string(page_path)
                .with_context(|| format!("failed to read page {}", page_path.display()))?;
            let mut page = HtmlPage::new(html);
            let outcome = fill(loaded, &mut page, &icons);

            let out = args.output.as_ref().unwrap_or(page_path);
            fs::write(out, page.as_str())
                .with_context(|| format!("failed to write page {}", out.display()))?;
            outcome
        }
        None => {
            let mut slots = SlotMap::new();
            let outcome = fill(loaded, &mut slots, &icons);
            println!("{}", slots.to_json()?);
            outcome
        }
    }
}
