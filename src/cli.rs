use std::path::PathBuf;

use clap::builder::{styling::AnsiColor, Styles};
use clap::{ArgAction, Parser};

use crate::report::DEFAULT_URL;
use crate::status::DEFAULT_ICON_BASE;

const ABOUT: &str = "Ski field snow report renderer";

const LONG_ABOUT: &str = "
Fetches a ski field's XML snow report (field status, road, snow, weather and facilities) and
renders it into the named slots of a web page.

With --page the slots are filled into an HTML page by element id. Without it the slots are
printed as JSON. --preview shows the report in the terminal instead.
";

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default())
    .usage(AnsiColor::Green.on_default())
    .literal(AnsiColor::Green.on_default())
    .placeholder(AnsiColor::Green.on_default());

#[derive(Parser, Debug)]
#[command(version, styles=STYLES, about=ABOUT, long_about = LONG_ABOUT)]
pub struct Args {
    #[arg(long, env = "SKIREPORT_URL", default_value = DEFAULT_URL, help = "Location of the XML snow report")]
    pub url: String,

    #[arg(long, value_name = "PATH", help = "Read the report from a local file instead of fetching it")]
    pub file: Option<PathBuf>,

    #[arg(long, env = "SKIREPORT_ICONS", default_value = DEFAULT_ICON_BASE, help = "Base URL of the tick/pause/cross images")]
    pub icons: String,

    #[arg(long, value_name = "PATH", conflicts_with = "preview", help = "HTML page to fill by element id")]
    pub page: Option<PathBuf>,

    #[arg(long, value_name = "PATH", requires = "page", help = "Write the filled page here instead of in place")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Show the report in an interactive terminal view")]
    pub preview: bool,

    #[arg(short, long, action = ArgAction::Count, help = "Increase log verbosity (-v info, -vv debug)")]
    pub verbose: u8,
}
