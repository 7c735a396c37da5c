use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "cplot", version, about = "Pen-plotter driver and print pipeline")]
pub struct Cli {
    /// Emit debug-level tracing to the log file in addition to info.
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Disable ANSI color in terminal output.
    #[arg(long, global = true)]
    pub no_colors: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Lay out, plan, and plot a document.
    Print(PrintArgs),
    /// Device session operations.
    Device {
        #[command(subcommand)]
        op: DeviceOp,
    },
    /// Persisted configuration operations.
    Config {
        #[command(subcommand)]
        op: ConfigOp,
    },
    /// List the font catalog.
    Fonts {
        /// Group entries by family instead of listing faces.
        #[arg(long)]
        families: bool,
    },
    /// Print program name, version, and author.
    Version,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationArg {
    Portrait,
    Landscape,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewFormatArg {
    Svg,
    Png,
}

#[derive(Parser, Debug)]
pub struct PrintArgs {
    /// Input file; reads standard input when omitted and stdin is not a terminal.
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Treat the input as Markdown instead of plain text.
    #[arg(long)]
    pub markdown: bool,

    /// Font family id or display-name substring.
    #[arg(long)]
    pub family: Option<String>,

    /// Base point size.
    #[arg(long)]
    pub point_size: Option<f64>,

    #[arg(long)]
    pub paper_width_mm: Option<f64>,
    #[arg(long)]
    pub paper_height_mm: Option<f64>,
    #[arg(long)]
    pub margin_mm: Option<f64>,
    #[arg(long)]
    pub orientation: Option<OrientationArg>,

    /// Scale content down to fit the printable frame.
    #[arg(long)]
    pub fit_to_frame: Option<bool>,

    /// Compute the plan without opening a device session.
    #[arg(long)]
    pub dry_run: bool,

    /// Write a preview render instead of (or in addition to) plotting.
    #[arg(long)]
    pub preview_format: Option<PreviewFormatArg>,

    /// Output path for the preview render.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Device alias or path; omit to auto-select.
    #[arg(long)]
    pub device: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum DeviceOp {
    List,
    Profile,
    Pen {
        #[command(subcommand)]
        action: PenAction,
    },
    Motors {
        #[command(subcommand)]
        action: PowerAction,
    },
    Jog {
        #[arg(long, allow_hyphen_values = true)]
        dx: f64,
        #[arg(long, allow_hyphen_values = true)]
        dy: f64,
    },
    Home,
    Status,
    Position,
    Reset,
    Reboot,
    Abort,
    Version,
}

#[derive(Subcommand, Debug)]
pub enum PenAction {
    Up,
    Down,
    Toggle,
}

#[derive(Subcommand, Debug)]
pub enum PowerAction {
    On,
    Off,
}

#[derive(Subcommand, Debug)]
pub enum ConfigOp {
    Show,
    Reset,
    /// `k=v[,k=v...]`
    Set { assignments: String },
}
