/// Command-line arguments.
use clap::{Parser, ValueEnum};
use diskstrip_core::layout::{LayoutOptions, Rect, DEFAULT_MAX_DRAW_DEPTH};
use diskstrip_core::scanner::{ScanOptions, DEFAULT_MAX_DEPTH};
use std::path::PathBuf;

/// How placements are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Indented listing with human-readable sizes
    #[default]
    Text,
    /// One JSON document with a summary and every placement
    Json,
    /// One CSV row per placement
    Csv,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "diskstrip")]
#[command(about = "Scan a folder or drive and lay out its disk usage as a strip treemap")]
#[command(version)]
pub struct Args {
    /// Folder or drive root to scan
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Do not descend more than N directory levels below the root
    #[arg(short = 'd', long = "max-depth", default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Number of directory levels drawn below the root
    #[arg(short = 'D', long = "draw-depth", default_value_t = DEFAULT_MAX_DRAW_DEPTH)]
    pub draw_depth: usize,

    /// Width of the layout area in pixels
    #[arg(long, default_value_t = 1280)]
    pub width: i64,

    /// Height of the layout area in pixels
    #[arg(long, default_value_t = 800)]
    pub height: i64,

    /// Output format
    #[arg(short = 'f', long = "format", value_name = "FORMAT", default_value = "text")]
    pub format: OutputFormat,

    /// Describe the item drawn at pixel X,Y instead of listing placements
    #[arg(long = "at", value_name = "X,Y", value_parser = parse_point)]
    pub at: Option<(i64, i64)>,

    /// List the available drive roots and exit
    #[arg(long = "list-drives")]
    pub list_drives: bool,

    /// Log debug output, including every pruned entry
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            max_depth: self.max_depth,
        }
    }

    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            max_draw_depth: self.draw_depth,
        }
    }

    /// The layout area, anchored at the origin.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(0, 0, self.width, self.height)
    }
}

/// Parse `X,Y` into a pixel coordinate.
fn parse_point(s: &str) -> Result<(i64, i64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{s}'"))?;
    let x = x
        .trim()
        .parse()
        .map_err(|e| format!("invalid X in '{s}': {e}"))?;
    let y = y
        .trim()
        .parse()
        .map_err(|e| format!("invalid Y in '{s}': {e}"))?;
    Ok((x, y))
}
