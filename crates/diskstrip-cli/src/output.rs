/// Rendering of a finished session: text, JSON and CSV.
use crate::args::OutputFormat;
use crate::state::ScanSession;
use diskstrip_core::layout::Placement;
use diskstrip_core::model::size::{format_count, format_size};
use diskstrip_core::model::{EntryKind, FileTree};
use diskstrip_core::scanner::stats::ScanStats;
use serde::Serialize;
use std::io::{self, Write};

/// One placed node, flattened for output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacementRow {
    pub path: String,
    pub kind: EntryKind,
    pub size: u64,
    pub level: usize,
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
}

/// Scan totals shown above the placements.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub root: String,
    pub total_size: u64,
    pub directories: u64,
    pub files: u64,
    pub zero_byte_files: u64,
    pub access_denied: u64,
    pub foreign_reparse: u64,
    pub same_volume_reparse: u64,
    pub io_errors: u64,
}

impl Summary {
    pub fn new(tree: &FileTree, stats: &ScanStats) -> Self {
        Self {
            root: tree.full_path(tree.root),
            total_size: tree.root_node().size,
            directories: stats.directories,
            files: stats.files,
            zero_byte_files: stats.zero_byte_files,
            access_denied: stats.access_denied,
            foreign_reparse: stats.foreign_reparse,
            same_volume_reparse: stats.same_volume_reparse,
            io_errors: stats.io_errors,
        }
    }
}

#[derive(Serialize)]
struct Report<'a> {
    summary: &'a Summary,
    placements: &'a [PlacementRow],
}

pub fn rows(tree: &FileTree, placements: &[Placement]) -> Vec<PlacementRow> {
    placements
        .iter()
        .map(|p| {
            let node = tree.node(p.node);
            PlacementRow {
                path: tree.full_path(p.node),
                kind: node.kind,
                size: node.size,
                level: p.level,
                x1: p.rect.x1,
                y1: p.rect.y1,
                x2: p.rect.x2,
                y2: p.rect.y2,
            }
        })
        .collect()
}

/// Write the session's results to `out` in `format`.
///
/// Does nothing if the session holds no tree.
pub fn write_session<W: Write>(
    out: &mut W,
    session: &ScanSession,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let (Some(tree), Some(stats)) = (&session.tree, &session.stats) else {
        return Ok(());
    };
    let summary = Summary::new(tree, stats);
    let rows = rows(tree, &session.placements);

    match format {
        OutputFormat::Text => write_text(out, tree, &summary, &session.placements)?,
        OutputFormat::Json => write_json(out, &summary, &rows)?,
        OutputFormat::Csv => write_csv(out, &rows)?,
    }
    Ok(())
}

pub fn write_text<W: Write>(
    out: &mut W,
    tree: &FileTree,
    summary: &Summary,
    placements: &[Placement],
) -> io::Result<()> {
    writeln!(
        out,
        "{}: {} in {} files, {} directories",
        summary.root,
        format_size(summary.total_size),
        format_count(summary.files),
        format_count(summary.directories)
    )?;
    let left_out = summary.access_denied + summary.foreign_reparse + summary.io_errors;
    if left_out > 0 || summary.zero_byte_files > 0 {
        writeln!(
            out,
            "Left out: {} access denied, {} off-volume links, {} I/O errors, {} empty files",
            summary.access_denied, summary.foreign_reparse, summary.io_errors, summary.zero_byte_files
        )?;
    }
    writeln!(out)?;

    for p in placements {
        let node = tree.node(p.node);
        let r = p.rect;
        writeln!(
            out,
            "{:indent$}{}  {}  [{},{} {}x{}]",
            "",
            node.name,
            format_size(node.size),
            r.x1,
            r.y1,
            r.width(),
            r.height(),
            indent = p.level * 2
        )?;
    }
    Ok(())
}

pub fn write_json<W: Write>(
    out: &mut W,
    summary: &Summary,
    rows: &[PlacementRow],
) -> serde_json::Result<()> {
    let report = Report {
        summary,
        placements: rows,
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out).map_err(serde_json::Error::io)
}

pub fn write_csv<W: Write>(out: &mut W, rows: &[PlacementRow]) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
