/// DiskStrip CLI: command-line frontend.
///
/// This crate contains argument handling, session state and output
/// rendering. Scanning and layout live in `diskstrip-core`.
pub mod args;
pub mod output;
pub mod state;

use anyhow::{bail, Context};
use args::Args;
use diskstrip_core::platform::drives::drive_root;
use diskstrip_core::platform::logical_drives;
use state::{ScanSession, SessionPhase};
use std::io::{self, Write};

/// Run one invocation: scan, lay out, and print.
pub fn run(args: &Args) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.list_drives {
        for volume in logical_drives() {
            if let Some(root) = drive_root(&volume) {
                writeln!(out, "{}", root.display())?;
            }
        }
        return Ok(());
    }

    let mut session = ScanSession::new();
    session.start_scan(args.path.clone(), args.scan_options())?;
    match session.wait_for_scan() {
        SessionPhase::Failed => {
            let reason = session.failure.as_deref().unwrap_or("unknown error");
            bail!("scan failed: {reason}");
        }
        SessionPhase::Results if session.scan_was_cancelled => bail!("scan cancelled"),
        _ => {}
    }

    let layout = args.layout_options();
    session.relayout(args.bounds(), layout.max_draw_depth);

    if let Some((x, y)) = args.at {
        let node = session
            .node_at(x, y)
            .with_context(|| format!("nothing is drawn at {x},{y}"))?;
        if let Some(info) = session.item_info(node) {
            writeln!(out, "{info}")?;
        }
        return Ok(());
    }

    output::write_session(&mut out, &session, args.format)?;
    out.flush()?;
    Ok(())
}
