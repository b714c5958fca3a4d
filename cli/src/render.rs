//! Plain-text rendering of rank reports.

use rankline_core::RankReport;
use rankline_types::formatting::{format_progress, format_voice_progress, progress_pct};
use std::fmt::Write;

pub fn render_report(report: &RankReport) -> String {
    let mut out = format!("Progress for user {} in guild {}\n", report.user_id, report.guild_id);

    if !report.tracked {
        out.push_str("No activity recorded yet.\n");
        return out;
    }

    if let Some(name) = report.current_name() {
        let _ = writeln!(out, "Current rank: {name}");
    }

    let record = &report.record;
    match &report.next {
        Some(next) => {
            let _ = writeln!(out, "Next rank: {}", next.name);
            let _ = writeln!(
                out,
                "  Messages:   {} ({}%)",
                format_progress(record.messages, next.message_threshold),
                progress_pct(record.messages, next.message_threshold)
            );
            let _ = writeln!(
                out,
                "  Voice time: {} ({}%)",
                format_voice_progress(record.voice_minutes, next.voice_threshold),
                progress_pct(record.voice_minutes, next.voice_threshold)
            );
            let _ = writeln!(
                out,
                "  Invites:    {} ({}%)",
                format_progress(record.invites, next.invite_threshold),
                progress_pct(record.invites, next.invite_threshold)
            );
        }
        None => out.push_str("Maximum rank reached!\n"),
    }
    out
}
