//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one line per entity.
//! `--diff` adds a unified diff per changed entity, built with `similar`.

use std::fmt::Write as _;
use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use similar::{ChangeTag, TextDiff};
use tabled::{Table, Tabled, settings::Style};

use stconf_core::{ActionKind, EntityDiff, EntityOutcome, RunReport};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

fn paint(text: &str, color: bool, style: fn(&str) -> String) -> String {
    if color { style(text) } else { text.to_owned() }
}

// ── Printing ─────────────────────────────────────────────────────────

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

pub(crate) fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

pub(crate) fn render_json<T: serde::Serialize + ?Sized>(
    data: &T,
    compact: bool,
) -> Result<String, CliError> {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.map_err(|e| CliError::Render(e.to_string()))
}

pub(crate) fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data).map_err(|e| CliError::Render(e.to_string()))
}

// ── Run report ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "KIND")]
    kind: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "ACTION")]
    action: String,
    #[tabled(rename = "CHANGED")]
    changed: String,
    #[tabled(rename = "STATE")]
    state: String,
    #[tabled(rename = "ERROR")]
    error: String,
}

impl From<&EntityOutcome> for OutcomeRow {
    fn from(o: &EntityOutcome) -> Self {
        Self {
            kind: o.kind.to_string(),
            id: o.id.clone(),
            action: o.action.to_string(),
            changed: if o.changed { "yes" } else { "no" }.into(),
            state: o.state.to_string(),
            error: o.error.clone().unwrap_or_default(),
        }
    }
}

/// Render a run report. Per-entity diffs are kept only when `show_diff`.
pub fn render_report(
    report: &RunReport,
    format: OutputFormat,
    show_diff: bool,
    color: bool,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => {
            let rows: Vec<OutcomeRow> = report.outcomes.iter().map(OutcomeRow::from).collect();
            let mut out = render_table(&rows);
            if show_diff {
                for outcome in &report.outcomes {
                    if let Some(ref diff) = outcome.diff {
                        out.push_str("\n\n");
                        out.push_str(&render_diff(outcome, diff, color)?);
                    }
                }
            }
            out.push_str("\n\n");
            out.push_str(&summary(report, color));
            Ok(out)
        }
        OutputFormat::Plain => Ok(report
            .outcomes
            .iter()
            .map(|o| format!("{}\t{}\t{}\t{}", o.kind, o.id, o.action, o.state))
            .collect::<Vec<_>>()
            .join("\n")),
        structured => {
            let mut shown = report.clone();
            if !show_diff {
                for outcome in &mut shown.outcomes {
                    outcome.diff = None;
                }
            }
            match structured {
                OutputFormat::Json => render_json(&shown, false),
                OutputFormat::JsonCompact => render_json(&shown, true),
                _ => render_yaml(&shown),
            }
        }
    }
}

fn summary(report: &RunReport, color: bool) -> String {
    let changed = report.outcomes.iter().filter(|o| o.changed).count();
    let failed = report.failures().count();
    let unchanged = report.outcomes.len().saturating_sub(changed + failed);

    let mut line = String::new();
    let _ = write!(line, "{changed} changed, {unchanged} unchanged");
    if failed > 0 {
        let failed = paint(&format!("{failed} failed"), color, |s| s.red().to_string());
        let _ = write!(line, ", {failed}");
    }
    if report.check_mode {
        line.push_str(" (check mode, nothing written)");
    }
    if report.restarted {
        line.push_str("; daemon restarted");
    } else if report.restart_required {
        line.push_str(&paint(
            "; daemon restart required (rerun with --restart)",
            color,
            |s| s.yellow().to_string(),
        ));
    }
    line
}

/// Unified line diff of one entity, as YAML before and after.
pub fn render_diff(
    outcome: &EntityOutcome,
    diff: &EntityDiff,
    color: bool,
) -> Result<String, CliError> {
    let before = diff.before.as_ref().map(render_yaml).transpose()?.unwrap_or_default();
    let after = diff.after.as_ref().map(render_yaml).transpose()?.unwrap_or_default();

    let header = format!("{} {} ({})", outcome.kind, outcome.id, action_label(outcome.action));
    let mut out = paint(&header, color, |s| s.bold().to_string());
    for change in TextDiff::from_lines(&before, &after).iter_all_changes() {
        let line = change.value().trim_end_matches('\n');
        let rendered = match change.tag() {
            ChangeTag::Delete => paint(&format!("-{line}"), color, |s| s.red().to_string()),
            ChangeTag::Insert => paint(&format!("+{line}"), color, |s| s.green().to_string()),
            ChangeTag::Equal => format!(" {line}"),
        };
        out.push('\n');
        out.push_str(&rendered);
    }
    Ok(out)
}

fn action_label(action: ActionKind) -> &'static str {
    match action {
        ActionKind::Create => "added",
        ActionKind::Update => "modified",
        ActionKind::Delete => "removed",
        ActionKind::NoOp => "unchanged",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use stconf_core::{Device, DeviceId, EntityKind, EntityState, EntityView};

    const PEER: &str = "UJZDEGX-DNCF32H-EPF3DHO-DZDOCIE-S2JHTLG-MXGEDNB-73U55XT-PLPFT7K";

    fn renamed() -> EntityOutcome {
        let id: DeviceId = PEER.parse().unwrap();
        let before = Device::new(id.clone());
        let mut after = before.clone();
        after.name = "laptop".into();
        EntityOutcome {
            kind: EntityKind::Device,
            id: id.to_string(),
            action: ActionKind::Update,
            changed: true,
            state: EntityState::PresentActive,
            entity: Some(EntityView::from(after.clone())),
            diff: Some(EntityDiff {
                before: Some(before.into()),
                after: Some(after.into()),
            }),
            error: None,
        }
    }

    fn report() -> RunReport {
        RunReport {
            changed: true,
            check_mode: true,
            restart_required: false,
            restarted: false,
            outcomes: vec![renamed()],
        }
    }

    #[test]
    fn diff_marks_changed_lines() {
        let outcome = renamed();
        let diff = render_diff(&outcome, outcome.diff.as_ref().unwrap(), false).unwrap();
        assert!(diff.contains("device UJZDEGX"), "{diff}");
        assert!(diff.contains("-name: UJZDEGX"), "{diff}");
        assert!(diff.contains("+name: laptop"), "{diff}");
        assert!(diff.contains(" paused: false"), "{diff}");
    }

    #[test]
    fn table_has_summary_line() {
        let out = render_report(&report(), OutputFormat::Table, false, false).unwrap();
        assert!(out.contains("ACTION"));
        assert!(out.contains("update"));
        assert!(out.contains("1 changed, 0 unchanged (check mode, nothing written)"), "{out}");
        assert!(!out.contains("+name"));
    }

    #[test]
    fn json_drops_diff_unless_requested() {
        let plain = render_report(&report(), OutputFormat::Json, false, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&plain).unwrap();
        assert!(value["outcomes"][0].get("diff").is_none());
        assert_eq!(value["outcomes"][0]["state"], "present_active");

        let with_diff = render_report(&report(), OutputFormat::Json, true, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&with_diff).unwrap();
        assert_eq!(value["outcomes"][0]["diff"]["after"]["name"], "laptop");
    }

    #[test]
    fn plain_is_tab_separated() {
        let out = render_report(&report(), OutputFormat::Plain, false, false).unwrap();
        assert_eq!(out, format!("device\t{PEER}\tupdate\tpresent_active"));
    }
}
