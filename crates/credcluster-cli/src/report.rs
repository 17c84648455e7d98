// Report rendering for duplicate password groups

use chrono::{DateTime, Utc};
use credcluster_identity::{DuplicatePasswordReport, FlatRecord};
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use crate::cli::OutputFormat;
use crate::error::{CliError, CliResult};
use crate::output::OutputStyle;

const COLUMNS: [&str; 7] = [
    "Name",
    "Secondary name",
    "Admin",
    "Archived",
    "Password last set",
    "Type",
    "Risk score",
];

const ADMIN_COLUMN: usize = 2;

/// Renders a finished report
pub trait Reporter {
    fn render(&self, report: &DuplicatePasswordReport) -> CliResult<String>;
}

/// Pick the reporter for an output format
pub fn reporter_for(format: OutputFormat, use_colors: bool) -> Box<dyn Reporter> {
    match format {
        OutputFormat::Table => Box::new(TableReporter::new(use_colors)),
        OutputFormat::Json => Box::new(JsonReporter),
        OutputFormat::Csv => Box::new(CsvReporter),
    }
}

fn format_timestamp(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn table_row(member: &FlatRecord) -> [String; 7] {
    [
        member.primary_display_name.clone(),
        member
            .secondary_display_name
            .clone()
            .unwrap_or_else(|| "-".to_string()),
        yes_no(member.is_admin).to_string(),
        yes_no(member.archived).to_string(),
        format_timestamp(member.password_last_set),
        member.entity_type.to_string(),
        format!("{:.2}", member.risk_score),
    ]
}

/// Aligned plain-text tables, one per group
pub struct TableReporter {
    style: OutputStyle,
}

impl TableReporter {
    pub fn new(use_colors: bool) -> Self {
        Self {
            style: OutputStyle::new(use_colors),
        }
    }

    fn pad(cell: &str, width: usize) -> String {
        let fill = width.saturating_sub(UnicodeWidthStr::width(cell));
        format!("{}{}", cell, " ".repeat(fill))
    }
}

impl Reporter for TableReporter {
    fn render(&self, report: &DuplicatePasswordReport) -> CliResult<String> {
        if report.is_empty() {
            return Ok("No groups of accounts sharing a password were found.\n".to_string());
        }

        let mut out = String::new();
        for group in report.groups() {
            out.push_str(&self.style.header(&format!(
                "Group {} ({} accounts)",
                group.group_id,
                group.member_count()
            )));
            out.push('\n');

            let rows: Vec<[String; 7]> = group.members.iter().map(table_row).collect();
            let mut widths = COLUMNS.map(UnicodeWidthStr::width);
            for row in &rows {
                for (width, cell) in widths.iter_mut().zip(row.iter()) {
                    *width = (*width).max(UnicodeWidthStr::width(cell.as_str()));
                }
            }

            let header: Vec<String> = COLUMNS
                .iter()
                .zip(widths.iter())
                .map(|(name, width)| Self::pad(name, *width))
                .collect();
            out.push_str(header.join("  ").trim_end());
            out.push('\n');

            let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
            out.push_str(&rule.join("  "));
            out.push('\n');

            for (row, member) in rows.iter().zip(group.members.iter()) {
                let cells: Vec<String> = row
                    .iter()
                    .zip(widths.iter())
                    .enumerate()
                    .map(|(column, (cell, width))| {
                        let padded = Self::pad(cell, *width);
                        if column == ADMIN_COLUMN && member.is_admin {
                            self.style.alert(&padded)
                        } else {
                            padded
                        }
                    })
                    .collect();
                out.push_str(cells.join("  ").trim_end());
                out.push('\n');
            }
            out.push('\n');
        }

        out.push_str(&format!(
            "{} groups of accounts sharing a password\n",
            report.grouped_count()
        ));
        Ok(out)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonGroup<'a> {
    group_id: &'a str,
    member_count: usize,
    members: &'a [FlatRecord],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    grouped_count: usize,
    total_members: usize,
    groups: Vec<JsonGroup<'a>>,
}

/// Pretty-printed JSON document
pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn render(&self, report: &DuplicatePasswordReport) -> CliResult<String> {
        let document = JsonReport {
            grouped_count: report.grouped_count(),
            total_members: report.total_members(),
            groups: report
                .groups()
                .iter()
                .map(|group| JsonGroup {
                    group_id: &group.group_id,
                    member_count: group.member_count(),
                    members: &group.members,
                })
                .collect(),
        };
        let mut rendered = serde_json::to_string_pretty(&document)
            .map_err(|e| CliError::Render(e.to_string()))?;
        rendered.push('\n');
        Ok(rendered)
    }
}

/// One CSV row per group member
pub struct CsvReporter;

impl Reporter for CsvReporter {
    fn render(&self, report: &DuplicatePasswordReport) -> CliResult<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        let to_render_error = |e: csv::Error| CliError::Render(e.to_string());

        writer
            .write_record([
                "groupId",
                "primaryDisplayName",
                "secondaryDisplayName",
                "isAdmin",
                "archived",
                "passwordLastSet",
                "entityType",
                "riskScore",
            ])
            .map_err(to_render_error)?;

        for group in report.groups() {
            for member in &group.members {
                writer
                    .write_record([
                        group.group_id.clone(),
                        member.primary_display_name.clone(),
                        member.secondary_display_name.clone().unwrap_or_default(),
                        member.is_admin.to_string(),
                        member.archived.to_string(),
                        member
                            .password_last_set
                            .map(|ts| ts.to_rfc3339())
                            .unwrap_or_default(),
                        member.entity_type.to_string(),
                        member.risk_score.to_string(),
                    ])
                    .map_err(to_render_error)?;
            }
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| CliError::Render(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| CliError::Render(e.to_string()))
    }
}
