//! Status command

use datakeep_archiver::ReportSlot;
use datakeep_resolver::{ArchiveStatus, StatusReporter};
use datakeep_store::build_tiers;

use crate::cli::StatusArgs;
use crate::error::Result;
use crate::settings::Settings;

/// Execute the status command
///
/// Tier usage is read live from both tiers. Cycle history lives with the
/// long-running service process, so a standalone invocation shows no last
/// cycle.
pub async fn execute_status(args: StatusArgs, settings: Settings) -> Result<()> {
    let tiers = build_tiers(&settings.store).await?;
    let (local, remote) = super::tier_handles(&tiers);

    let reporter = StatusReporter::new(local, remote, settings.archive.clone(), ReportSlot::new());
    let status = reporter.archive_status().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        print!("{}", render_status(&status));
    }
    Ok(())
}

fn render_status(status: &ArchiveStatus) -> String {
    let mut out = String::new();
    out.push_str("Archive Status\n");
    out.push_str("==============\n");
    out.push_str(&format!("Enabled:        {}\n", status.enabled));
    out.push_str(&format!(
        "Remote tier:    {}\n",
        if status.remote_configured {
            "configured"
        } else {
            "not configured"
        }
    ));
    out.push_str(&format!("Retention:      {} days\n", status.retention_days));
    out.push_str(&format!("Daily trigger:  {}\n", status.archive_time));
    if let Some(cycle) = &status.last_cycle {
        out.push_str(&format!(
            "Last cycle:     {} ({} uploaded, {} errors)\n",
            cycle.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
            cycle.total_uploaded(),
            cycle.total_errors()
        ));
    }

    if status.collectors.is_empty() {
        out.push_str("\nNo collectors found in either tier\n");
        return out;
    }

    out.push_str(&format!(
        "\n{:<20} {:>12} {:>14} {:>13} {:>15}\n",
        "Collector", "Local files", "Local bytes", "Remote files", "Remote bytes"
    ));
    for stat in &status.collectors {
        out.push_str(&format!(
            "{:<20} {:>12} {:>14} {:>13} {:>15}\n",
            stat.collector,
            stat.local_file_count,
            stat.local_size_bytes,
            stat.remote_file_count,
            stat.remote_size_bytes,
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use datakeep_resolver::CollectorStat;

    #[test]
    fn test_render_status_lists_collectors() {
        let status = ArchiveStatus {
            enabled: true,
            remote_configured: true,
            retention_days: 7,
            archive_time: "03:00".to_string(),
            last_cycle: None,
            collectors: vec![CollectorStat {
                collector: "weather".to_string(),
                local_file_count: 12,
                local_size_bytes: 4096,
                remote_file_count: 88,
                remote_size_bytes: 1_048_576,
            }],
        };

        let text = render_status(&status);
        assert!(text.contains("Archive Status"));
        assert!(text.contains("Retention:      7 days"));
        assert!(text.contains("weather"));
        assert!(text.contains("1048576"));
    }

    #[test]
    fn test_render_status_without_collectors() {
        let status = ArchiveStatus {
            enabled: false,
            remote_configured: false,
            retention_days: 7,
            archive_time: "03:00".to_string(),
            last_cycle: None,
            collectors: Vec::new(),
        };

        let text = render_status(&status);
        assert!(text.contains("not configured"));
        assert!(text.contains("No collectors found"));
    }
}
