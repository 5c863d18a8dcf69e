//! Output formatting for CLI operations.

use assetpack::{DanglingDependency, EntryRef, PackStats};
use serde_json::json;

/// Outcome of a single mutating command.
pub struct EditOutcome<'a> {
    pub action: &'a str,
    pub target: &'a str,
    pub applied: bool,
    pub bytes_before: usize,
    pub bytes_after: usize,
}

/// Trait for output formatting
pub trait OutputFormatter {
    /// Formats the node tree
    fn format_list(&self, entries: &[EntryRef<'_>], technical: bool) -> String;

    /// Formats pack statistics
    fn format_info(&self, stats: &PackStats) -> String;

    /// Formats the result of a validation run
    fn format_check(&self, stats: &PackStats, dangling: &[DanglingDependency]) -> String;

    /// Formats the outcome of an edit
    fn format_edit(&self, outcome: &EditOutcome<'_>) -> String;
}

/// Human-readable output formatter
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn format_list(&self, entries: &[EntryRef<'_>], technical: bool) -> String {
        let mut output = String::new();

        if technical {
            output.push_str(&format!(
                "{:>10} {:>6} {:>12} {:<10} {}\n",
                "Offset", "Header", "Size", "Type", "Path"
            ));
        } else {
            output.push_str(&format!("{:>12} {:<10} {}\n", "Size", "Type", "Path"));
        }
        output.push_str(&"-".repeat(60));
        output.push('\n');

        let mut payload_bytes: u64 = 0;
        let mut leaves = 0;
        let mut containers = 0;

        for entry in entries {
            let node = entry.node;
            let indent = "  ".repeat(entry.depth.saturating_sub(1));
            let suffix = if node.is_container() { "/" } else { "" };
            if node.is_container() {
                containers += 1;
            } else {
                leaves += 1;
                payload_bytes += u64::from(node.size);
            }

            if technical {
                output.push_str(&format!(
                    "{:>#10x} {:>6} {:>12} {:<10} {}{}{}\n",
                    node.position,
                    node.header_size(),
                    node.size,
                    node.node_type.as_str(),
                    indent,
                    node.name,
                    suffix
                ));
            } else {
                output.push_str(&format!(
                    "{:>12} {:<10} {}{}{}\n",
                    humanize_bytes(u64::from(node.size)),
                    node.node_type.as_str(),
                    indent,
                    node.name,
                    suffix
                ));
            }
            for dependency in &node.dependencies {
                output.push_str(&format!("{:>24}{}  -> {}\n", "", indent, dependency));
            }
        }

        output.push_str(&"-".repeat(60));
        output.push('\n');
        output.push_str(&format!(
            "{} leaves, {} containers, {} payload\n",
            leaves,
            containers,
            humanize_bytes(payload_bytes)
        ));

        output
    }

    fn format_info(&self, stats: &PackStats) -> String {
        let mut output = String::new();

        output.push_str("Pack Information:\n");
        output.push_str(&"-".repeat(40));
        output.push('\n');
        output.push_str(&format!(
            "  Total size:     {}\n",
            humanize_bytes(stats.total_bytes as u64)
        ));
        output.push_str(&format!("  Nodes:          {}\n", stats.nodes));
        output.push_str(&format!("  Containers:     {}\n", stats.containers));
        output.push_str(&format!("  Leaves:         {}\n", stats.leaves));
        output.push_str(&format!(
            "  Payload:        {}\n",
            humanize_bytes(stats.payload_bytes as u64)
        ));
        output.push_str(&format!(
            "  Headers:        {}\n",
            humanize_bytes(stats.header_bytes as u64)
        ));
        output.push_str(&format!("  Dependencies:   {}\n", stats.dependencies));
        output.push_str(&format!("  Max depth:      {}\n", stats.max_depth));

        if !stats.by_type.is_empty() {
            let kinds: Vec<_> = stats
                .by_type
                .iter()
                .map(|(kind, count)| format!("{} {}", count, kind))
                .collect();
            output.push_str(&format!("  Kinds:          {}\n", kinds.join(", ")));
        }

        output
    }

    fn format_check(&self, stats: &PackStats, dangling: &[DanglingDependency]) -> String {
        let mut output = String::new();

        if dangling.is_empty() {
            output.push_str(&format!(
                "OK - {} nodes decoded, all dependencies resolve\n",
                stats.nodes
            ));
        } else {
            output.push_str(&format!(
                "{} nodes decoded, {} dangling dependencies:\n",
                stats.nodes,
                dangling.len()
            ));
            for d in dangling {
                output.push_str(&format!("  {} -> {}\n", d.node, d.dependency));
            }
        }

        output
    }

    fn format_edit(&self, outcome: &EditOutcome<'_>) -> String {
        if outcome.applied {
            format!(
                "{} {}: {} -> {} bytes\n",
                outcome.action,
                outcome.target,
                outcome.bytes_before,
                outcome.bytes_after
            )
        } else {
            format!(
                "{} {}: refused (run with -vv for the reason)\n",
                outcome.action, outcome.target
            )
        }
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_list(&self, entries: &[EntryRef<'_>], _technical: bool) -> String {
        let items: Vec<_> = entries
            .iter()
            .map(|e| {
                json!({
                    "path": e.path.to_string(),
                    "type": e.node.node_type.as_str(),
                    "size": e.node.size,
                    "position": e.node.position,
                    "header_size": e.node.header_size(),
                    "depth": e.depth,
                    "dependencies": e.node.dependencies,
                })
            })
            .collect();

        serde_json::to_string_pretty(&items).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_info(&self, stats: &PackStats) -> String {
        let by_type: serde_json::Map<String, serde_json::Value> = stats
            .by_type
            .iter()
            .map(|(kind, count)| (kind.as_str().to_string(), json!(count)))
            .collect();
        let obj = json!({
            "total_bytes": stats.total_bytes,
            "nodes": stats.nodes,
            "containers": stats.containers,
            "leaves": stats.leaves,
            "payload_bytes": stats.payload_bytes,
            "header_bytes": stats.header_bytes,
            "dependencies": stats.dependencies,
            "max_depth": stats.max_depth,
            "by_type": by_type,
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_check(&self, stats: &PackStats, dangling: &[DanglingDependency]) -> String {
        let obj = json!({
            "success": dangling.is_empty(),
            "nodes": stats.nodes,
            "dangling": dangling
                .iter()
                .map(|d| json!({"node": d.node.to_string(), "dependency": d.dependency}))
                .collect::<Vec<_>>(),
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_edit(&self, outcome: &EditOutcome<'_>) -> String {
        let obj = json!({
            "action": outcome.action,
            "target": outcome.target,
            "applied": outcome.applied,
            "bytes_before": outcome.bytes_before,
            "bytes_after": outcome.bytes_after,
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Creates the appropriate formatter based on output format
pub fn create_formatter(format: super::OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        super::OutputFormat::Human => Box::new(HumanFormatter),
        super::OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Converts bytes to a human-readable string
pub fn humanize_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanize_bytes() {
        assert_eq!(humanize_bytes(0), "0 B");
        assert_eq!(humanize_bytes(1023), "1023 B");
        assert_eq!(humanize_bytes(1536), "1.5 KB");
        assert_eq!(humanize_bytes(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_refused_edit_message() {
        let outcome = EditOutcome {
            action: "rm",
            target: "/a",
            applied: false,
            bytes_before: 10,
            bytes_after: 10,
        };
        assert!(HumanFormatter.format_edit(&outcome).contains("refused"));
        let json: serde_json::Value =
            serde_json::from_str(&JsonFormatter.format_edit(&outcome)).unwrap();
        assert_eq!(json["applied"], false);
    }
}
