//! Display formatting for CLI output
//!
//! SBIO pattern: Pure functions that format data for display

use super::commands::Identity;
use crate::cloudprovider::{NodeAddress, NodeAddressType, Zone};
use crate::config::Config;

// ============================================================================
// Table formatting helpers
// ============================================================================

/// Format a simple table with headers and rows
pub fn format_table(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    if rows.is_empty() {
        return "No resources found.\n".to_string();
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut output = String::new();
    let header_row: Vec<String> = headers.iter().map(|h| h.to_uppercase()).collect();
    for row in std::iter::once(header_row).chain(rows) {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| match widths.get(i) {
                Some(&width) => format!("{:width$}", cell, width = width),
                None => cell.clone(),
            })
            .collect();
        output.push_str(cells.join("   ").trim_end());
        output.push('\n');
    }

    output
}

/// Value or a dash when unset
fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

/// Show whether a secret is set without printing it
fn redacted(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        "<set>"
    }
}

// ============================================================================
// Config display
// ============================================================================

/// Format a loaded config. Secrets are never printed.
pub fn format_config_summary(config: &Config, path: &str) -> String {
    let g = &config.global;
    let lb = &config.load_balancer;
    let route = &config.route;

    let mut output = format!("✓ {} is valid\n\n", path);

    output.push_str("Global:\n");
    output.push_str(&format!("  Auth URL:     {}\n", or_dash(&g.auth_url)));
    output.push_str(&format!("  Region:       {}\n", or_dash(&g.region)));
    output.push_str(&format!(
        "  User:         {}\n",
        or_dash(if g.username.is_empty() { &g.user_id } else { &g.username })
    ));
    output.push_str(&format!(
        "  Tenant:       {}\n",
        or_dash(if g.tenant_name.is_empty() { &g.tenant_id } else { &g.tenant_name })
    ));
    output.push_str(&format!(
        "  Domain:       {}\n",
        or_dash(if g.domain_name.is_empty() { &g.domain_id } else { &g.domain_name })
    ));
    output.push_str(&format!("  Password:     {}\n", redacted(&g.password)));
    output.push_str(&format!("  API key:      {}\n", redacted(&g.api_key)));

    output.push_str("\nLoadBalancer:\n");
    output.push_str(&format!("  Subnet:       {}\n", or_dash(&lb.subnet_id)));
    output.push_str(&format!("  Floating net: {}\n", or_dash(&lb.floating_network_id)));
    output.push_str(&format!("  Method:       {}\n", or_dash(&lb.lb_method)));
    output.push_str(&format!("  Monitor:      {}\n", lb.create_monitor));
    if lb.create_monitor {
        output.push_str(&format!(
            "    delay {}, timeout {}, max retries {}\n",
            humantime::format_duration(lb.monitor_delay),
            humantime::format_duration(lb.monitor_timeout),
            lb.monitor_max_retries
        ));
    }

    output.push_str("\nRoute:\n");
    output.push_str(&format!("  Router:       {}\n", or_dash(&route.router_id)));
    output.push_str(&format!("  Hostname override: {}\n", route.hostname_override));

    output
}

// ============================================================================
// Provider display
// ============================================================================

pub fn format_zone(zone: &Zone) -> String {
    format!("Region: {}\n", or_dash(&zone.region))
}

pub fn format_instance_list(names: &[String]) -> String {
    let rows = names.iter().map(|n| vec![n.clone()]).collect();
    format_table(&["NAME"], rows)
}

pub fn format_node_addresses(addresses: &[NodeAddress]) -> String {
    let rows = addresses
        .iter()
        .map(|a| {
            let kind = match a.kind {
                NodeAddressType::InternalIP => "InternalIP",
                NodeAddressType::ExternalIP => "ExternalIP",
            };
            vec![kind.to_string(), a.address.clone()]
        })
        .collect();
    format_table(&["TYPE", "ADDRESS"], rows)
}

pub fn format_identity(identity: &Identity) -> String {
    let instance = if identity.instance_id.is_empty() {
        "(not running on an OpenStack instance)"
    } else {
        &identity.instance_id
    };
    format!(
        "Instance ID: {}\nNode name:   {}\n",
        instance, identity.node_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_format_table() {
        let headers = &["type", "address"];
        let rows = vec![
            vec!["InternalIP".to_string(), "10.0.0.1".to_string()],
            vec!["ExternalIP".to_string(), "1.2.3.4".to_string()],
        ];

        let output = format_table(headers, rows);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "TYPE         ADDRESS");
        assert_eq!(lines[1], "InternalIP   10.0.0.1");
        assert_eq!(lines[2], "ExternalIP   1.2.3.4");
    }

    #[test]
    fn test_format_table_empty() {
        let output = format_table(&["NAME"], vec![]);
        assert!(output.contains("No resources found"));
    }

    #[test]
    fn test_format_config_summary_redacts_secrets() {
        let mut config = Config::default();
        config.global.auth_url = "https://keystone:5000/v3".to_string();
        config.global.username = "admin".to_string();
        config.global.password = "hunter2".to_string();
        config.load_balancer.create_monitor = true;
        config.load_balancer.monitor_delay = Duration::from_secs(60);
        config.load_balancer.monitor_timeout = Duration::from_secs(30);
        config.load_balancer.monitor_max_retries = 3;

        let output = format_config_summary(&config, "cloud.conf");
        assert!(output.contains("cloud.conf is valid"));
        assert!(output.contains("https://keystone:5000/v3"));
        assert!(output.contains("admin"));
        assert!(output.contains("<set>"));
        assert!(!output.contains("hunter2"));
        assert!(output.contains("delay 1m, timeout 30s, max retries 3"));
    }

    #[test]
    fn test_format_node_addresses() {
        let output = format_node_addresses(&[
            NodeAddress::new(NodeAddressType::InternalIP, "10.0.0.1"),
            NodeAddress::new(NodeAddressType::ExternalIP, "1.2.3.4"),
        ]);
        assert!(output.starts_with("TYPE"));
        assert!(output.contains("InternalIP   10.0.0.1"));
        assert!(output.contains("ExternalIP   1.2.3.4"));
    }

    #[test]
    fn test_format_instance_list() {
        let output = format_instance_list(&["web-1".to_string(), "web-2".to_string()]);
        assert_eq!(output, "NAME\nweb-1\nweb-2\n");
        assert!(format_instance_list(&[]).contains("No resources found"));
    }

    #[test]
    fn test_format_identity() {
        let known = Identity {
            instance_id: "abc123".to_string(),
            node_name: "web-1".to_string(),
        };
        assert_eq!(
            format_identity(&known),
            "Instance ID: abc123\nNode name:   web-1\n"
        );

        let unknown = Identity {
            instance_id: String::new(),
            node_name: "laptop".to_string(),
        };
        assert!(format_identity(&unknown).contains("not running on an OpenStack instance"));
    }

    #[test]
    fn test_format_zone() {
        let zone = Zone {
            region: "RegionOne".to_string(),
        };
        assert_eq!(format_zone(&zone), "Region: RegionOne\n");
    }
}
