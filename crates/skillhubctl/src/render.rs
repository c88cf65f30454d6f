//! Output rendering for skillhubctl.

use serde_json::Value;
use skillhub_core::{HealthStatus, HubInfo, Provider};

/// Print the hub status and its skills grouped by provider.
pub fn print_hub_info(info: &HubInfo) {
    println!("{}: {}", info.name, info.status);

    for (label, names) in group_by_provider(&info.available_skills) {
        println!();
        println!("  {} ({}):", label, names.len());
        for name in names {
            println!("    {name}");
        }
    }

    println!();
    println!("{} skill(s)", info.total_skills);
}

pub fn print_health(addr: &str, health: &HealthStatus) {
    println!("Hub:    {addr}");
    println!("Status: {}", health.status);
}

/// Print a skill result as pretty JSON.
pub fn print_result(value: &Value) {
    println!("{}", to_pretty(value));
}

pub fn to_pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Group skill names under their provider's display name, in provider order.
/// Names with no known prefix are collected under "Other".
fn group_by_provider(names: &[String]) -> Vec<(&'static str, Vec<&str>)> {
    let mut groups: Vec<(&'static str, Vec<&str>)> = Provider::ALL
        .iter()
        .map(|p| (p.display_name(), Vec::new()))
        .collect();
    let mut other = Vec::new();

    for name in names {
        match Provider::for_skill(name)
            .and_then(|p| Provider::ALL.iter().position(|candidate| *candidate == p))
        {
            Some(index) => groups[index].1.push(name.as_str()),
            None => other.push(name.as_str()),
        }
    }

    groups.push(("Other", other));
    groups.retain(|(_, names)| !names.is_empty());
    groups
}
