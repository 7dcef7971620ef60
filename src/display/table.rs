//! Plugin table for `plugins list`

use prettytable::{format, Cell, Row, Table};

use crate::display::ColourManager;
use crate::plugin::{PluginDescriptor, PluginManager};

/// Join names for a table cell, `-` when there are none
fn name_list<'a, I>(names: I) -> String
where
    I: IntoIterator<Item = &'a String>,
{
    let joined: Vec<&str> = names.into_iter().map(String::as_str).collect();
    if joined.is_empty() {
        "-".to_string()
    } else {
        joined.join(", ")
    }
}

fn plugin_row(manager: &PluginManager, descriptor: &PluginDescriptor, colours: &ColourManager) -> Row {
    let dependents = name_list(
        manager
            .dependents()
            .get(&descriptor.name)
            .into_iter()
            .flatten(),
    );
    let status = if descriptor.enabled {
        colours.success("enabled")
    } else {
        colours.dim("disabled")
    };

    // Coloured cell goes last so escape codes cannot skew column widths
    Row::new(vec![
        Cell::new(&descriptor.name),
        Cell::new(&descriptor.module_reference),
        Cell::new(&name_list(&descriptor.depends)),
        Cell::new(&dependents),
        Cell::new(&status.to_string()),
    ])
}

/// Discovered plugins in discovery order, indented two spaces
pub fn format_plugin_table(manager: &PluginManager, colours: &ColourManager) -> String {
    if manager.descriptors().is_empty() {
        return String::new();
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);
    table.add_row(Row::new(
        ["NAME", "MODULE", "DEPENDS", "REQUIRED BY", "STATUS"]
            .iter()
            .map(|header| Cell::new(&colours.highlight(header).to_string()))
            .collect(),
    ));
    for descriptor in manager.descriptors() {
        table.add_row(plugin_row(manager, descriptor, colours));
    }

    let mut result = String::new();
    for line in table.to_string().lines() {
        result.push_str("  ");
        result.push_str(line.trim_end());
        result.push('\n');
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{HostContext, PluginFactoryRegistry};
    use std::path::PathBuf;

    fn descriptor(name: &str, enabled: bool, depends: &[&str]) -> PluginDescriptor {
        PluginDescriptor {
            name: name.to_string(),
            module_reference: format!("builtin.{}", name),
            enabled,
            depends: depends.iter().map(|d| d.to_string()).collect(),
            manifest_location: PathBuf::from(format!("plugins/{}/plugin.yaml", name)),
        }
    }

    #[test]
    fn test_table_lists_every_plugin() {
        let manager = PluginManager::new(
            vec![descriptor("daytime", true, &[]), descriptor("calendar", false, &["daytime"])],
            PluginFactoryRegistry::new(),
            HostContext::new(),
        );
        let output = format_plugin_table(&manager, &ColourManager::with_colours(false));
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|line| line.starts_with("  ")));
        assert!(lines[0].contains("NAME"));
        assert!(lines[1].contains("daytime") && lines[1].contains("calendar") && lines[1].ends_with("enabled"));
        assert!(lines[2].contains("builtin.calendar") && lines[2].ends_with("disabled"));
    }

    #[test]
    fn test_empty_manager_renders_nothing() {
        let manager = PluginManager::new(Vec::new(), PluginFactoryRegistry::new(), HostContext::new());
        assert!(format_plugin_table(&manager, &ColourManager::with_colours(false)).is_empty());
    }
}
