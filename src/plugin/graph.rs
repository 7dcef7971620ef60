//! Dependency graph
//!
//! Reverse dependency index and load-order resolution for enabled plugins.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use log::{debug, error, warn};

use super::traits::PluginDescriptor;

/// Plugin name -> names of the plugins that depend on it
pub type DependentsIndex = BTreeMap<String, BTreeSet<String>>;

/// Build the reverse dependency index.
///
/// Every descriptor gets an entry, even with no dependents. A dependency on
/// an unknown plugin is logged and the edge dropped.
pub fn build_dependents(descriptors: &[PluginDescriptor]) -> DependentsIndex {
    let mut dependents: DependentsIndex = descriptors
        .iter()
        .map(|d| (d.name.clone(), BTreeSet::new()))
        .collect();

    for descriptor in descriptors {
        for dep in &descriptor.depends {
            match dependents.get_mut(dep) {
                Some(set) => {
                    set.insert(descriptor.name.clone());
                }
                None => warn!("Unknown dependency '{}' for plugin '{}'.", dep, descriptor.name),
            }
        }
    }

    dependents
}

/// Names of enabled plugins in an order where dependencies come first.
///
/// Kahn's algorithm over the enabled descriptors, seeded in discovery order.
/// Dependencies on unknown plugins are ignored. A dependency on a known but
/// disabled plugin can never be satisfied, so it is reported the same way
/// as a cycle: the error is logged and every enabled plugin is returned in
/// discovery order instead.
pub fn resolve_load_order(descriptors: &[PluginDescriptor], dependents: &DependentsIndex) -> Vec<String> {
    let known: HashSet<&str> = descriptors.iter().map(|d| d.name.as_str()).collect();
    let position: HashMap<&str, usize> = descriptors
        .iter()
        .enumerate()
        .map(|(i, d)| (d.name.as_str(), i))
        .collect();
    let enabled: Vec<&PluginDescriptor> = descriptors.iter().filter(|d| d.enabled).collect();

    let mut remaining: HashMap<&str, HashSet<&str>> = enabled
        .iter()
        .map(|d| {
            let reqs = d
                .depends
                .iter()
                .map(String::as_str)
                .filter(|dep| known.contains(dep))
                .collect();
            (d.name.as_str(), reqs)
        })
        .collect();

    let mut queue: VecDeque<&str> = enabled
        .iter()
        .map(|d| d.name.as_str())
        .filter(|name| remaining.get(name).map_or(false, HashSet::is_empty))
        .collect();

    let mut order = Vec::with_capacity(enabled.len());
    while let Some(name) = queue.pop_front() {
        order.push(name.to_string());
        remaining.remove(name);

        let Some(children) = dependents.get(name) else {
            continue;
        };
        let mut children: Vec<&str> = children.iter().map(String::as_str).collect();
        children.sort_by_key(|child| position.get(child).copied().unwrap_or(usize::MAX));

        for child in children {
            if let Some(reqs) = remaining.get_mut(child) {
                if reqs.remove(name) && reqs.is_empty() {
                    queue.push_back(child);
                }
            }
        }
    }

    if !remaining.is_empty() {
        let mut unresolved: Vec<(&str, Vec<&str>)> = remaining
            .iter()
            .map(|(name, reqs)| {
                let mut reqs: Vec<&str> = reqs.iter().copied().collect();
                reqs.sort_unstable();
                (*name, reqs)
            })
            .collect();
        unresolved.sort_by_key(|(name, _)| position.get(name).copied().unwrap_or(usize::MAX));

        error!("Circular or missing dependencies detected: {:?}", unresolved);
        return enabled.iter().map(|d| d.name.clone()).collect();
    }

    debug!("Resolved plugin load order: {:?}", order);
    order
}
