//! Human-readable model listing.
//!
//! One section per entity bank, entities sorted by name, one attribute
//! per row. Status lines render through the `Entity` capability surface
//! so uncertainty is always visible in the output.

use crate::model::{Entity, Model, NodeKind, ValidationStatus};

pub fn render_model(model: &Model) -> String {
    let mut rows: Vec<String> = Vec::new();

    section(&mut rows, "Nodes:");
    for node in model.nodes.values() {
        entity_header(&mut rows, node);
        if let Some(package) = &node.package {
            rows.push(attr("package", package));
        }
        match &node.kind {
            NodeKind::Plain => {}
            NodeKind::ComponentManager { components } => {
                list(&mut rows, "components", components.iter().map(|c| c.to_string()));
            }
            NodeKind::Component { manager } => {
                rows.push(attr("manager", &manager.to_string()));
            }
        }
        if let Some(process) = &node.process {
            rows.push(attr("pid", &process.pid.to_string()));
            rows.push(attr("cmdline", &process.cmdline.join(" ")));
        }
        list(&mut rows, "publishes", node.publishes.keys().cloned());
        list(&mut rows, "subscribes", node.subscribes.keys().cloned());
        list(&mut rows, "provides", node.provides.keys().cloned());
        list(&mut rows, "calls", node.calls.keys().cloned());
        list(&mut rows, "action servers", node.action_servers.iter().cloned());
        list(&mut rows, "action clients", node.action_clients.iter().cloned());
        rows.push(String::new());
    }

    section(&mut rows, "Topics:");
    for topic in model.topics.values() {
        entity_header(&mut rows, topic);
        rows.push(attr("construct_type", &topic.construct_type));
        list(&mut rows, "publishers", topic.publishers.iter().map(|n| n.to_string()));
        list(&mut rows, "subscribers", topic.subscribers.iter().map(|n| n.to_string()));
        rows.push(String::new());
    }

    section(&mut rows, "Services:");
    for service in model.services.values() {
        entity_header(&mut rows, service);
        rows.push(attr("construct_type", &service.construct_type));
        list(&mut rows, "providers", service.providers.iter().map(|n| n.to_string()));
        list(&mut rows, "clients", service.clients.iter().map(|n| n.to_string()));
        rows.push(String::new());
    }

    section(&mut rows, "Actions:");
    for action in model.actions.values() {
        entity_header(&mut rows, action);
        if let Some(ty) = &action.construct_type {
            rows.push(attr("construct_type", ty));
        }
        list(&mut rows, "servers", action.servers.iter().map(|n| n.to_string()));
        list(&mut rows, "clients", action.clients.iter().map(|n| n.to_string()));
        list(&mut rows, "member topics", action.topics.values().map(|k| k.name.clone()));
        if !action.missing_suffixes.is_empty() {
            list(&mut rows, "missing suffixes", action.missing_suffixes.iter().cloned());
        }
        rows.push(String::new());
    }

    section(&mut rows, "Packages:");
    for package in model.packages.values() {
        rows.push(format!("  {}", "=".repeat(package.name.len() + 9)));
        rows.push(attr("name", &package.name));
        if let Some(version) = &package.version {
            rows.push(attr("version", version));
        }
        list(&mut rows, "nodes", package.nodes.iter().map(|n| n.to_string()));
        rows.push(String::new());
    }

    section(&mut rows, "Diagnostics:");
    for diagnostic in &model.diagnostics {
        rows.push(format!(
            "    - {:?} {} : {}",
            diagnostic.kind, diagnostic.entity, diagnostic.message
        ));
    }
    rows.push(String::new());

    rows.join("\n")
}

fn section(rows: &mut Vec<String>, title: &str) {
    rows.push(title.to_string());
    rows.push("=".repeat(title.len()));
    rows.push(String::new());
}

fn entity_header(rows: &mut Vec<String>, entity: &dyn Entity) {
    rows.push(format!("  {}", "=".repeat(entity.qualified_name().len() + 9)));
    rows.push(attr("name", entity.qualified_name()));
    rows.push(attr("status", status_label(entity.validation_status())));
}

fn status_label(status: ValidationStatus) -> &'static str {
    match status {
        ValidationStatus::Validated => "validated",
        ValidationStatus::Unvalidated => "unvalidated",
        ValidationStatus::Partial => "partial",
    }
}

fn attr(key: &str, value: &str) -> String {
    format!("        {} : {}", key, value)
}

fn list<I>(rows: &mut Vec<String>, key: &str, values: I)
where
    I: Iterator<Item = String>,
{
    let values: Vec<String> = values.collect();
    if values.is_empty() {
        return;
    }
    rows.push(format!("        {} :", key));
    for value in values {
        rows.push(format!("            - {}", value));
    }
}
