//! Plain-text summary of a loaded workspace.

use std::fmt::{self, Write};

use cartograph_core::{
    Workspace,
    model::{Element, ElementId, Model},
};

/// Writes the workspace's elements, relationships, views and decisions as
/// indented text.
///
/// Elements are listed under their parents; implied relationships are
/// marked. The output is meant for people and is not a stable format.
pub fn render_summary(workspace: &Workspace) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_summary(&mut out, workspace);
    out
}

fn write_summary(out: &mut String, workspace: &Workspace) -> fmt::Result {
    let model = workspace.model();
    let name = if workspace.name().is_empty() {
        "(unnamed workspace)"
    } else {
        workspace.name()
    };
    writeln!(out, "Workspace: {name}")?;
    if !workspace.description().is_empty() {
        writeln!(out, "  {}", workspace.description())?;
    }

    writeln!(out, "\nElements ({}):", model.elements().count())?;
    for element in model.elements().filter(|e| e.parent().is_none()) {
        write_element(out, model, element, 1)?;
    }

    writeln!(out, "\nRelationships ({}):", model.relationships().count())?;
    for relationship in model.relationships() {
        let source = element_name(model, relationship.source());
        let destination = element_name(model, relationship.destination());
        write!(out, "  {source} -> {destination}")?;
        if !relationship.description().is_empty() {
            write!(out, " \"{}\"", relationship.description())?;
        }
        if !relationship.technology().is_empty() {
            write!(out, " [{}]", relationship.technology())?;
        }
        if relationship.is_implied() {
            write!(out, " (implied)")?;
        }
        writeln!(out)?;
    }

    let views = workspace.views();
    writeln!(out, "\nViews ({}):", views.views().count())?;
    for view in views.views() {
        write!(out, "  {} [{}]", view.key(), view.kind().keyword())?;
        if let Some(scope) = view.scope() {
            write!(out, " of {}", element_name(model, scope))?;
        }
        if let Some(environment) = view.environment() {
            write!(out, " in {environment}")?;
        }
        writeln!(
            out,
            ": {} elements, {} relationships",
            view.elements().count(),
            view.relationships().len()
        )?;
    }

    let documentation = workspace.documentation();
    if !documentation.is_empty() {
        writeln!(out, "\nDecisions ({}):", documentation.all().count())?;
        for decision in documentation.all() {
            write!(out, "  {}. {}", decision.id(), decision.title())?;
            if !decision.status().is_empty() {
                write!(out, " [{}]", decision.status())?;
            }
            if let Some(element) = decision.element() {
                write!(out, " of {}", element_name(model, element))?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

fn write_element(out: &mut String, model: &Model, element: &Element, depth: usize) -> fmt::Result {
    write!(
        out,
        "{:indent$}{} {}",
        "",
        element.kind().keyword(),
        element.name(),
        indent = depth * 2
    )?;
    if let Some(technology) = element.technology() {
        write!(out, " [{technology}]")?;
    }
    if let Some(group) = element.group() {
        write!(out, " (group: {group})")?;
    }
    writeln!(out)?;

    for child in model.children_of(element.id()) {
        write_element(out, model, child, depth + 1)?;
    }
    Ok(())
}

fn element_name(model: &Model, id: ElementId) -> &str {
    model.element(id).map_or("?", Element::name)
}
