//! Render command - render a config against a state snapshot.

use anyhow::Result;
use clap::Args;
use tessera_render::{LayoutView, RenderSession, RenderTree, RenderedComponent, WidgetView};

use super::{Context, SessionArgs};

/// Arguments for the render command.
#[derive(Args, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Fetch `api` data bindings from the server before rendering
    #[arg(long)]
    pub fetch: bool,
}

/// Run the render command.
pub async fn run(args: RenderArgs, ctx: &Context) -> Result<()> {
    let mut session = args.session.session(ctx)?;
    if args.fetch {
        fetch_bindings(&mut session, ctx).await?;
    }

    let tree = session.render();
    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else {
        for line in outline(&tree) {
            println!("{}", line);
        }
    }
    Ok(())
}

/// Fetch every visible `api` binding once. Failed fetches leave the state
/// key unset.
async fn fetch_bindings(session: &mut RenderSession, ctx: &Context) -> Result<()> {
    let data = ctx.client()?.data();
    for target in session.refresh_targets() {
        match data.fetch(&target.endpoint).await {
            Ok(value) => {
                session.apply_external_update(target.patch(value));
            }
            Err(e) => {
                tracing::warn!(
                    component = %target.component_id,
                    endpoint = %target.endpoint,
                    error = %e,
                    "Binding fetch failed"
                );
            }
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Text outline
// ─────────────────────────────────────────────────────────────────────────────

/// Plain-text outline of a render tree.
pub fn outline(tree: &RenderTree) -> Vec<String> {
    let mut lines = vec![format!(
        "{} v{} ({})",
        tree.config_id,
        tree.version,
        tree.root.kind()
    )];

    match &tree.root {
        LayoutView::Single { content: None } => lines.push("  (nothing to display)".to_string()),
        LayoutView::Single { content: Some(c) } => component_lines(c, "", &mut lines),
        LayoutView::Split { left, right } => {
            for (side, slot) in [("left", left), ("right", right)] {
                match slot {
                    Some(c) => component_lines(c, &format!("{}: ", side), &mut lines),
                    None => lines.push(format!("  {}: (empty)", side)),
                }
            }
        }
        LayoutView::Tabs { tabs, active } => {
            for tab in tabs {
                let marker = if active.as_deref() == Some(tab.key.as_str()) { "*" } else { "" };
                component_lines(&tab.content, &format!("tab{} ", marker), &mut lines);
            }
        }
        LayoutView::Dashboard { cells, .. } => {
            for cell in cells {
                let place = format!("[{},{} {}x{}] ", cell.column, cell.row, cell.width, cell.height);
                component_lines(&cell.content, &place, &mut lines);
            }
        }
    }
    lines
}

fn component_lines(component: &RenderedComponent, prefix: &str, lines: &mut Vec<String>) {
    let title = component.title.as_deref().unwrap_or(&component.id);
    lines.push(format!(
        "  {}{} ({}, {})",
        prefix,
        title,
        component.id,
        component.kind.as_str()
    ));

    let detail = |text: String| format!("      {}", text);
    match &component.view {
        WidgetView::Form { fields, .. } => {
            for field in fields {
                let value = field
                    .value
                    .as_ref()
                    .map(tessera_render::display_value)
                    .unwrap_or_default();
                let required = if field.required { "*" } else { "" };
                lines.push(detail(format!("{}{}: {}", field.label, required, value)));
            }
        }
        WidgetView::Table {
            headers,
            rows,
            total_rows,
            ..
        } => {
            lines.push(detail(headers.join(" | ")));
            for row in rows {
                lines.push(detail(row.join(" | ")));
            }
            lines.push(detail(format!("{} of {} rows", rows.len(), total_rows)));
        }
        WidgetView::Stats { stats } => {
            for stat in stats {
                lines.push(detail(format!("{}: {}", stat.label, stat.value)));
            }
        }
        WidgetView::Chart { points, .. } => {
            for point in points {
                lines.push(detail(format!("{}: {}", point.label, point.value)));
            }
        }
        WidgetView::Calendar { entries } | WidgetView::Timeline { events: entries } => {
            for entry in entries {
                lines.push(detail(format!("{} {}", entry.at, entry.label)));
            }
        }
        WidgetView::Kanban { lanes } => {
            for lane in lanes {
                lines.push(detail(format!("{}: {}", lane.title, lane.cards.join(", "))));
            }
        }
        WidgetView::FileUpload { accept, selected, .. } => {
            if let Some(accept) = accept {
                lines.push(detail(format!("accepts {}", accept)));
            }
            for file in selected {
                lines.push(detail(file.clone()));
            }
        }
        WidgetView::Wizard { steps, current } => {
            for (i, step) in steps.iter().enumerate() {
                let marker = if i == *current { ">" } else { " " };
                lines.push(detail(format!("{} {}", marker, step.title)));
            }
        }
        WidgetView::Dashboard { entries, .. } => {
            for (key, value) in entries {
                lines.push(detail(format!("{}: {}", key, value)));
            }
        }
        WidgetView::Raw { data } => lines.push(detail(data.to_string())),
    }

    if !component.actions.is_empty() {
        let labels: Vec<&str> = component.actions.iter().map(|a| a.label.as_str()).collect();
        lines.push(detail(format!("actions: {}", labels.join(", "))));
    }
}
