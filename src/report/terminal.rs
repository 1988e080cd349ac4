use crate::analysis::{AppStats, Stat};
use crate::model::{Element, ElementId, LayoutTree};
use colored::Colorize;

/// Terminal reporter with colored output
pub struct TerminalReporter {
    /// Show button statistics per app
    show_buttons: bool,
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self { show_buttons: true }
    }

    pub fn with_buttons(mut self, show: bool) -> Self {
        self.show_buttons = show;
        self
    }

    pub fn report_apps(&self, apps: &[AppStats]) {
        if apps.is_empty() {
            println!("{}", "No applications analyzed.".yellow().bold());
            return;
        }

        println!();
        for app in apps {
            println!("{}", app.package.cyan().bold());
            println!(
                "  {} layouts, {} modelled, {} skipped",
                app.layout_count, app.layouts_modelled, app.layouts_skipped
            );
            if app.decode_errors > 0 {
                println!(
                    "  {}",
                    format!("{} Unicode decode errors", app.decode_errors).red()
                );
            }
            if self.show_buttons {
                println!(
                    "  {} buttons per layout: mean {}, median {}, max {}",
                    "→".dimmed(),
                    app.buttons.mean,
                    app.buttons.median,
                    app.buttons.max
                );
                println!("  {} button coverage: {}", "→".dimmed(), format_ratio(app.ratio_mean));
            }
        }

        self.print_summary(apps);
    }

    fn print_summary(&self, apps: &[AppStats]) {
        let layouts: usize = apps.iter().map(|a| a.layout_count).sum();
        let modelled: usize = apps.iter().map(|a| a.layouts_modelled).sum();
        let skipped: usize = apps.iter().map(|a| a.layouts_skipped).sum();
        let decode_errors: usize = apps.iter().map(|a| a.decode_errors).sum();

        println!("{}", "─".repeat(60).dimmed());

        let mut parts = vec![
            format!("{} apps", apps.len()).green().to_string(),
            format!("{} layouts", layouts),
            format!("{} modelled", modelled).green().to_string(),
        ];
        if skipped > 0 {
            parts.push(format!("{} skipped", skipped).yellow().to_string());
        }
        if decode_errors > 0 {
            parts.push(format!("{} decode errors", decode_errors).red().to_string());
        }
        println!("Summary: {}", parts.join(", "));
        println!();
    }

    /// Print a layout tree, one element per line
    pub fn print_tree(&self, tree: &LayoutTree) {
        for (id, element) in tree.iter() {
            let indent = "  ".repeat(tree.depth(id));
            let tag = if element.is_button() {
                element.tag_name().green().bold()
            } else if element.as_layout().is_some() {
                element.tag_name().cyan().bold()
            } else {
                element.tag_name().normal()
            };
            println!("{}{} {}", indent, tag, describe(tree, id, element).dimmed());
        }
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn format_ratio(ratio: Stat) -> String {
    match ratio.value() {
        Some(ratio) => format!("{:.1}%", ratio * 100.0),
        None => ratio.to_string(),
    }
}

/// Geometry and attributes of one element, without its tag
pub fn describe(tree: &LayoutTree, id: ElementId, element: &Element) -> String {
    let size = |dimension: Option<crate::units::Dip>| {
        dimension.map_or_else(|| "?".to_string(), |d| d.to_string())
    };

    let mut parts = vec![
        id.to_string(),
        format!("{} x {}", size(element.width()), size(element.height())),
    ];
    if let Some(element_id) = element.id() {
        parts.push(format!("id={}", element_id));
    }
    if let Some(gravity) = &element.attrs().gravity {
        parts.push(format!("gravity={}", gravity));
    }
    if let Some(layout) = element.as_layout() {
        parts.push(format!("{:?}", layout.orientation).to_lowercase());
        if let Ok(ratio) = tree.button_ratio(id) {
            parts.push(format!("buttons={:.1}%", ratio * 100.0));
        }
    }
    if let Some(button) = element.as_button() {
        if let Some(text) = &button.text {
            parts.push(format!("text={:?}", text));
        }
        parts.push(format!("size={}", button.text_size));
    }

    parts.join(" ")
}
