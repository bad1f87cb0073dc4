//! Plain-text rendering for tool and CLI output.

use super::DetailLevel;
use crate::model::{SidebarEntry, SidebarItems};
use crate::search::SearchMatch;
use crate::tree::{DocTree, ItemHit, ROOT_MODULE_LABEL, Suggestion};
use crate::validate::Report;
use std::fmt::Write as _;

fn module_label(module: &str) -> &str {
    if module.is_empty() {
        ROOT_MODULE_LABEL
    } else {
        module
    }
}

fn entry_line(output: &mut String, entry: &SidebarEntry, detail_level: DetailLevel) {
    let _ = write!(output, "  • {}", entry.name);
    let text = match detail_level {
        DetailLevel::Low => "",
        DetailLevel::Medium => entry.summary(),
        DetailLevel::High => entry.description.trim(),
    };
    if !text.is_empty() {
        let _ = write!(output, " - {}", text);
    }
    output.push('\n');
}

/// Overview of every module with item counts.
pub fn render_modules(tree: &DocTree) -> String {
    let stats = tree.stats();
    let mut output = format!(
        "Documentation at {} ({} modules, {} items):\n\n",
        tree.root().display(),
        stats.modules,
        stats.items
    );

    for (module, items) in tree.iter() {
        let _ = write!(output, "  • {} ({} items", module_label(module), items.len());
        let counts: Vec<String> = items
            .sections()
            .map(|(category, entries)| format!("{} {}", entries.len(), category))
            .collect();
        if !counts.is_empty() {
            let _ = write!(output, ": {}", counts.join(", "));
        }
        output.push_str(")\n");
    }

    if !tree.failures().is_empty() {
        let _ = writeln!(output, "\nUnparseable files ({}):", tree.failures().len());
        for failure in tree.failures() {
            let _ = writeln!(output, "  • {}: {}", failure.path.display(), failure.error);
        }
    }

    output
}

/// One module's sidebar, grouped by category.
pub fn render_module(module: &str, items: &SidebarItems, detail_level: DetailLevel) -> String {
    let mut output = format!("Module `{}`:\n", module_label(module));

    if items.is_empty() {
        output.push_str("\n(no items)\n");
        return output;
    }

    for (category, entries) in items.sections() {
        if entries.is_empty() {
            continue;
        }
        let _ = writeln!(output, "\n{} ({}):", category.label(), entries.len());
        for entry in entries {
            entry_line(&mut output, entry, detail_level);
        }
    }

    output
}

/// Resolved items for a lookup.
pub fn render_hits(hits: &[ItemHit<'_>], detail_level: DetailLevel) -> String {
    let mut output = String::new();
    for hit in hits {
        let _ = writeln!(output, "`{}` ({})", hit.qualified_path(), hit.category);
        let description = match detail_level {
            DetailLevel::Low => "",
            DetailLevel::Medium => hit.entry.summary(),
            DetailLevel::High => hit.entry.description.trim(),
        };
        if description.is_empty() {
            if detail_level != DetailLevel::Low {
                output.push_str("   (undocumented)\n");
            }
        } else {
            let _ = writeln!(output, "   {}", description);
        }
    }
    output
}

/// "Did you mean" block for an unresolved lookup.
pub fn render_suggestions(query: &str, suggestions: &[Suggestion]) -> String {
    let mut output = format!("No item found at '{}'.", query);
    if suggestions.is_empty() {
        output.push('\n');
        return output;
    }
    output.push_str(" Did you mean one of these?\n\n");
    for suggestion in suggestions {
        let _ = writeln!(output, "• `{}`", suggestion.path);
    }
    output
}

/// Validation results for one or more modules.
pub fn render_report<'a, I>(reports: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a Report)>,
{
    let mut output = String::new();
    let mut checked = 0;
    let mut failing = 0;

    for (module, report) in reports {
        checked += 1;
        if !report.is_ok() {
            failing += 1;
        }
        if report.violations.is_empty() {
            continue;
        }
        let _ = writeln!(output, "Module `{}`:", module_label(module));
        for violation in &report.violations {
            let _ = writeln!(output, "  {:?}: {}", violation.severity(), violation);
        }
        output.push('\n');
    }

    let _ = write!(
        output,
        "Checked {} module(s): {} with errors",
        checked, failing
    );
    output.push('\n');
    output
}

/// Ranked search results with relevance relative to the best hit.
pub fn render_search(results: &[SearchMatch], query: &str) -> String {
    if results.is_empty() {
        let mut msg = format!("No results found for '{}'.\n\n", query);
        msg.push_str("Search tips:\n");
        msg.push_str("• Try a shorter or more general term\n");
        msg.push_str("• Search uses stemming: 'converting' matches 'convert'\n");
        if query.contains("::") {
            msg.push_str("• Use lookup_item for full paths\n");
        }
        return msg;
    }

    let mut output = format!("Search results for '{}':\n\n", query);
    let max_rank = results.first().map_or(1.0, |r| r.rank).max(f32::EPSILON);

    for (idx, result) in results.iter().enumerate() {
        let relevance = ((result.rank / max_rank) * 100.0).round();
        let _ = writeln!(
            output,
            "{}. `{}` ({}) - relevance: {}%",
            idx + 1,
            result.doc.qualified_path(),
            result.doc.category,
            relevance
        );
        let description = result.doc.description.trim();
        if !description.is_empty() {
            let _ = writeln!(output, "   {}", description);
        }
        output.push('\n');
    }

    output
}
