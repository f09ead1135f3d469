use super::document::NotesDocument;

/// Render a structured notes document into Markdown.
///
/// Total and deterministic: never fails, and a fully empty document renders
/// to the single `# Meeting Notes` title line. Missing or empty fields emit
/// no lines at all (no placeholder text).
pub fn render_markdown(doc: &NotesDocument) -> String {
    let mut lines: Vec<String> = vec!["# Meeting Notes".to_string()];

    let header = &doc.header;
    if let Some(date) = present(&header.date) {
        lines.push(format!("**Date:** {}", date));
    }
    if let Some(time) = present(&header.time) {
        lines.push(format!("**Time:** {}", time));
    }
    if !header.attendees.is_empty() {
        lines.push("**Attendees:**".to_string());
        for attendee in &header.attendees {
            lines.push(format!("- {}", attendee));
        }
    }
    if let Some(subject) = present(&header.subject) {
        lines.push(String::new());
        lines.push(format!("**Subject:** {}", subject));
    }

    if !doc.topics.is_empty() {
        lines.push(String::new());
        lines.push("---".to_string());
        for (idx, topic) in doc.topics.iter().enumerate() {
            let number = idx + 1;
            let title = present(&topic.title)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Topic {}", number));
            let heading = match present(&topic.time_range) {
                Some(range) => format!("## {}. {} ({})", number, title, range),
                None => format!("## {}. {}", number, title),
            };
            lines.push(String::new());
            lines.push(heading);
            for bullet in &topic.bullets {
                lines.push(format!("- {}", bullet));
            }
            if let Some(conclusion) = present(&topic.conclusion) {
                lines.push(String::new());
                lines.push(format!("**Conclusion:** {}", conclusion));
            }
        }
    }

    if !doc.action_items.is_empty() {
        lines.push(String::new());
        lines.push("## Action Items".to_string());
        for group in &doc.action_items {
            let owner = present(&group.owner).unwrap_or("Unassigned");
            lines.push(format!("- **{}**", owner));
            for item in &group.items {
                let description = present(&item.description).unwrap_or("");
                match present(&item.deadline) {
                    Some(deadline) => lines.push(format!("  - {} (due {})", description, deadline)),
                    None => lines.push(format!("  - {}", description)),
                }
            }
        }
    }

    if !doc.metanotes.is_empty() {
        lines.push(String::new());
        lines.push("## Metanotes".to_string());
        for note in &doc.metanotes {
            lines.push(format!("- {}", note));
        }
    }

    lines.join("\n")
}

/// An optional string counts as present only when non-empty.
fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}
