use crate::display::{Content, Display};
use crate::models::{PageFragment, StatisticsPayload};

fn separator() -> String {
    "\u{2500}".repeat(58)
}

/// Format one fragment as a plain-text block.
pub fn format_fragment(fragment: &PageFragment) -> String {
    let mut output = String::new();
    output.push_str(&fragment.heading);
    output.push('\n');
    if let Some(ref subtitle) = fragment.subtitle {
        output.push_str(subtitle);
        output.push('\n');
    }
    output.push_str(&separator());
    output.push('\n');
    if fragment.items.is_empty() {
        output.push_str("(none)\n");
    }
    for line in fragment.lines() {
        output.push_str(&line);
        output.push('\n');
    }
    output
}

/// Format every fragment of a report, one block per page.
pub fn format_report(fragments: &[PageFragment]) -> String {
    fragments
        .iter()
        .map(format_fragment)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format what the display currently shows.
pub fn format_display(display: &Display) -> String {
    match &display.content {
        Content::Empty => String::new(),
        Content::Loading => crate::display::LOADING_MESSAGE.to_string(),
        Content::Error { title, message, .. } => format!("{}\n{}", title, message),
        Content::Report { page, index, count } => {
            let mut output = format_report(page);
            if *count > 1 {
                output.push_str(&format!("\nPage {}/{}", index + 1, count));
            }
            output
        }
    }
}

/// Format the raw service payload as pretty-printed JSON.
pub fn format_json(payload: &StatisticsPayload) -> String {
    serde_json::to_string_pretty(payload).unwrap_or_else(|_| "{}".to_string())
}
