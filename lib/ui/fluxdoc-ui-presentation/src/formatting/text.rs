use fluxdoc_domain::DiagramFormat;

pub fn header(title: &str) -> String {
    format!("=== {title} ===")
}

pub fn sub_header(title: &str) -> String {
    format!("--- {title} ---")
}

/// Key padded so values line up in a column.
pub fn key_value(key: &str, value: &str) -> String {
    format!("{:<20} {}", format!("{key}:"), value)
}

/// Wraps diagram source in a fenced block tagged with its syntax.
pub fn diagram_block(format: DiagramFormat, body: &str) -> String {
    let mut block = format!("```{format}\n{body}");
    if !body.ends_with('\n') {
        block.push('\n');
    }
    block.push_str("```");
    block
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_value_alignment() {
        assert_eq!(key_value("STATUS", "Ready"), "STATUS:              Ready");
        assert_eq!(
            key_value("ATTEMPTED REVISION", "x"),
            "ATTEMPTED REVISION:  x"
        );
    }

    #[test]
    fn test_headers() {
        assert_eq!(header("Report"), "=== Report ===");
        assert_eq!(sub_header("Events"), "--- Events ---");
    }

    #[test]
    fn test_diagram_block_fences() {
        assert_eq!(
            diagram_block(DiagramFormat::Mermaid, "graph LR\n"),
            "```mermaid\ngraph LR\n```"
        );
        assert_eq!(
            diagram_block(DiagramFormat::Dot, "digraph {}"),
            "```dot\ndigraph {}\n```"
        );
    }
}
