use super::{Mark, Node};
use crate::errors::{MarkdownError, MarkdownResult};

const BLOCK_SEPARATOR: &str = "\n\n";

pub(super) fn node(node: &Node) -> MarkdownResult<String> {
    match node.kind.as_str() {
        "doc" => blocks(&node.content, BLOCK_SEPARATOR),
        "paragraph" => inline(&node.content),
        "heading" => heading(node),
        "text" => text(node),
        "bulletList" => list(&node.content, |_| "- ".to_string()),
        "orderedList" => {
            let start = node.attr("start").and_then(|v| v.as_u64()).unwrap_or(1);
            list(&node.content, |index| format!("{}. ", start + index as u64))
        }
        "listItem" => blocks(&node.content, "\n"),
        "blockquote" => blockquote(node),
        "codeBlock" => code_block(node),
        "image" => image(node),
        "table" => table(node),
        "tableRow" => table_row(node).map(|cells| row_line(&cells)),
        "tableHeader" | "tableCell" => table_cell(node),
        "hardBreak" => Ok("\n".to_string()),
        "horizontalRule" => Ok("---".to_string()),
        "holder" => holder(node),
        other => Err(MarkdownError::InvalidNodeType(other.to_string())),
    }
}

fn blocks(children: &[Node], separator: &str) -> MarkdownResult<String> {
    let rendered = children.iter().map(node).collect::<MarkdownResult<Vec<_>>>()?;
    Ok(rendered.join(separator))
}

fn inline(children: &[Node]) -> MarkdownResult<String> {
    let rendered = children.iter().map(node).collect::<MarkdownResult<Vec<_>>>()?;
    Ok(rendered.concat())
}

fn heading(node: &Node) -> MarkdownResult<String> {
    let level = node
        .attr("level")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| missing("heading", "level"))?
        .clamp(1, 6) as usize;
    Ok(format!("{} {}", "#".repeat(level), inline(&node.content)?))
}

fn text(node: &Node) -> MarkdownResult<String> {
    let mut rendered = node.text.clone().ok_or_else(|| missing("text", "text"))?;
    for mark in &node.marks {
        rendered = apply_mark(mark, rendered)?;
    }
    Ok(rendered)
}

fn apply_mark(mark: &Mark, text: String) -> MarkdownResult<String> {
    let wrapped = match mark.kind.as_str() {
        "bold" | "strong" => format!("**{}**", text),
        "italic" | "em" => format!("_{}_", text),
        "code" => format!("`{}`", text),
        "strike" => format!("~~{}~~", text),
        "link" => {
            let href = mark.attr_str("href").ok_or_else(|| missing("link", "href"))?;
            format!("[{}]({})", text, href)
        }
        other => return Err(MarkdownError::InvalidMarkType(other.to_string())),
    };
    Ok(wrapped)
}

/// Items get `marker(index)` on their first line; later lines are indented
/// to line up under the item text.
fn list(items: &[Node], marker: impl Fn(usize) -> String) -> MarkdownResult<String> {
    let mut rendered = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let prefix = marker(index);
        let indent = " ".repeat(prefix.len());
        let body = node(item)?;

        let mut lines = body.lines();
        let mut out = format!("{}{}", prefix, lines.next().unwrap_or_default());
        for line in lines {
            out.push('\n');
            if !line.is_empty() {
                out.push_str(&indent);
                out.push_str(line);
            }
        }
        rendered.push(out);
    }
    Ok(rendered.join("\n"))
}

fn blockquote(node: &Node) -> MarkdownResult<String> {
    let body = blocks(&node.content, BLOCK_SEPARATOR)?;
    Ok(body
        .lines()
        .map(|line| {
            if line.is_empty() {
                ">".to_string()
            } else {
                format!("> {}", line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n"))
}

fn code_block(node: &Node) -> MarkdownResult<String> {
    let language = node.attr_str("language").unwrap_or_default();
    let mut code = String::new();
    for child in &node.content {
        match child.kind.as_str() {
            "text" => code.push_str(child.text.as_deref().unwrap_or_default()),
            _ => code.push_str(&self::node(child)?),
        }
    }
    Ok(format!("```{}\n{}\n```", language, code))
}

fn image(node: &Node) -> MarkdownResult<String> {
    let src = node.attr_str("src").ok_or_else(|| missing("image", "src"))?;
    let alt = node.attr_str("alt").unwrap_or_default();
    match node.attr_str("title") {
        Some(title) => Ok(format!("![{}]({} \"{}\")", alt, src, title)),
        None => Ok(format!("![{}]({})", alt, src)),
    }
}

fn table(node: &Node) -> MarkdownResult<String> {
    let mut lines = Vec::with_capacity(node.content.len() + 1);
    for (index, row) in node.content.iter().enumerate() {
        if row.kind != "tableRow" {
            return Err(MarkdownError::InvalidTree(format!(
                "table may only contain tableRow nodes, found '{}'",
                row.kind
            )));
        }
        let cells = table_row(row)?;
        lines.push(row_line(&cells));
        if index == 0 {
            lines.push(row_line(&vec!["---".to_string(); cells.len()]));
        }
    }
    Ok(lines.join("\n"))
}

fn table_row(row: &Node) -> MarkdownResult<Vec<String>> {
    row.content.iter().map(node).collect()
}

fn row_line(cells: &[String]) -> String {
    format!("| {} |", cells.join(" | "))
}

/// Cells hold block content; it is flattened onto one line with pipes escaped.
fn table_cell(node: &Node) -> MarkdownResult<String> {
    let body = blocks(&node.content, " ")?;
    Ok(body.replace('\n', " ").replace('|', "\\|"))
}

fn holder(node: &Node) -> MarkdownResult<String> {
    let name = node
        .attr_str("name")
        .or_else(|| node.attr_str("named"))
        .ok_or_else(|| missing("holder", "name"))?;
    Ok(format!("[{}]", name))
}

fn missing(node: &str, attribute: &str) -> MarkdownError {
    MarkdownError::MissingAttribute {
        node: node.to_string(),
        attribute: attribute.to_string(),
    }
}
