//! Canned template archives and their parts.

use serde_json::{json, Value};

use crate::ArchiveBuilder;

pub const FONT_BYTES: &[u8] = b"\x00\x01\x00\x00fake-truetype";
pub const PDF_BYTES: &[u8] = b"%PDF-1.7\n%fake letterhead\n%%EOF\n";
pub const TEX_SOURCE: &str = "\\documentclass{article}\n\\begin{document}\n$body$\n\\end{document}\n";

pub fn manifest() -> Value {
    json!({
        "metadata": { "name": "Quarterly report", "version": "1" },
        "theme": {
            "name": "Corporate",
            "fonts": [
                { "name": "theme/Inter-Regular.ttf", "weight": "400" },
                { "name": "theme/Inter-Bold.ttf", "weight": "700" }
            ],
            "colors": {
                "body_color": "#111111",
                "primary_color": "#0044cc",
                "secondary_color": "#777777",
                "heading_color": "#000000"
            },
            "typescale": { "h1": 2.0, "h2": 1.5, "p": 1.0 }
        },
        "layout": {
            "name": "A4 Letterhead",
            "slug": "a4-letterhead",
            "description": "Company letterhead",
            "engine": "pandoc/latex",
            "width": 210.0,
            "height": 297.0,
            "unit": "mm",
            "margin": { "top": 20, "bottom": 20, "left": 25, "right": 25 }
        },
        "flow": { "name": "Review", "controlled": true },
        "frame": { "name": "Article frame", "description": "Plain article", "type": "latex" },
        "variant": {
            "name": "Report",
            "prefix": "RPT",
            "description": "Quarterly report",
            "color": "#ffaa00",
            "fields": [
                { "name": "Author", "type": "string", "required": true },
                { "name": "Summary", "type": "text" },
                { "name": "Mood", "type": "sparkles" }
            ]
        },
        "data_template": { "title": "Q1 Report", "title_template": "Report [Quarter]" }
    })
}

pub fn template_tree() -> Value {
    json!({
        "type": "doc",
        "content": [
            {
                "type": "heading",
                "attrs": { "level": 1 },
                "content": [{ "type": "text", "text": "Summary" }]
            },
            {
                "type": "paragraph",
                "content": [
                    { "type": "text", "text": "Prepared by " },
                    { "type": "holder", "attrs": { "name": "Author" } }
                ]
            }
        ]
    })
}

/// Archive with every section and the files each one needs.
pub fn full_archive_builder(manifest: &Value) -> ArchiveBuilder {
    ArchiveBuilder::new()
        .json("manifest.json", manifest)
        .json("template.json", &template_tree())
        .file("theme/Inter-Regular.ttf", FONT_BYTES)
        .file("theme/Inter-Bold.ttf", FONT_BYTES)
        .file("layout/letterhead.pdf", PDF_BYTES)
        .file("frame/article.tex", TEX_SOURCE.as_bytes())
}

pub fn full_archive() -> Vec<u8> {
    full_archive_builder(&manifest()).build()
}
