// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use markdown_view_engine::{InlineNode, MathSegment};

#[allow(dead_code)]
pub fn generate_markdown_content(size: usize) -> String {
    let base = "# Title\n\n## Section\n\nParagraph with **bold**, *emphasis* and `code` content.\nSecond line with a [link](https://example.com).\n\n- Bullet point with $x^2$ math\n  - Nested item\n- Another item\n\n```rust\nfn example() {\n    println!(\"Hello\");\n}\n```\n\n";
    base.repeat(size)
}

#[allow(dead_code)]
pub fn generate_inline_nodes(size: usize) -> Vec<InlineNode> {
    let mut nodes = Vec::with_capacity(size * 6);
    for i in 0..size {
        nodes.push(InlineNode::text(format!("Plain text {i} to Search through ")));
        nodes.push(InlineNode::Strong(vec![
            InlineNode::text("bold "),
            InlineNode::Emphasis(vec![InlineNode::text("and italic")]),
        ]));
        nodes.push(InlineNode::link(
            "https://example.com/page",
            vec![InlineNode::text("a link")],
        ));
        nodes.push(InlineNode::InlineCode("let x = 1;".to_string()));
        nodes.push(InlineNode::MathSegments(vec![
            MathSegment::Text(" where ".to_string()),
            MathSegment::Latex("x^2".to_string()),
        ]));
        if i % 10 == 9 {
            nodes.push(InlineNode::SoftBreak);
        }
    }
    nodes
}
