//! End-to-end usage of the renderer: parse markdown, customize, render.

use std::cell::Cell;
use std::sync::{Arc, Mutex};

use cmark_ast::{Document, NodeRef, NodeType, NodeValue, Parser};
use cmark_config::Config;
use cmark_html::ext::{FootnotesExtension, TablesExtension};
use cmark_html::{
    Attributes, HtmlNodeRenderer, HtmlRenderer, MarkdownRenderer, RenderContext, RenderError,
};
use pretty_assertions::assert_eq;

fn parse(markdown: &str) -> Document {
    Parser::default().parse(markdown)
}

#[test]
fn test_parse_and_render() {
    let renderer = HtmlRenderer::builder().with_escape_html(true).build();
    let html = renderer.render_document(&parse("This is *Markdown*")).unwrap();
    assert_eq!(html, "<p>This is <em>Markdown</em></p>\n");
}

#[test]
fn test_add_attributes() {
    let renderer = HtmlRenderer::builder()
        .with_attribute_provider(|_| {
            |node: NodeRef<'_>, _tag: &str, attributes: &mut Attributes| {
                if let NodeValue::Image { .. } = node.value() {
                    attributes.insert("class", "border");
                }
            }
        })
        .build();
    let html = renderer.render_document(&parse("![text](/url.png)")).unwrap();
    assert_eq!(html, "<p><img src=\"/url.png\" alt=\"text\" class=\"border\" /></p>\n");
}

struct IndentedCodeBlockRenderer;

impl HtmlNodeRenderer for IndentedCodeBlockRenderer {
    fn node_types(&self) -> Vec<NodeType> {
        vec![NodeType::IndentedCodeBlock]
    }

    fn render(&self, node: NodeRef<'_>, ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        let NodeValue::IndentedCodeBlock { literal } = node.value() else {
            return Ok(());
        };
        ctx.writer().line()?;
        ctx.tag(node, "pre", &Attributes::new())?;
        ctx.writer().text(literal)?;
        ctx.writer().close_tag("pre")?;
        ctx.writer().line()?;
        Ok(())
    }
}

#[test]
fn test_custom_node_renderer() {
    let renderer = HtmlRenderer::builder()
        .with_node_renderer(|_| IndentedCodeBlockRenderer)
        .build();
    let html = renderer
        .render_document(&parse("Example:\n\n    code\n"))
        .unwrap();
    assert_eq!(html, "<p>Example:</p>\n<pre>code\n</pre>\n");
}

struct Tagged(&'static str);

impl HtmlNodeRenderer for Tagged {
    fn node_types(&self) -> Vec<NodeType> {
        vec![NodeType::Emphasis]
    }

    fn render(&self, node: NodeRef<'_>, ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        ctx.tag(node, self.0, &Attributes::new())?;
        ctx.render_children(node)?;
        ctx.writer().close_tag(self.0)?;
        Ok(())
    }
}

#[test]
fn test_first_registered_renderer_wins() {
    let renderer = HtmlRenderer::builder()
        .with_node_renderer(|_| Tagged("i"))
        .with_node_renderer(|_| Tagged("cite"))
        .build();
    let html = renderer.render_document(&parse("*x*")).unwrap();
    assert_eq!(html, "<p><i>x</i></p>\n");
}

#[test]
fn test_later_provider_overrides_earlier() {
    let renderer = HtmlRenderer::builder()
        .with_attribute_provider(|_| {
            |_: NodeRef<'_>, tag: &str, attributes: &mut Attributes| {
                if tag == "p" {
                    attributes.insert("class", "a");
                    attributes.insert("id", "first");
                }
            }
        })
        .with_attribute_provider(|_| {
            |_: NodeRef<'_>, tag: &str, attributes: &mut Attributes| {
                if tag == "p" {
                    attributes.insert("class", "b");
                }
            }
        })
        .build();
    let html = renderer.render_document(&parse("x")).unwrap();
    assert_eq!(html, "<p class=\"b\" id=\"first\">x</p>\n");
}

#[test]
fn test_rendering_is_deterministic() {
    let markdown = "# Title\n\n- a\n- *b*\n\n> [link](https://x.example \"t\")\n\n```sh\nls\n```\n";
    let renderer = HtmlRenderer::builder()
        .with_sanitize_urls(true)
        .with_percent_encode_urls(true)
        .build();
    let doc = parse(markdown);
    let first = renderer.render_document(&doc).unwrap();
    for _ in 0..5 {
        assert_eq!(renderer.render_document(&doc).unwrap(), first);
    }
}

#[test]
fn test_omit_single_paragraph_p() {
    let omit = HtmlRenderer::builder()
        .with_omit_single_paragraph_p(true)
        .build();
    assert_eq!(omit.render_document(&parse("hello")).unwrap(), "hello");
    assert_eq!(
        HtmlRenderer::default().render_document(&parse("hello")).unwrap(),
        "<p>hello</p>\n"
    );
}

#[test]
fn test_unhandled_node_type_fails() {
    let mut doc = Document::new();
    doc.append(
        Document::ROOT,
        NodeValue::Custom {
            name: "youtube",
            literal: "dQw4w9WgXcQ".to_owned(),
        },
    );
    let err = HtmlRenderer::default().render_document(&doc).unwrap_err();
    assert!(matches!(
        err,
        RenderError::UnhandledNode {
            node_type: NodeType::Custom("youtube")
        }
    ));
}

struct YoutubeRenderer;

impl HtmlNodeRenderer for YoutubeRenderer {
    fn node_types(&self) -> Vec<NodeType> {
        vec![NodeType::Custom("youtube")]
    }

    fn render(&self, node: NodeRef<'_>, ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        let NodeValue::Custom { literal, .. } = node.value() else {
            return Ok(());
        };
        let src = format!("https://www.youtube.com/embed/{literal}");
        ctx.writer().line()?;
        ctx.tag(node, "iframe", &Attributes::new().with("src", src))?;
        ctx.writer().close_tag("iframe")?;
        ctx.writer().line()?;
        Ok(())
    }
}

#[test]
fn test_custom_node_type_with_renderer() {
    let mut doc = Document::new();
    doc.append(
        Document::ROOT,
        NodeValue::Custom {
            name: "youtube",
            literal: "abc".to_owned(),
        },
    );
    let html = HtmlRenderer::builder()
        .with_node_renderer(|_| YoutubeRenderer)
        .build()
        .render_document(&doc)
        .unwrap();
    assert_eq!(
        html,
        "<iframe src=\"https://www.youtube.com/embed/abc\"></iframe>\n"
    );
}

/// Counts the paragraphs it renders; must start from zero on every call.
struct CountingParagraphs {
    seen: Cell<usize>,
}

impl HtmlNodeRenderer for CountingParagraphs {
    fn node_types(&self) -> Vec<NodeType> {
        vec![NodeType::Paragraph]
    }

    fn render(&self, node: NodeRef<'_>, ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        self.seen.set(self.seen.get() + 1);
        let id = format!("p{}", self.seen.get());
        ctx.tag(node, "p", &Attributes::new().with("id", id))?;
        ctx.render_children(node)?;
        ctx.writer().close_tag("p")?;
        ctx.writer().line()?;
        Ok(())
    }
}

#[test]
fn test_renderer_state_is_per_call() {
    let renderer = HtmlRenderer::builder()
        .with_node_renderer(|_| CountingParagraphs { seen: Cell::new(0) })
        .build();
    let doc = parse("a\n\nb");
    let expected = "<p id=\"p1\">a</p>\n<p id=\"p2\">b</p>\n";
    assert_eq!(renderer.render_document(&doc).unwrap(), expected);
    assert_eq!(renderer.render_document(&doc).unwrap(), expected);
}

#[test]
fn test_concurrent_renders_share_renderer() {
    let renderer = HtmlRenderer::builder()
        .with_node_renderer(|_| CountingParagraphs { seen: Cell::new(0) })
        .with_extension(&FootnotesExtension)
        .build();
    let expected = renderer.render_document(&parse("one\n\ntwo")).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let renderer = &renderer;
                scope.spawn(move || {
                    let doc = parse("one\n\ntwo");
                    (0..20)
                        .map(|_| renderer.render_document(&doc).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        for handle in handles {
            for html in handle.join().unwrap() {
                assert_eq!(html, expected);
            }
        }
    });
}

#[test]
fn test_markdown_renderer_from_config_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("cmark.toml");
    std::fs::write(
        &path,
        r#"
[html]
sanitize_urls = true

[extensions]
enabled = ["tables", "task_list_items"]
"#,
    )
    .unwrap();

    let config = Config::load(Some(&path)).unwrap();
    let renderer = MarkdownRenderer::from_config(&config).unwrap();

    let html = renderer
        .render_markdown("- [x] [ok](javascript:alert(1))\n\n| h |\n|---|\n")
        .unwrap();
    assert_eq!(
        html,
        "<ul>\n<li><input type=\"checkbox\" disabled=\"\" checked=\"\" /> \
         <a rel=\"nofollow\" href=\"\">ok</a></li>\n</ul>\n\
         <table>\n<thead>\n<tr>\n<th>h</th>\n</tr>\n</thead>\n</table>\n"
    );
}

#[test]
fn test_extension_parser_and_renderer_halves() {
    let parser = Parser::builder().with_extension(&TablesExtension).build();
    let doc = parser.parse("| a |\n|---|\n| 1 |\n");

    let err = HtmlRenderer::default().render_document(&doc).unwrap_err();
    assert_eq!(
        err.to_string(),
        "No renderer registered for node type `table`"
    );

    let html = HtmlRenderer::builder()
        .with_extension(&TablesExtension)
        .build()
        .render_document(&doc)
        .unwrap();
    assert!(html.contains("<td>1</td>"));
}

/// Records its lifecycle calls into a shared log.
struct Recording {
    name: &'static str,
    log: Arc<Mutex<Vec<String>>>,
}

impl Recording {
    fn record(&self, event: &str) {
        self.log.lock().unwrap().push(format!("{event}:{}", self.name));
    }
}

impl HtmlNodeRenderer for Recording {
    fn node_types(&self) -> Vec<NodeType> {
        vec![NodeType::Paragraph]
    }

    fn before_root(&self, _root: NodeRef<'_>, _ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        self.record("before");
        Ok(())
    }

    fn render(&self, node: NodeRef<'_>, ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        self.record("render");
        ctx.render_children(node)
    }

    fn after_root(&self, _root: NodeRef<'_>, ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        self.record("after");
        ctx.writer().raw(&format!("[{}]", self.name))?;
        Ok(())
    }
}

#[test]
fn test_root_hooks_reach_shadowed_renderers() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let first = Arc::clone(&log);
    let second = Arc::clone(&log);
    let renderer = HtmlRenderer::builder()
        .with_node_renderer(move |_| Recording {
            name: "a",
            log: Arc::clone(&first),
        })
        .with_node_renderer(move |_| Recording {
            name: "b",
            log: Arc::clone(&second),
        })
        .build();

    let html = renderer.render_document(&parse("x")).unwrap();
    assert_eq!(html, "x[a][b]");
    assert_eq!(
        *log.lock().unwrap(),
        vec!["before:a", "before:b", "render:a", "after:a", "after:b"]
    );
}
