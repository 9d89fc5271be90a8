//! pulldown-cmark backed markup engine.
//!
//! Translates the pulldown-cmark event stream into markdown-it shaped tokens:
//! block containers become `*_open`/`*_close` pairs flagged `block`, runs of
//! inline content are wrapped into `inline` tokens carrying children, and
//! images carry their alt text as children.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::engine::MarkupEngine;
use crate::error::ParseError;
use crate::normalize::render_inline_as_text;
use crate::token::Token;

/// CommonMark engine with GFM tables, strikethrough and task lists.
#[derive(Debug, Clone, Copy)]
pub struct PulldownEngine {
    options: Options,
}

impl Default for PulldownEngine {
    fn default() -> Self {
        Self {
            options: Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS,
        }
    }
}

impl PulldownEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with explicit pulldown-cmark options.
    pub fn with_options(options: Options) -> Self {
        Self { options }
    }
}

impl MarkupEngine for PulldownEngine {
    fn parse(&self, source: &str) -> Result<Vec<Token>, ParseError> {
        let mut state = TokenState::default();
        for event in Parser::new_ext(source, self.options) {
            state.handle_event(event);
        }
        Ok(state.finish())
    }
}

/// Image whose alt text is still being collected.
struct ImageFrame {
    token: Token,
    alt: Vec<Token>,
}

#[derive(Default)]
struct TokenState {
    tokens: Vec<Token>,
    /// Pending inline children, flushed into an `inline` token at the next
    /// block boundary.
    inline: Option<Vec<Token>>,
    images: Vec<ImageFrame>,
    /// Start number per open list, `None` for bullet lists.
    lists: Vec<Option<u64>>,
    code: Option<Token>,
    in_table_head: bool,
    in_table_body: bool,
}

fn block_open(kind: &str, tag: &str) -> Token {
    Token::open(format!("{kind}_open")).with_tag(tag).with_block(true)
}

fn block_close(kind: &str, tag: &str) -> Token {
    Token::close(format!("{kind}_close")).with_tag(tag).with_block(true)
}

fn heading_level(level: HeadingLevel) -> usize {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

impl TokenState {
    fn handle_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.handle_start_tag(tag),
            Event::End(tag) => self.handle_end_tag(tag),
            Event::Text(text) => match self.code.as_mut() {
                Some(code) => code.content.push_str(&text),
                None => self.push_inline(Token::text(text.to_string())),
            },
            Event::Code(code) | Event::InlineMath(code) | Event::DisplayMath(code) => {
                self.push_inline(Token::leaf("code_inline", code.to_string()).with_tag("code").with_markup("`"))
            }
            Event::Html(html) | Event::InlineHtml(html) => self.push_inline(Token::text(html.to_string())),
            Event::SoftBreak => self.push_inline(Token::leaf("softbreak", "").with_tag("br")),
            Event::HardBreak => self.push_inline(Token::leaf("hardbreak", "").with_tag("br")),
            Event::Rule => {
                self.flush_inline();
                self.tokens.push(Token::leaf("hr", "").with_tag("hr").with_markup("---").with_block(true));
            }
            Event::TaskListMarker(checked) => {
                self.push_inline(Token::text(if checked { "[x] " } else { "[ ] " }))
            }
            Event::FootnoteReference(label) => self.push_inline(Token::text(format!("[^{label}]"))),
        }
    }

    fn handle_start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.push_block(block_open("paragraph", "p")),
            Tag::Heading { level, .. } => {
                let n = heading_level(level);
                self.push_block(block_open("heading", &format!("h{n}")).with_markup("#".repeat(n)));
            }
            Tag::BlockQuote(_) => self.push_block(block_open("blockquote", "blockquote").with_markup(">")),
            Tag::CodeBlock(kind) => {
                self.flush_inline();
                self.code = Some(match kind {
                    CodeBlockKind::Fenced(info) => Token::leaf("fence", "")
                        .with_tag("code")
                        .with_info(info.to_string())
                        .with_markup("```")
                        .with_block(true),
                    CodeBlockKind::Indented => Token::leaf("code_block", "").with_tag("code").with_block(true),
                });
            }
            Tag::List(start) => {
                self.lists.push(start);
                let open = match start {
                    Some(n) => {
                        let open = block_open("ordered_list", "ol").with_markup(".");
                        if n == 1 { open } else { open.with_attr("start", n.to_string()) }
                    }
                    None => block_open("bullet_list", "ul").with_markup("-"),
                };
                self.push_block(open);
            }
            Tag::Item => {
                let item = match self.lists.last().copied().flatten() {
                    Some(_) => block_open("list_item", "li").with_markup("."),
                    None => block_open("list_item", "li").with_markup("-"),
                };
                self.push_block(item);
            }
            Tag::Table(_) => self.push_block(block_open("table", "table")),
            Tag::TableHead => {
                self.in_table_head = true;
                self.push_block(block_open("thead", "thead"));
                self.push_block(block_open("tr", "tr"));
            }
            Tag::TableRow => {
                if !self.in_table_body {
                    self.in_table_body = true;
                    self.push_block(block_open("tbody", "tbody"));
                }
                self.push_block(block_open("tr", "tr"));
            }
            Tag::TableCell => {
                let cell = if self.in_table_head { "th" } else { "td" };
                self.push_block(block_open(cell, cell));
            }
            Tag::Emphasis => self.push_inline(Token::open("em_open").with_tag("em").with_markup("*")),
            Tag::Strong => self.push_inline(Token::open("strong_open").with_tag("strong").with_markup("**")),
            Tag::Strikethrough => self.push_inline(Token::open("s_open").with_tag("s").with_markup("~~")),
            Tag::Superscript => self.push_inline(Token::open("sup_open").with_tag("sup").with_markup("^")),
            Tag::Subscript => self.push_inline(Token::open("sub_open").with_tag("sub").with_markup("~")),
            Tag::Link { dest_url, title, .. } => {
                let mut link = Token::open("link_open").with_tag("a").with_attr("href", dest_url.to_string());
                if !title.is_empty() {
                    link = link.with_attr("title", title.to_string());
                }
                self.push_inline(link);
            }
            Tag::Image { dest_url, title, .. } => {
                let mut token = Token::leaf("image", "")
                    .with_tag("img")
                    .with_attr("src", dest_url.to_string())
                    .with_attr("alt", "");
                if !title.is_empty() {
                    token = token.with_attr("title", title.to_string());
                }
                self.images.push(ImageFrame { token, alt: Vec::new() });
            }
            Tag::HtmlBlock => self.flush_inline(),
            _ => self.push_block(Token::open("unknown").with_block(true)),
        }
    }

    fn handle_end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.push_block(block_close("paragraph", "p")),
            TagEnd::Heading(level) => {
                let n = heading_level(level);
                self.push_block(block_close("heading", &format!("h{n}")));
            }
            TagEnd::BlockQuote(_) => self.push_block(block_close("blockquote", "blockquote")),
            TagEnd::CodeBlock => {
                if let Some(code) = self.code.take() {
                    self.tokens.push(code);
                }
            }
            TagEnd::List(ordered) => {
                self.lists.pop();
                if ordered {
                    self.push_block(block_close("ordered_list", "ol"));
                } else {
                    self.push_block(block_close("bullet_list", "ul"));
                }
            }
            TagEnd::Item => self.push_block(block_close("list_item", "li")),
            TagEnd::Table => {
                if self.in_table_body {
                    self.in_table_body = false;
                    self.push_block(block_close("tbody", "tbody"));
                }
                self.push_block(block_close("table", "table"));
            }
            TagEnd::TableHead => {
                self.in_table_head = false;
                self.push_block(block_close("tr", "tr"));
                self.push_block(block_close("thead", "thead"));
            }
            TagEnd::TableRow => self.push_block(block_close("tr", "tr")),
            TagEnd::TableCell => {
                let cell = if self.in_table_head { "th" } else { "td" };
                self.push_block(block_close(cell, cell));
            }
            TagEnd::Emphasis => self.push_inline(Token::close("em_close").with_tag("em").with_markup("*")),
            TagEnd::Strong => self.push_inline(Token::close("strong_close").with_tag("strong").with_markup("**")),
            TagEnd::Strikethrough => self.push_inline(Token::close("s_close").with_tag("s").with_markup("~~")),
            TagEnd::Superscript => self.push_inline(Token::close("sup_close").with_tag("sup").with_markup("^")),
            TagEnd::Subscript => self.push_inline(Token::close("sub_close").with_tag("sub").with_markup("~")),
            TagEnd::Link => self.push_inline(Token::close("link_close").with_tag("a")),
            TagEnd::Image => {
                if let Some(ImageFrame { mut token, alt }) = self.images.pop() {
                    token.content = render_inline_as_text(&alt);
                    self.push_inline(token.with_children(alt));
                }
            }
            TagEnd::HtmlBlock => self.flush_inline(),
            _ => self.push_block(Token::close("unknown").with_block(true)),
        }
    }

    fn push_inline(&mut self, token: Token) {
        let target = match self.images.last_mut() {
            Some(frame) => &mut frame.alt,
            None => self.inline.get_or_insert_with(Vec::new),
        };
        target.push(token);
    }

    fn push_block(&mut self, token: Token) {
        self.flush_inline();
        self.tokens.push(token);
    }

    fn flush_inline(&mut self) {
        // Images left open by a truncated stream still contribute their alt text.
        while let Some(ImageFrame { token, alt }) = self.images.pop() {
            self.push_inline(token.with_children(alt));
        }
        if let Some(children) = self.inline.take() {
            let content = render_inline_as_text(&children);
            self.tokens.push(
                Token::leaf("inline", content)
                    .with_block(true)
                    .with_children(children),
            );
        }
    }

    fn finish(mut self) -> Vec<Token> {
        self.flush_inline();
        if let Some(code) = self.code.take() {
            self.tokens.push(code);
        }
        self.tokens
    }
}
