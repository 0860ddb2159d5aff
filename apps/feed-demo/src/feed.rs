use std::any::Any;
use std::sync::Arc;

use renderers_foundation::{ItemCallback, Payload, Renderer, RendererBuilder};

use crate::console::Screen;

#[derive(Clone, Debug, PartialEq)]
pub enum FeedItem {
    Section(&'static str),
    Article {
        id: u32,
        title: &'static str,
        likes: u32,
    },
    Sponsored {
        id: u32,
        brand: &'static str,
    },
}

/// Payload sent when only an article's like count changed.
#[derive(Debug)]
pub struct LikesChanged;

pub struct FeedDiff;

impl ItemCallback<FeedItem> for FeedDiff {
    fn are_items_the_same(&self, old: &FeedItem, new: &FeedItem) -> bool {
        match (old, new) {
            (FeedItem::Section(a), FeedItem::Section(b)) => a == b,
            (FeedItem::Article { id: a, .. }, FeedItem::Article { id: b, .. })
            | (FeedItem::Sponsored { id: a, .. }, FeedItem::Sponsored { id: b, .. }) => a == b,
            _ => false,
        }
    }

    fn are_contents_the_same(&self, old: &FeedItem, new: &FeedItem) -> bool {
        old == new
    }

    fn change_payload(&self, old: &FeedItem, new: &FeedItem) -> Option<Payload> {
        match (old, new) {
            (
                FeedItem::Article {
                    title: a, likes: x, ..
                },
                FeedItem::Article {
                    title: b, likes: y, ..
                },
            ) if a == b && x != y => Some(Arc::new(LikesChanged)),
            _ => None,
        }
    }
}

/// Shared state of the three feed renderers.
struct Row {
    content: Option<FeedItem>,
    position: usize,
    screen: Screen,
}

impl Row {
    fn new(screen: Screen) -> Self {
        Self {
            content: None,
            position: 0,
            screen,
        }
    }

    fn paint(&self, line: String) {
        self.screen.borrow_mut().insert(self.position, line);
    }
}

macro_rules! row_renderer {
    ($name:ident) => {
        impl Renderer<FeedItem> for $name {
            fn set_content(&mut self, content: FeedItem) {
                self.row.content = Some(content);
            }

            fn content(&self) -> Option<&FeedItem> {
                self.row.content.as_ref()
            }

            fn clear_content(&mut self) {
                self.row.content = None;
            }

            fn set_position(&mut self, position: usize) {
                self.row.position = position;
            }

            fn position(&self) -> usize {
                self.row.position
            }

            fn render(&mut self, payloads: &[Payload]) {
                self.paint(payloads);
            }

            fn on_recycled(&mut self) {
                log::debug!("{} recycled", stringify!($name));
            }

            fn as_any_mut(&mut self) -> &mut dyn Any {
                self
            }
        }
    };
}

pub struct SectionRenderer {
    row: Row,
}

impl SectionRenderer {
    fn paint(&mut self, _payloads: &[Payload]) {
        if let Some(FeedItem::Section(title)) = &self.row.content {
            self.row.paint(format!("== {} ==", title.to_uppercase()));
        }
    }
}

pub struct ArticleRenderer {
    row: Row,
    /// Set by the extra-values hook for popular articles.
    pub trending: bool,
}

impl ArticleRenderer {
    fn paint(&mut self, payloads: &[Payload]) {
        let Some(FeedItem::Article { title, likes, .. }) = &self.row.content else {
            return;
        };
        let likes_only = !payloads.is_empty() && payloads.iter().all(|p| p.is::<LikesChanged>());
        let marker = if self.trending { "*" } else { " " };
        self.row.paint(format!(
            "{marker} {title:<32} {likes:>4} likes{}",
            if likes_only { "  (likes updated)" } else { "" }
        ));
    }
}

pub struct SponsoredRenderer {
    row: Row,
}

impl SponsoredRenderer {
    fn paint(&mut self, _payloads: &[Payload]) {
        if let Some(FeedItem::Sponsored { brand, .. }) = &self.row.content {
            self.row.paint(format!("  [ad] brought to you by {brand}"));
        }
    }
}

row_renderer!(SectionRenderer);
row_renderer!(ArticleRenderer);
row_renderer!(SponsoredRenderer);

pub fn renderers(screen: &Screen) -> RendererBuilder<FeedItem> {
    let sections = screen.clone();
    let articles = screen.clone();
    let sponsored = screen.clone();
    RendererBuilder::new()
        .bind(
            |item: &FeedItem| matches!(item, FeedItem::Section(_)),
            move |_| SectionRenderer {
                row: Row::new(sections.clone()),
            },
        )
        .bind(
            |item: &FeedItem| matches!(item, FeedItem::Article { .. }),
            move |_| ArticleRenderer {
                row: Row::new(articles.clone()),
                trending: false,
            },
        )
        .bind(
            |item: &FeedItem| matches!(item, FeedItem::Sponsored { .. }),
            move |_| SponsoredRenderer {
                row: Row::new(sponsored.clone()),
            },
        )
}

/// Marks articles with more than 100 likes as trending.
pub fn mark_trending(item: &FeedItem, renderer: &mut dyn Renderer<FeedItem>, _position: usize) {
    if let (FeedItem::Article { likes, .. }, Some(article)) = (
        item,
        renderer.as_any_mut().downcast_mut::<ArticleRenderer>(),
    ) {
        article.trending = *likes > 100;
    }
}

fn article(id: u32, title: &'static str, likes: u32) -> FeedItem {
    FeedItem::Article { id, title, likes }
}

/// Successive versions of the feed.
pub fn timeline() -> Vec<Vec<FeedItem>> {
    vec![
        vec![
            FeedItem::Section("Top stories"),
            article(1, "Rust 2024 edition lands", 240),
            article(2, "Diffing lists in linear space", 35),
            FeedItem::Sponsored {
                id: 9,
                brand: "Ferris Coffee",
            },
            article(3, "Recycling views, revisited", 12),
        ],
        vec![
            FeedItem::Section("Top stories"),
            article(2, "Diffing lists in linear space", 130),
            article(1, "Rust 2024 edition lands", 241),
            FeedItem::Sponsored {
                id: 9,
                brand: "Ferris Coffee",
            },
            article(3, "Recycling views, revisited", 12),
            article(4, "Async adapters without threads in the UI", 4),
        ],
        vec![
            FeedItem::Section("Top stories"),
            article(2, "Diffing lists in linear space", 131),
            article(4, "Async adapters without threads in the UI", 58),
            FeedItem::Section("Older"),
            article(1, "Rust 2024 edition lands", 241),
        ],
        Vec::new(),
        vec![article(5, "Fresh start", 1)],
    ]
}
