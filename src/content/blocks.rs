//! Block model - the typed form of a post body
//!
//! A post body is a tree of blocks. Each block carries a kind with its
//! kind-specific payload and, once hydrated, its ordered children.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cms::{FileRef, RawBlock};

/// Independent style flags on a span of text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
}

/// A run of text with annotations and an optional link
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: String,
    #[serde(default)]
    pub annotations: Annotations,
    #[serde(default)]
    pub href: Option<String>,
}

impl RichText {
    pub fn plain(text: &str) -> Self {
        Self {
            plain_text: text.to_string(),
            ..Self::default()
        }
    }
}

/// Concatenated text of a list of spans
pub fn plain_text(spans: &[RichText]) -> String {
    spans.iter().map(|s| s.plain_text.as_str()).collect()
}

/// An image, video, or file attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    pub url: Option<String>,
    pub caption: Vec<RichText>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph { text: Vec<RichText> },
    Heading { level: u8, text: Vec<RichText> },
    BulletedListItem { text: Vec<RichText> },
    NumberedListItem { text: Vec<RichText> },
    Quote { text: Vec<RichText> },
    Callout { text: Vec<RichText>, icon: Option<String> },
    Code { text: Vec<RichText>, language: Option<String>, caption: Vec<RichText> },
    Image(Media),
    Video(Media),
    File(Media),
    Embed { url: String, caption: Vec<RichText> },
    Bookmark { url: String, caption: Vec<RichText> },
    Table { width: usize, column_header: bool, row_header: bool },
    TableRow { cells: Vec<Vec<RichText>> },
    Divider,
    Equation { expression: String },
    ToDo { text: Vec<RichText>, checked: bool },
    Toggle { text: Vec<RichText> },
    /// An alias for the children of `synced_from`; `None` marks the original
    SyncedBlock { synced_from: Option<String> },
    /// A kind this site does not render
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: String,
    pub has_children: bool,
    pub kind: BlockKind,
    /// `None` until hydrated; only ever set on blocks with `has_children`
    pub children: Option<Vec<Block>>,
}

/// Which list container a list item belongs in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Bulleted,
    Numbered,
}

// Payload shapes, keyed by block type on the wire

#[derive(Deserialize)]
struct TextPayload {
    #[serde(default)]
    rich_text: Vec<RichText>,
}

#[derive(Deserialize)]
struct CalloutPayload {
    #[serde(default)]
    rich_text: Vec<RichText>,
    #[serde(default)]
    icon: Option<Value>,
}

#[derive(Deserialize)]
struct CodePayload {
    #[serde(default)]
    rich_text: Vec<RichText>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    caption: Vec<RichText>,
}

#[derive(Deserialize)]
struct MediaPayload {
    #[serde(flatten)]
    file: FileRef,
    #[serde(default)]
    caption: Vec<RichText>,
}

#[derive(Deserialize)]
struct LinkPayload {
    #[serde(default)]
    url: String,
    #[serde(default)]
    caption: Vec<RichText>,
}

#[derive(Deserialize)]
struct TablePayload {
    #[serde(default)]
    table_width: usize,
    #[serde(default)]
    has_column_header: bool,
    #[serde(default)]
    has_row_header: bool,
}

#[derive(Deserialize)]
struct TableRowPayload {
    #[serde(default)]
    cells: Vec<Vec<RichText>>,
}

#[derive(Deserialize)]
struct EquationPayload {
    #[serde(default)]
    expression: String,
}

#[derive(Deserialize)]
struct ToDoPayload {
    #[serde(default)]
    rich_text: Vec<RichText>,
    #[serde(default)]
    checked: bool,
}

#[derive(Deserialize)]
struct SyncedPayload {
    #[serde(default)]
    synced_from: Option<SyncedFrom>,
}

#[derive(Deserialize)]
struct SyncedFrom {
    block_id: String,
}

fn text_of(payload: Value) -> serde_json::Result<Vec<RichText>> {
    Ok(serde_json::from_value::<TextPayload>(payload)?.rich_text)
}

fn media_of(payload: Value) -> serde_json::Result<Media> {
    let media: MediaPayload = serde_json::from_value(payload)?;
    Ok(Media {
        url: media.file.url().map(str::to_string),
        caption: media.caption,
        name: media.file.name.clone(),
    })
}

fn decode(kind: &str, payload: Value) -> serde_json::Result<BlockKind> {
    let kind = match kind {
        "paragraph" => BlockKind::Paragraph {
            text: text_of(payload)?,
        },
        "heading_1" | "heading_2" | "heading_3" => BlockKind::Heading {
            level: kind.as_bytes()[8] - b'0',
            text: text_of(payload)?,
        },
        "bulleted_list_item" => BlockKind::BulletedListItem {
            text: text_of(payload)?,
        },
        "numbered_list_item" => BlockKind::NumberedListItem {
            text: text_of(payload)?,
        },
        "quote" => BlockKind::Quote {
            text: text_of(payload)?,
        },
        "toggle" => BlockKind::Toggle {
            text: text_of(payload)?,
        },
        "callout" => {
            let callout: CalloutPayload = serde_json::from_value(payload)?;
            let icon = callout
                .icon
                .as_ref()
                .and_then(|i| i.get("emoji"))
                .and_then(Value::as_str)
                .map(str::to_string);
            BlockKind::Callout {
                text: callout.rich_text,
                icon,
            }
        }
        "code" => {
            let code: CodePayload = serde_json::from_value(payload)?;
            BlockKind::Code {
                text: code.rich_text,
                language: code.language,
                caption: code.caption,
            }
        }
        "image" => BlockKind::Image(media_of(payload)?),
        "video" => BlockKind::Video(media_of(payload)?),
        "file" | "pdf" => BlockKind::File(media_of(payload)?),
        "embed" => {
            let link: LinkPayload = serde_json::from_value(payload)?;
            BlockKind::Embed {
                url: link.url,
                caption: link.caption,
            }
        }
        "bookmark" | "link_preview" => {
            let link: LinkPayload = serde_json::from_value(payload)?;
            BlockKind::Bookmark {
                url: link.url,
                caption: link.caption,
            }
        }
        "table" => {
            let table: TablePayload = serde_json::from_value(payload)?;
            BlockKind::Table {
                width: table.table_width,
                column_header: table.has_column_header,
                row_header: table.has_row_header,
            }
        }
        "table_row" => BlockKind::TableRow {
            cells: serde_json::from_value::<TableRowPayload>(payload)?.cells,
        },
        "divider" => BlockKind::Divider,
        "equation" => BlockKind::Equation {
            expression: serde_json::from_value::<EquationPayload>(payload)?.expression,
        },
        "to_do" => {
            let todo: ToDoPayload = serde_json::from_value(payload)?;
            BlockKind::ToDo {
                text: todo.rich_text,
                checked: todo.checked,
            }
        }
        "synced_block" => BlockKind::SyncedBlock {
            synced_from: serde_json::from_value::<SyncedPayload>(payload)?
                .synced_from
                .map(|s| s.block_id),
        },
        other => BlockKind::Unsupported(other.to_string()),
    };
    Ok(kind)
}

impl Block {
    /// Decode a listed block. A payload that does not match its declared
    /// kind degrades to [`BlockKind::Unsupported`].
    pub fn from_raw(mut raw: RawBlock) -> Self {
        let payload = raw.take_payload();
        let kind = match decode(&raw.kind, payload) {
            Ok(kind) => kind,
            Err(e) => {
                tracing::warn!("Malformed {} block {}: {}", raw.kind, raw.id, e);
                BlockKind::Unsupported(raw.kind.clone())
            }
        };

        Self {
            id: raw.id,
            has_children: raw.has_children,
            kind,
            children: None,
        }
    }

    /// Block whose children this block displays: the source of a synced
    /// block reference, otherwise the block itself
    pub fn children_source(&self) -> &str {
        match &self.kind {
            BlockKind::SyncedBlock {
                synced_from: Some(id),
            } => id,
            _ => &self.id,
        }
    }

    /// Whether the block still needs its children fetched
    pub fn needs_hydration(&self) -> bool {
        self.has_children && self.children.is_none()
    }

    pub fn children(&self) -> &[Block] {
        self.children.as_deref().unwrap_or_default()
    }

    pub fn list_kind(&self) -> Option<ListKind> {
        match self.kind {
            BlockKind::BulletedListItem { .. } => Some(ListKind::Bulleted),
            BlockKind::NumberedListItem { .. } => Some(ListKind::Numbered),
            _ => None,
        }
    }

    /// The block's own text, for kinds that have one
    pub fn text(&self) -> &[RichText] {
        match &self.kind {
            BlockKind::Paragraph { text }
            | BlockKind::Heading { text, .. }
            | BlockKind::BulletedListItem { text }
            | BlockKind::NumberedListItem { text }
            | BlockKind::Quote { text }
            | BlockKind::Callout { text, .. }
            | BlockKind::Code { text, .. }
            | BlockKind::ToDo { text, .. }
            | BlockKind::Toggle { text } => text,
            _ => &[],
        }
    }

    /// Whether every block that reports children has them, recursively,
    /// and no leaf carries children
    pub fn is_hydrated(blocks: &[Block]) -> bool {
        blocks.iter().all(|b| match &b.children {
            Some(children) => b.has_children && Block::is_hydrated(children),
            None => !b.has_children,
        })
    }
}
