use crate::locale::{Bilingual, Locale};
use crate::map_embed::sanitize_map_url;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const BLOCK_KINDS: &[&str] = &["heading", "text", "image", "gallery", "map"];

#[derive(Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Heading,
    Text,
    Image,
    Gallery,
    Map,
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Heading => "heading",
            BlockKind::Text => "text",
            BlockKind::Image => "image",
            BlockKind::Gallery => "gallery",
            BlockKind::Map => "map",
        }
    }
}

impl Display for BlockKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "heading" => Ok(BlockKind::Heading),
            "text" => Ok(BlockKind::Text),
            "image" => Ok(BlockKind::Image),
            "gallery" => Ok(BlockKind::Gallery),
            "map" => Ok(BlockKind::Map),
            other => Err(format!("unknown block type `{other}`")),
        }
    }
}

/// Flat, loosely typed block shape. This is what editors submit and what the
/// `page_blocks` table stores, one nullable column per field.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockFields {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub text_fr: Option<String>,
    pub text_ar: Option<String>,
    pub image_path: Option<String>,
    pub alt_fr: Option<String>,
    pub alt_ar: Option<String>,
    pub gallery: Option<Vec<String>>,
    pub map_url: Option<String>,
    pub meta: Option<Map<String, Value>>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum BlockContent {
    Heading { text: Bilingual },
    Text { text: Bilingual },
    Image { path: Option<String>, alt: Bilingual },
    Gallery { paths: Vec<String> },
    Map { url: Option<String> },
}

impl BlockContent {
    pub fn kind(&self) -> BlockKind {
        match self {
            BlockContent::Heading { .. } => BlockKind::Heading,
            BlockContent::Text { .. } => BlockKind::Text,
            BlockContent::Image { .. } => BlockKind::Image,
            BlockContent::Gallery { .. } => BlockKind::Gallery,
            BlockContent::Map { .. } => BlockKind::Map,
        }
    }
}

/// One typed unit of page content. Position is not part of the block, it is
/// assigned from the order of the list the block is saved in.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub content: BlockContent,
    pub meta: Option<Map<String, Value>>,
}

impl Block {
    pub fn new(content: BlockContent) -> Self {
        Block {
            content,
            meta: None,
        }
    }

    pub fn kind(&self) -> BlockKind {
        self.content.kind()
    }

    /// Alt text of an image block in `locale`, or the other locale when that
    /// one is empty.
    pub fn alt(&self, locale: Locale) -> Option<&str> {
        match &self.content {
            BlockContent::Image { alt, .. } => alt.get(locale),
            _ => None,
        }
    }

    /// Keeps only the fields that matter for `kind`.
    pub fn from_fields(kind: BlockKind, fields: BlockFields) -> Self {
        let content = match kind {
            BlockKind::Heading => BlockContent::Heading {
                text: Bilingual::new(fields.text_fr, fields.text_ar),
            },
            BlockKind::Text => BlockContent::Text {
                text: Bilingual::new(fields.text_fr, fields.text_ar),
            },
            BlockKind::Image => BlockContent::Image {
                path: fields.image_path,
                alt: Bilingual::new(fields.alt_fr, fields.alt_ar),
            },
            BlockKind::Gallery => BlockContent::Gallery {
                paths: fields.gallery.unwrap_or_default(),
            },
            BlockKind::Map => BlockContent::Map {
                url: fields.map_url,
            },
        };

        Block {
            content,
            meta: fields.meta,
        }
    }
}

/// A validated block as it is stored: its kind plus every submitted field,
/// whether or not the kind uses it. Rendering goes through [`Block`].
#[derive(Clone, Debug, PartialEq)]
pub struct BlockRecord {
    pub kind: BlockKind,
    pub fields: BlockFields,
}

impl BlockRecord {
    pub fn new(kind: BlockKind, mut fields: BlockFields) -> Self {
        fields.kind = Some(kind.as_str().to_string());
        BlockRecord { kind, fields }
    }

    /// Runs a non-empty map URL of a map block through [`sanitize_map_url`].
    /// Nothing else is touched.
    pub fn sanitize(mut self) -> Self {
        if self.kind == BlockKind::Map {
            if let Some(raw) = self.fields.map_url.take() {
                self.fields.map_url = if raw.trim().is_empty() {
                    Some(raw)
                } else {
                    Some(sanitize_map_url(&raw)).filter(|clean| !clean.is_empty())
                };
            }
        }
        self
    }

    pub fn to_block(&self) -> Block {
        Block::from_fields(self.kind, self.fields.clone())
    }
}
