//! Content model for the baladiya CMS.
//!
//! Everything in here is pure: no database, no file system, no HTTP. The
//! server crate feeds submissions through [`validate`] and [`map_embed`],
//! persists the resulting [`block::Block`]s and renders them back out with
//! [`media::MediaResolver`].

pub mod block;
pub mod gallery;
pub mod locale;
pub mod map_embed;
pub mod media;
pub mod validate;

pub use block::{Block, BlockContent, BlockFields, BlockKind, BlockRecord};
pub use gallery::{GalleryIndexError, LegacyExtra};
pub use locale::{Bilingual, Locale};
pub use map_embed::sanitize_map_url;
pub use media::MediaResolver;
pub use validate::{PageSubmission, ValidatedPage, ValidationErrors};
