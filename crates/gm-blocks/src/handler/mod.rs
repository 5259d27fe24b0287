//! Per-kind media block handlers.
//!
//! Each supported block kind knows which attribute carries its media id and
//! where its markup references the file. A handler instance lives for one
//! block span: [`apply_attributes`](MediaBlockHandler::apply_attributes) runs
//! first and may record state (an old URL, a link mode) that
//! [`apply_fragment`](MediaBlockHandler::apply_fragment) then uses.
//!
//! Kinds are selected by block name with [`BlockKind::from_name`]. Names
//! without a dedicated handler map to [`BlockKind::Container`], which never
//! matches but lets the processor look for media blocks nested inside.

mod audio;
mod container;
mod cover;
mod file;
mod gallery;
mod image;
mod media_text;
mod video;

use crate::attributes::AttributeMap;
use crate::fragment::{Element, Fragment};
use crate::media::MediaReference;

pub use audio::AudioHandler;
pub use container::ContainerHandler;
pub use cover::CoverHandler;
pub use file::FileHandler;
pub use gallery::GalleryHandler;
pub use image::ImageHandler;
pub use media_text::MediaTextHandler;
pub use video::{VideoHandler, VideoPressHandler};

/// Rewrites one kind of media block.
///
/// Handlers are created per span and may keep state between the attribute
/// and markup phases.
pub trait MediaBlockHandler: Send {
    /// Match the block's header against the local id and rewrite it.
    ///
    /// Returns `false` when the block does not reference the local media;
    /// the attributes must then be left untouched.
    fn apply_attributes(&mut self, attrs: &mut AttributeMap, media: &MediaReference) -> bool;

    /// Rewrite the block's inner markup.
    ///
    /// Only called for paired blocks whose attributes matched. Returning
    /// `false` leaves the whole block unchanged.
    fn apply_fragment(&mut self, fragment: &mut Fragment, media: &MediaReference) -> bool;

    /// Whether a non-matching block should be searched for nested blocks.
    fn supports_inner_blocks(&self) -> bool {
        false
    }
}

/// Block kinds with media handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// `image`
    Image,
    /// `video`
    Video,
    /// `videopress/video`
    VideoPress,
    /// `audio`
    Audio,
    /// `media-text`
    MediaText,
    /// `gallery`
    Gallery,
    /// `cover`
    Cover,
    /// `file`
    File,
    /// Any other block; only its inner blocks are inspected.
    Container,
}

impl BlockKind {
    /// Select the kind for a block name as written after the namespace.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "image" => Self::Image,
            "video" => Self::Video,
            "videopress/video" => Self::VideoPress,
            "audio" => Self::Audio,
            "media-text" => Self::MediaText,
            "gallery" => Self::Gallery,
            "cover" => Self::Cover,
            "file" => Self::File,
            _ => Self::Container,
        }
    }

    /// Create a fresh handler for one span of this kind.
    #[must_use]
    pub fn handler(self) -> Box<dyn MediaBlockHandler> {
        match self {
            Self::Image => Box::new(ImageHandler::default()),
            Self::Video => Box::new(VideoHandler),
            Self::VideoPress => Box::new(VideoPressHandler),
            Self::Audio => Box::new(AudioHandler),
            Self::MediaText => Box::new(MediaTextHandler),
            Self::Gallery => Box::new(GalleryHandler::default()),
            Self::Cover => Box::new(CoverHandler::default()),
            Self::File => Box::new(FileHandler::default()),
            Self::Container => Box::new(ContainerHandler),
        }
    }
}

/// Store the remote id under `key` as an integer.
///
/// A remote id that is not an integer leaves the key as it was; the rest of
/// the rewrite still goes ahead.
fn set_remote_id(attrs: &mut AttributeMap, key: &str, media: &MediaReference) {
    if let Err(e) = attrs.set_integer_safely(key, &media.remote_id) {
        tracing::warn!(error = %e, local_id = %media.local_id, "Keeping local media id");
    }
}

/// Point an `img` at the uploaded file and swap its `wp-image-{id}` class.
fn rewrite_image(img: &mut Element, media: &MediaReference) {
    img.set_attr("src", &media.remote_url);
    let remote_class = image_class(&media.remote_id);
    if !img.replace_class(&image_class(&media.local_id), &remote_class) {
        img.add_class(&remote_class);
    }
}

fn image_class(id: &str) -> String {
    format!("wp-image-{id}")
}

#[cfg(test)]
pub(crate) fn test_media() -> MediaReference {
    MediaReference::new("12", "999", "https://example.com/wp-content/uploads/photo.jpg")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_name() {
        assert_eq!(BlockKind::from_name("image"), BlockKind::Image);
        assert_eq!(BlockKind::from_name("videopress/video"), BlockKind::VideoPress);
        assert_eq!(BlockKind::from_name("media-text"), BlockKind::MediaText);
        assert_eq!(BlockKind::from_name("columns"), BlockKind::Container);
        assert_eq!(BlockKind::from_name("Image"), BlockKind::Container);
    }

    #[test]
    fn test_nesting_kinds() {
        let nesting: Vec<_> = [
            BlockKind::Image,
            BlockKind::Video,
            BlockKind::VideoPress,
            BlockKind::Audio,
            BlockKind::MediaText,
            BlockKind::Gallery,
            BlockKind::Cover,
            BlockKind::File,
            BlockKind::Container,
        ]
        .into_iter()
        .filter(|kind| kind.handler().supports_inner_blocks())
        .collect();

        assert_eq!(
            nesting,
            vec![
                BlockKind::MediaText,
                BlockKind::Gallery,
                BlockKind::Cover,
                BlockKind::Container
            ]
        );
    }

    #[test]
    fn test_set_remote_id_keeps_key_on_non_integer() {
        let mut attrs = AttributeMap::decode(r#"{"id":12}"#).unwrap();
        let media = MediaReference::new("12", "abc", "https://example.com/a.jpg");
        set_remote_id(&mut attrs, "id", &media);
        assert_eq!(attrs.encode(), r#"{"id":12}"#);
    }

    #[test]
    fn test_rewrite_image_swaps_or_adds_class() {
        let media = test_media();

        let mut img = Element::new("img").with_attr("class", "size-large wp-image-12");
        rewrite_image(&mut img, &media);
        assert_eq!(img.attr("class"), Some("size-large wp-image-999"));
        assert_eq!(img.attr("src"), Some(media.remote_url.as_str()));

        let mut bare = Element::new("img");
        rewrite_image(&mut bare, &media);
        assert_eq!(bare.attr("class"), Some("wp-image-999"));
    }
}
