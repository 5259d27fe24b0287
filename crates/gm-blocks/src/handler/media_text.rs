//! `media-text` blocks: a media column next to nested text blocks.

use super::{MediaBlockHandler, rewrite_image, set_remote_id};
use crate::attributes::AttributeMap;
use crate::fragment::{Element, Fragment};
use crate::media::MediaReference;

/// Handler for `<!-- wp:media-text {"mediaId":..} -->` blocks.
#[derive(Debug, Default)]
pub struct MediaTextHandler;

impl MediaBlockHandler for MediaTextHandler {
    fn apply_attributes(&mut self, attrs: &mut AttributeMap, media: &MediaReference) -> bool {
        if !attrs.references("mediaId", &media.local_id) {
            return false;
        }
        set_remote_id(attrs, "mediaId", media);
        attrs.replace_str("mediaUrl", &media.remote_url);
        true
    }

    fn apply_fragment(&mut self, fragment: &mut Fragment, media: &MediaReference) -> bool {
        let media_column = |el: &Element| is_media_figure(el) && el.find(is_media).is_some();
        let target = if fragment.find(media_column).is_some() {
            fragment
                .find_mut(media_column)
                .and_then(|figure| figure.find_mut(is_media))
        } else {
            fragment.find_mut(is_media)
        };

        match target {
            Some(img) if img.is("img") => {
                rewrite_image(img, media);
                true
            }
            Some(video) => {
                video.set_attr("src", &media.remote_url);
                true
            }
            None => false,
        }
    }

    fn supports_inner_blocks(&self) -> bool {
        true
    }
}

fn is_media_figure(el: &Element) -> bool {
    el.is("figure") && el.has_class("wp-block-media-text__media")
}

fn is_media(el: &Element) -> bool {
    el.is("img") || el.is("video")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::test_media;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_attributes() {
        let mut attrs = AttributeMap::decode(
            r#"{"mediaId":12,"mediaLink":"file:///photo.jpg","mediaType":"image","mediaUrl":"file:///photo.jpg"}"#,
        )
        .unwrap();

        assert!(MediaTextHandler.apply_attributes(&mut attrs, &test_media()));
        assert_eq!(
            attrs.encode(),
            r#"{"mediaId":999,"mediaLink":"file:///photo.jpg","mediaType":"image","mediaUrl":"https://example.com/wp-content/uploads/photo.jpg"}"#
        );
    }

    #[test]
    fn test_attributes_ignore_plain_id() {
        let mut attrs = AttributeMap::decode(r#"{"id":12}"#).unwrap();
        assert!(!MediaTextHandler.apply_attributes(&mut attrs, &test_media()));
    }

    #[test]
    fn test_fragment_prefers_media_column() {
        let mut fragment = Fragment::parse(concat!(
            "<div class=\"wp-block-media-text\">",
            "<figure class=\"wp-block-media-text__media\"><img src=\"file:///photo.jpg\" class=\"wp-image-12 size-full\"/></figure>",
            "<div class=\"wp-block-media-text__content\"><img src=\"file:///other.jpg\"/></div>",
            "</div>"
        ))
        .unwrap();

        assert!(MediaTextHandler.apply_fragment(&mut fragment, &test_media()));
        assert_eq!(
            fragment.serialize(),
            concat!(
                "<div class=\"wp-block-media-text\">",
                "<figure class=\"wp-block-media-text__media\"><img src=\"https://example.com/wp-content/uploads/photo.jpg\" class=\"wp-image-999 size-full\"/></figure>",
                "<div class=\"wp-block-media-text__content\"><img src=\"file:///other.jpg\"/></div>",
                "</div>"
            )
        );
    }

    #[test]
    fn test_fragment_video_media() {
        let mut fragment = Fragment::parse(concat!(
            "<div class=\"wp-block-media-text\">",
            "<figure class=\"wp-block-media-text__media\"><video controls src=\"file:///clip.mp4\"></video></figure>",
            "</div>"
        ))
        .unwrap();

        assert!(MediaTextHandler.apply_fragment(&mut fragment, &test_media()));
        assert!(fragment.serialize().contains(
            "<video controls src=\"https://example.com/wp-content/uploads/photo.jpg\"></video>"
        ));
    }

    #[test]
    fn test_fragment_falls_back_to_first_media() {
        let mut fragment =
            Fragment::parse("<div><p>text</p><img src=\"file:///photo.jpg\"/></div>").unwrap();

        assert!(MediaTextHandler.apply_fragment(&mut fragment, &test_media()));
        assert_eq!(
            fragment.serialize(),
            "<div><p>text</p><img src=\"https://example.com/wp-content/uploads/photo.jpg\" class=\"wp-image-999\"/></div>"
        );
    }

    #[test]
    fn test_fragment_without_media() {
        let mut fragment = Fragment::parse("<div class=\"wp-block-media-text\"></div>").unwrap();
        assert!(!MediaTextHandler.apply_fragment(&mut fragment, &test_media()));
    }
}
