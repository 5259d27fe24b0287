//! `cover` blocks: an image or video background behind nested blocks.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{MediaBlockHandler, rewrite_image, set_remote_id};
use crate::attributes::AttributeMap;
use crate::fragment::Fragment;
use crate::media::MediaReference;

/// `url(...)` inside a `background-image` declaration.
static BACKGROUND_IMAGE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(background-image:\s*url\()([^)]*)(\))").unwrap());

/// Handler for `<!-- wp:cover {"id":..} -->` blocks.
#[derive(Debug, Default)]
pub struct CoverHandler {
    video_background: bool,
}

impl MediaBlockHandler for CoverHandler {
    fn apply_attributes(&mut self, attrs: &mut AttributeMap, media: &MediaReference) -> bool {
        if !attrs.references("id", &media.local_id) {
            return false;
        }
        set_remote_id(attrs, "id", media);
        attrs.insert("url", media.remote_url.as_str());
        self.video_background = attrs.get_str("backgroundType") == Some("video");
        true
    }

    fn apply_fragment(&mut self, fragment: &mut Fragment, media: &MediaReference) -> bool {
        if self.video_background {
            return match fragment.find_tag_mut("video") {
                Some(video) => {
                    video.set_attr("src", &media.remote_url);
                    true
                }
                None => false,
            };
        }

        let mut rewritten = false;
        if let Some(img) =
            fragment.find_mut(|el| el.is("img") && el.has_class("wp-block-cover__image-background"))
        {
            rewrite_image(img, media);
            rewritten = true;
        }

        // Older covers carry the image as an inline background style
        fragment.for_each_element_mut(|el| {
            let Some(style) = el.attr("style") else {
                return;
            };
            if !BACKGROUND_IMAGE_URL.is_match(style) {
                return;
            }
            let style = BACKGROUND_IMAGE_URL
                .replacen(style, 1, |caps: &Captures| {
                    format!("{}{}{}", &caps[1], media.remote_url, &caps[3])
                })
                .into_owned();
            el.set_attr("style", &style);
            rewritten = true;
        });

        rewritten
    }

    fn supports_inner_blocks(&self) -> bool {
        true
    }
}
