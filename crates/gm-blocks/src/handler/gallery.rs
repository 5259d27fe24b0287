//! `gallery` blocks.
//!
//! Older galleries list their images in an `ids` attribute and render plain
//! `<img data-id>` elements. Newer galleries have no `ids` and nest one
//! `image` block per picture; those are left to inner-block processing.

use serde_json::Value;

use super::{MediaBlockHandler, rewrite_image};
use crate::attributes::{AttributeMap, parse_integer, value_matches_id};
use crate::fragment::{Element, Fragment};
use crate::media::MediaReference;

/// Handler for `<!-- wp:gallery {"ids":[..]} -->` blocks.
#[derive(Debug, Default)]
pub struct GalleryHandler {
    link_to: Option<String>,
}

impl GalleryHandler {
    /// Anchor target for the gallery's `linkTo` setting, if it names one.
    fn link_href<'m>(&self, media: &'m MediaReference) -> Option<&'m str> {
        match self.link_to.as_deref() {
            Some("file" | "media") => Some(&media.remote_url),
            Some("post" | "attachment") => media.attachment_page_url.as_deref(),
            _ => None,
        }
    }
}

impl MediaBlockHandler for GalleryHandler {
    fn apply_attributes(&mut self, attrs: &mut AttributeMap, media: &MediaReference) -> bool {
        let link_to = attrs.get_str("linkTo").map(str::to_owned);
        let Some(Value::Array(ids)) = attrs.get_mut("ids") else {
            return false;
        };
        let Some(entry) = ids
            .iter_mut()
            .find(|id| value_matches_id(id, &media.local_id))
        else {
            return false;
        };

        match parse_integer(&media.remote_id) {
            Ok(remote_id) => *entry = Value::from(remote_id),
            Err(e) => tracing::warn!(
                error = %e,
                remote_id = %media.remote_id,
                "Keeping local id in gallery ids"
            ),
        }
        self.link_to = link_to;
        true
    }

    fn apply_fragment(&mut self, fragment: &mut Fragment, media: &MediaReference) -> bool {
        let local_class = format!("wp-image-{}", media.local_id);
        let is_target = |el: &Element| {
            el.is("img")
                && (el.attr("data-id") == Some(media.local_id.as_str()) || el.has_class(&local_class))
        };

        if let Some(anchor) = fragment.find_mut(|el| el.is("a") && el.child_elements().any(is_target)) {
            if let Some(href) = self.link_href(media) {
                anchor.set_attr("href", href);
            }
            if let Some(img) = anchor.find_mut(is_target) {
                rewrite_gallery_image(img, media);
            }
            return true;
        }

        match fragment.find_mut(is_target) {
            Some(img) => {
                rewrite_gallery_image(img, media);
                true
            }
            None => false,
        }
    }

    fn supports_inner_blocks(&self) -> bool {
        true
    }
}

fn rewrite_gallery_image(img: &mut Element, media: &MediaReference) {
    rewrite_image(img, media);
    img.set_attr("data-id", &media.remote_id);
    img.set_attr("data-full-url", &media.remote_url);
    if let Some(page) = &media.attachment_page_url {
        img.set_attr("data-link", page);
    }
}
