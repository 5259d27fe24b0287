//! `image` blocks.

use super::{MediaBlockHandler, rewrite_image, set_remote_id};
use crate::attributes::AttributeMap;
use crate::fragment::Fragment;
use crate::media::MediaReference;

/// Handler for `<!-- wp:image {"id":..} -->`.
///
/// Besides the image itself, links to the local file (the "link to media
/// file" setting) are repointed at the upload.
#[derive(Debug, Default)]
pub struct ImageHandler {
    old_url: Option<String>,
}

impl MediaBlockHandler for ImageHandler {
    fn apply_attributes(&mut self, attrs: &mut AttributeMap, media: &MediaReference) -> bool {
        if !attrs.references("id", &media.local_id) {
            return false;
        }
        set_remote_id(attrs, "id", media);
        self.old_url = attrs.get_str("url").map(str::to_owned);
        attrs.replace_str("url", &media.remote_url);
        true
    }

    fn apply_fragment(&mut self, fragment: &mut Fragment, media: &MediaReference) -> bool {
        let Some(img) = fragment.find_tag_mut("img") else {
            return false;
        };
        let old_src = img.attr("src").map(str::to_owned);
        rewrite_image(img, media);

        let old_targets: Vec<String> = old_src
            .into_iter()
            .chain(self.old_url.take())
            .filter(|url| !url.is_empty())
            .collect();
        fragment.for_each_element_mut(|el| {
            let links_to_old = el
                .attr("href")
                .is_some_and(|href| old_targets.iter().any(|old| old == href));
            if el.is("a") && links_to_old {
                el.set_attr("href", &media.remote_url);
            }
        });
        true
    }
}
