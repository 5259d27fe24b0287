//! `video` and `videopress/video` blocks.

use super::{MediaBlockHandler, set_remote_id};
use crate::attributes::AttributeMap;
use crate::fragment::Fragment;
use crate::media::MediaReference;

/// Handler for core `<!-- wp:video {"id":..} -->` blocks.
#[derive(Debug, Default)]
pub struct VideoHandler;

impl MediaBlockHandler for VideoHandler {
    fn apply_attributes(&mut self, attrs: &mut AttributeMap, media: &MediaReference) -> bool {
        if !attrs.references("id", &media.local_id) {
            return false;
        }
        set_remote_id(attrs, "id", media);
        attrs.replace_str("src", &media.remote_url);
        if let Some(guid) = &media.remote_guid {
            attrs.insert("guid", guid.as_str());
        }
        true
    }

    fn apply_fragment(&mut self, fragment: &mut Fragment, media: &MediaReference) -> bool {
        let Some(video) = fragment.find_tag_mut("video") else {
            return false;
        };
        video.set_attr("src", &media.remote_url);
        true
    }
}

/// Handler for `<!-- wp:videopress/video {"id":..} -->` blocks.
///
/// The player markup is generated server-side from the GUID, so only the
/// header is rewritten.
#[derive(Debug, Default)]
pub struct VideoPressHandler;

impl MediaBlockHandler for VideoPressHandler {
    fn apply_attributes(&mut self, attrs: &mut AttributeMap, media: &MediaReference) -> bool {
        if !attrs.references("id", &media.local_id) {
            return false;
        }
        set_remote_id(attrs, "id", media);
        attrs.insert("src", media.remote_url.as_str());
        if let Some(guid) = &media.remote_guid {
            attrs.insert("guid", guid.as_str());
        }
        true
    }

    fn apply_fragment(&mut self, _fragment: &mut Fragment, _media: &MediaReference) -> bool {
        true
    }
}
