use super::{MediaBlockHandler, set_remote_id};
use crate::attributes::AttributeMap;
use crate::fragment::Fragment;
use crate::media::MediaReference;

/// Handler for `<!-- wp:audio {"id":..} -->` blocks.
#[derive(Debug, Default)]
pub struct AudioHandler;

impl MediaBlockHandler for AudioHandler {
    fn apply_attributes(&mut self, attrs: &mut AttributeMap, media: &MediaReference) -> bool {
        if !attrs.references("id", &media.local_id) {
            return false;
        }
        set_remote_id(attrs, "id", media);
        attrs.replace_str("src", &media.remote_url);
        true
    }

    fn apply_fragment(&mut self, fragment: &mut Fragment, media: &MediaReference) -> bool {
        match fragment.find_tag_mut("audio") {
            Some(audio) => {
                audio.set_attr("src", &media.remote_url);
                true
            }
            None => false,
        }
    }
}
