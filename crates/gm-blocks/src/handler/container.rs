use super::MediaBlockHandler;
use crate::attributes::AttributeMap;
use crate::fragment::Fragment;
use crate::media::MediaReference;

/// Fallback for blocks without media of their own (`columns`, `group`, ...).
#[derive(Debug, Default)]
pub struct ContainerHandler;

impl MediaBlockHandler for ContainerHandler {
    fn apply_attributes(&mut self, _attrs: &mut AttributeMap, _media: &MediaReference) -> bool {
        false
    }

    fn apply_fragment(&mut self, _fragment: &mut Fragment, _media: &MediaReference) -> bool {
        false
    }

    fn supports_inner_blocks(&self) -> bool {
        true
    }
}
