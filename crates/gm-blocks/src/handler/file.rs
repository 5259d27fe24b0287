//! `file` blocks: a download link with an optional inline PDF embed.

use super::{MediaBlockHandler, set_remote_id};
use crate::attributes::AttributeMap;
use crate::fragment::Fragment;
use crate::media::MediaReference;

/// Handler for `<!-- wp:file {"id":..} -->` blocks.
#[derive(Debug, Default)]
pub struct FileHandler {
    old_href: Option<String>,
}

impl MediaBlockHandler for FileHandler {
    fn apply_attributes(&mut self, attrs: &mut AttributeMap, media: &MediaReference) -> bool {
        if !attrs.references("id", &media.local_id) {
            return false;
        }
        set_remote_id(attrs, "id", media);
        self.old_href = attrs
            .get_str("href")
            .filter(|href| !href.is_empty())
            .map(str::to_owned);
        attrs.insert("href", media.remote_url.as_str());
        true
    }

    fn apply_fragment(&mut self, fragment: &mut Fragment, media: &MediaReference) -> bool {
        let old_href = self.old_href.as_deref();
        let mut found = false;

        fragment.for_each_element_mut(|el| {
            if el.is("a") {
                // Without a known href every link in the block is the file link
                let points_at_file = match old_href {
                    Some(old) => el.attr("href") == Some(old),
                    None => el.attr("href").is_some(),
                };
                if points_at_file {
                    el.set_attr("href", &media.remote_url);
                    found = true;
                }
            } else if el.is("object") && el.has_class("wp-block-file__embed") {
                el.set_attr("data", &media.remote_url);
            }
        });

        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::test_media;
    use pretty_assertions::assert_eq;

    fn file_markup(href: &str) -> Fragment {
        Fragment::parse(&format!(
            concat!(
                "<div class=\"wp-block-file\">",
                "<object class=\"wp-block-file__embed\" data=\"{href}\" type=\"application/pdf\"></object>",
                "<a id=\"wp-block-file--media-1\" href=\"{href}\">report.pdf</a>",
                "<a href=\"{href}\" class=\"wp-block-file__button\" download aria-describedby=\"wp-block-file--media-1\">Download</a>",
                "<a href=\"https://example.org/terms\">terms</a>",
                "</div>"
            ),
            href = href
        ))
        .unwrap()
    }

    #[test]
    fn test_attributes() {
        let mut attrs =
            AttributeMap::decode(r#"{"id":12,"href":"file:///report.pdf","displayPreview":true}"#).unwrap();
        let mut handler = FileHandler::default();

        assert!(handler.apply_attributes(&mut attrs, &test_media()));
        assert_eq!(
            attrs.encode(),
            r#"{"id":999,"href":"https://example.com/wp-content/uploads/photo.jpg","displayPreview":true}"#
        );
        assert_eq!(handler.old_href.as_deref(), Some("file:///report.pdf"));
    }

    #[test]
    fn test_fragment_rewrites_links_to_old_href() {
        let mut handler = FileHandler {
            old_href: Some("file:///report.pdf".to_owned()),
        };
        let mut fragment = file_markup("file:///report.pdf");

        assert!(handler.apply_fragment(&mut fragment, &test_media()));
        let html = fragment.serialize();
        assert_eq!(
            html,
            concat!(
                "<div class=\"wp-block-file\">",
                "<object class=\"wp-block-file__embed\" data=\"https://example.com/wp-content/uploads/photo.jpg\" type=\"application/pdf\"></object>",
                "<a id=\"wp-block-file--media-1\" href=\"https://example.com/wp-content/uploads/photo.jpg\">report.pdf</a>",
                "<a href=\"https://example.com/wp-content/uploads/photo.jpg\" class=\"wp-block-file__button\" download aria-describedby=\"wp-block-file--media-1\">Download</a>",
                "<a href=\"https://example.org/terms\">terms</a>",
                "</div>"
            )
        );
    }

    #[test]
    fn test_fragment_without_old_href_rewrites_all_links() {
        let mut fragment = file_markup("file:///report.pdf");

        assert!(FileHandler::default().apply_fragment(&mut fragment, &test_media()));
        assert!(!fragment.serialize().contains("https://example.org/terms"));
    }

    #[test]
    fn test_fragment_without_links() {
        let mut fragment = Fragment::parse("<div class=\"wp-block-file\"></div>").unwrap();
        assert!(!FileHandler::default().apply_fragment(&mut fragment, &test_media()));
    }
}
