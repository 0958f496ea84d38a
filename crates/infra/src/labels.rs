//! Sticker label rendering for item identifiers.
//!
//! Labels are self-contained data URLs so the console can show or print them
//! without another round trip. Rendering is best-effort display garnish; a
//! renderer returns `None` rather than failing the listing that asked for it.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use assetdesk_core::ItemNo;

pub trait LabelRenderer: Send + Sync {
    /// Render a sticker for `item_no` as a data URL.
    fn render(&self, item_no: &ItemNo) -> Option<String>;
}

/// Renders a printable SVG tag carrying the identifier text.
#[derive(Debug, Default, Clone)]
pub struct SvgLabelRenderer;

impl LabelRenderer for SvgLabelRenderer {
    fn render(&self, item_no: &ItemNo) -> Option<String> {
        let svg = format!(
            concat!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="220" height="60">"#,
                r#"<rect width="220" height="60" fill="white" stroke="black"/>"#,
                r#"<text x="110" y="36" text-anchor="middle" "#,
                r#"font-family="monospace" font-size="20">{}</text>"#,
                r#"</svg>"#
            ),
            item_no
        );
        Some(format!(
            "data:image/svg+xml;base64,{}",
            BASE64.encode(svg.as_bytes())
        ))
    }
}

/// Renders nothing. For deployments without label printing.
#[derive(Debug, Default, Clone)]
pub struct NullLabelRenderer;

impl LabelRenderer for NullLabelRenderer {
    fn render(&self, _item_no: &ItemNo) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn svg_renderer_emits_a_data_url_with_the_identifier() {
        let item_no = ItemNo::new(25, 7).unwrap();
        let url = SvgLabelRenderer.render(&item_no).unwrap();
        assert!(url.starts_with("data:image/svg+xml;base64,"));

        let payload = url.trim_start_matches("data:image/svg+xml;base64,");
        let svg = String::from_utf8(BASE64.decode(payload).unwrap()).unwrap();
        assert!(svg.contains("ITM-25-00007"));
    }

    #[test]
    fn null_renderer_renders_nothing() {
        assert_eq!(NullLabelRenderer.render(&ItemNo::new(25, 1).unwrap()), None);
    }
}
