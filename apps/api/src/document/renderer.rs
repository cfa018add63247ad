use serde::Serialize;

use crate::document::structure::{Layout, TemplateStructure};

/// The renderer implementations that actually exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererVariant {
    Standard,
    Split,
}

/// Picks the renderer for a validated structure.
///
/// `creative` and `minimal` are valid layouts without a renderer of their own
/// yet; they render with the standard variant.
pub fn resolve_renderer(structure: &TemplateStructure) -> RendererVariant {
    match structure.layout {
        Layout::Split => RendererVariant::Split,
        Layout::Standard | Layout::Creative | Layout::Minimal => RendererVariant::Standard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_layout(layout: Layout) -> TemplateStructure {
        TemplateStructure {
            layout,
            ..TemplateStructure::default()
        }
    }

    #[test]
    fn test_split_resolves_to_split() {
        assert_eq!(resolve_renderer(&with_layout(Layout::Split)), RendererVariant::Split);
    }

    #[test]
    fn test_other_layouts_resolve_to_standard() {
        for layout in [Layout::Standard, Layout::Creative, Layout::Minimal] {
            assert_eq!(resolve_renderer(&with_layout(layout)), RendererVariant::Standard);
        }
    }
}
