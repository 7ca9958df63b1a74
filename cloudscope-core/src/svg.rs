//! Static SVG and HTML export of a laid-out scene.

use crate::model::ScanResult;
use crate::palette::palette_for;
use crate::scene::{PLACEHOLDER_TEXT, Scene};
use crate::tooltip::TooltipContent;

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn gradient_id(category: cloudscope_scanner::Category) -> String {
    format!("grad-{}", category.slug())
}

/// Renders `scene` as a standalone SVG document. `data` supplies the hover
/// text of each node.
pub fn render_svg(scene: &Scene, data: &ScanResult) -> String {
    let (w, h) = (scene.viewport.width, scene.viewport.height);
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w:.0}\" height=\"{h:.0}\" viewBox=\"0 0 {w:.0} {h:.0}\" font-family=\"sans-serif\">\n"
    ));
    svg.push_str("  <rect width=\"100%\" height=\"100%\" fill=\"#FFFFFF\" stroke=\"#CCCCCC\"/>\n");

    if scene.is_placeholder() {
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" fill=\"#666666\" font-size=\"14\">{}</text>\n",
            w / 2.0,
            h / 2.0,
            escape(scene.placeholder.unwrap_or(PLACEHOLDER_TEXT))
        ));
        svg.push_str("</svg>\n");
        return svg;
    }

    svg.push_str("  <defs>\n");
    for category in scene.categories() {
        let palette = palette_for(category);
        svg.push_str(&format!(
            "    <radialGradient id=\"{}\" cx=\"35%\" cy=\"35%\" r=\"65%\">\n",
            gradient_id(category)
        ));
        svg.push_str(&format!(
            "      <stop offset=\"0%\" stop-color=\"{}\"/>\n",
            palette.inner.hex()
        ));
        svg.push_str(&format!(
            "      <stop offset=\"100%\" stop-color=\"{}\"/>\n",
            palette.outer.hex()
        ));
        svg.push_str("    </radialGradient>\n");
    }
    svg.push_str("  </defs>\n");

    svg.push_str(&format!(
        "  <g class=\"graph\" transform=\"{}\">\n",
        scene.transform.to_svg()
    ));

    for edge in &scene.edges {
        svg.push_str(&format!(
            "    <line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"#999999\" stroke-opacity=\"0.6\"/>\n",
            edge.from.x, edge.from.y, edge.to.x, edge.to.y
        ));
    }

    for node in &scene.nodes {
        let title = data
            .nodes
            .get(node.index)
            .map(|r| TooltipContent::for_resource(r).lines().join("\n"))
            .unwrap_or_else(|| node.id.clone());

        svg.push_str(&format!(
            "    <g class=\"node\" transform=\"translate({:.2},{:.2})\">\n",
            node.center.x, node.center.y
        ));
        svg.push_str(&format!("      <title>{}</title>\n", escape(&title)));
        svg.push_str(&format!(
            "      <circle r=\"{:.2}\" fill=\"url(#{})\" stroke=\"#FFFFFF\" stroke-width=\"1.5\"/>\n",
            node.radius,
            gradient_id(node.category)
        ));
        svg.push_str(&format!(
            "      <text text-anchor=\"middle\" dy=\".3em\" fill=\"#FFFFFF\" font-size=\"12\">{}</text>\n",
            escape(node.tag)
        ));
        svg.push_str(&format!(
            "      <text text-anchor=\"middle\" dy=\"3em\" fill=\"#000000\" font-size=\"10\">{}</text>\n",
            escape(&node.label)
        ));
        svg.push_str("    </g>\n");
    }

    svg.push_str("  </g>\n</svg>\n");
    svg
}

/// Wraps [`render_svg`] in a minimal HTML page.
pub fn render_html(scene: &Scene, data: &ScanResult, title: &str) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape(title)));
    html.push_str(
        "<style>body{font-family:sans-serif;margin:2rem;color:#232F3E}svg{border:1px solid #ccc;border-radius:4px}</style>\n",
    );
    html.push_str("</head>\n<body>\n");
    html.push_str(&format!("<h1>{}</h1>\n", escape(title)));
    html.push_str(&render_svg(scene, data));
    html.push_str("</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::model::Resource;
    use crate::renderer::GraphRenderer;
    use cloudscope_scanner::Category;

    fn laid_out(data: &ScanResult) -> Scene {
        let mut renderer = GraphRenderer::new(800.0, LayoutConfig::default());
        renderer.set_data(data.clone());
        renderer.settle();
        renderer.scene()
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a & "b">"#), "&lt;a &amp; &quot;b&quot;&gt;");
    }

    #[test]
    fn test_placeholder_svg() {
        let data = ScanResult::default();
        let svg = render_svg(&laid_out(&data), &data);
        assert!(svg.contains(PLACEHOLDER_TEXT));
        assert!(!svg.contains("<circle"));
    }

    #[test]
    fn test_one_gradient_per_category() {
        let data = ScanResult::new(vec![
            Resource::new("i-1", Category::Compute, "web"),
            Resource::new("i-2", Category::Compute, "api"),
            Resource::new("logs", Category::ObjectStore, "logs"),
        ]);
        let svg = render_svg(&laid_out(&data), &data);
        assert_eq!(svg.matches("<radialGradient").count(), 2);
        assert_eq!(svg.matches("<circle").count(), 3);
        assert!(svg.contains(r#"fill="url(#grad-ec2)""#));
        assert!(svg.contains("<title>Type: Compute\nName: web\nID: i-1</title>"));
    }

    #[test]
    fn test_names_are_escaped() {
        let data = ScanResult::new(vec![Resource::new("i-1", Category::Compute, "<script>")]);
        let svg = render_svg(&laid_out(&data), &data);
        assert!(!svg.contains("<script>"));
        assert!(svg.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_html_wraps_svg() {
        let data = ScanResult::new(vec![Resource::new("logs", Category::ObjectStore, "logs")]);
        let html = render_html(&laid_out(&data), &data, "Inventory us-east-1");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Inventory us-east-1</title>"));
        assert!(html.contains("<svg"));
    }
}
