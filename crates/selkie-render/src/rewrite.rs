//! Structural rewrite of rendered vector documents.
//!
//! Rendering engines emit diagram node labels as rich-text `<foreignObject>` fragments, which the
//! rasterization path cannot draw. This module replaces that construct with a plain `<text>` node
//! centered on the label's background shape. Matching is positional over the serialized text, not
//! a full document parse: only this one structural shape needs rewriting.

const CLOSE_TAG: &str = "</foreignObject>";

/// Replaces every matched rich-text label construct with a centered plain text node.
///
/// A match is a group carrying a `translate` transform that contains a background `<rect>`
/// followed by a `<foreignObject>` nesting a `<span class="nodeLabel">`. The text node is placed
/// at the rect's geometric center (`x + width/2`, `y + height/2`); rect coordinates default to 0
/// and its size falls back to the `foreignObject`'s when absent. Everything else — the group's
/// transform, siblings before and after the construct — is preserved. Documents with no matches
/// are returned unchanged, byte for byte; deviating structure (label before shape, no enclosing
/// group transform) is a silent no-op, mirroring how engines actually emit labels.
pub fn foreign_object_labels_to_text(svg: &str) -> String {
    let mut out = String::with_capacity(svg.len());
    let mut i = 0usize;

    while let Some(rel) = svg[i..].find("<foreignObject") {
        let fo_start = i + rel;
        let Some(tag_len) = svg[fo_start..].find('>') else {
            break;
        };
        let fo_tag_end = fo_start + tag_len;
        let fo_tag = &svg[fo_start..=fo_tag_end];

        let inner_start = fo_tag_end + 1;
        let Some(close_rel) = svg[inner_start..].find(CLOSE_TAG) else {
            break;
        };
        let inner = &svg[inner_start..inner_start + close_rel];
        let fo_end = inner_start + close_rel + CLOSE_TAG.len();

        match label_text_node(&svg[..fo_start], fo_tag, inner) {
            Some(text_node) => {
                out.push_str(&svg[i..fo_start]);
                out.push_str(&text_node);
            }
            None => out.push_str(&svg[i..fo_end]),
        }
        i = fo_end;
    }

    out.push_str(&svg[i..]);
    out
}

fn label_text_node(prefix: &str, fo_tag: &str, inner: &str) -> Option<String> {
    let fo_width = parse_attr_f64(fo_tag, "width")?;
    let fo_height = parse_attr_f64(fo_tag, "height")?;
    let label = node_label(inner)?;

    // The background shape: the nearest preceding <rect>, still inside the open group.
    let rect_start = rfind_element_open(prefix, "<rect")?;
    let rect_tag_end = rect_start + prefix[rect_start..].find('>')?;
    let rect_tag = &prefix[rect_start..=rect_tag_end];
    if prefix[rect_tag_end..].contains("</g>") {
        return None;
    }

    // The enclosing group must carry a translate transform.
    let g_start = rfind_element_open(&prefix[..rect_start], "<g")?;
    let g_tag_end = g_start + prefix[g_start..].find('>')?;
    let g_tag = &prefix[g_start..=g_tag_end];
    if !g_tag.contains("transform=\"translate(") {
        return None;
    }
    if prefix[g_tag_end..rect_start].contains("</g>") {
        return None;
    }

    let rect_x = parse_attr_f64(rect_tag, "x").unwrap_or(0.0);
    let rect_y = parse_attr_f64(rect_tag, "y").unwrap_or(0.0);
    let rect_width = parse_attr_f64(rect_tag, "width").unwrap_or(fo_width);
    let rect_height = parse_attr_f64(rect_tag, "height").unwrap_or(fo_height);

    let text_x = rect_x + rect_width / 2.0;
    let text_y = rect_y + rect_height / 2.0;
    Some(format!(
        r##"<text x="{text_x}" y="{text_y}" font-family="Arial, sans-serif" font-size="16" fill="#222" text-anchor="middle" dominant-baseline="middle">{label}</text>"##
    ))
}

/// Finds the last opening tag of `element` (`"<g"`, `"<rect"`), rejecting longer tag names that
/// merely share the prefix (`<glyph>` is not a `<g>`).
fn rfind_element_open(haystack: &str, element: &str) -> Option<usize> {
    let mut end = haystack.len();
    while let Some(pos) = haystack[..end].rfind(element) {
        let after = haystack[pos + element.len()..].chars().next();
        if matches!(after, Some(c) if c.is_whitespace() || c == '>' || c == '/') {
            return Some(pos);
        }
        end = pos;
    }
    None
}

fn node_label(inner: &str) -> Option<&str> {
    let mut i = 0usize;
    while let Some(rel) = inner[i..].find("<span") {
        let start = i + rel;
        let tag_end = start + inner[start..].find('>')?;
        let tag = &inner[start..=tag_end];
        if tag.contains("class=\"nodeLabel\"") {
            let text_start = tag_end + 1;
            let text_end = text_start + inner[text_start..].find("</span>")?;
            return Some(&inner[text_start..text_end]);
        }
        i = tag_end + 1;
    }
    None
}

fn parse_attr_f64(tag: &str, key: &str) -> Option<f64> {
    let needle = format!("{key}=\"");
    let i = tag.find(&needle)?;
    let rest = &tag[i + needle.len()..];
    let end = rest.find('"')?;
    rest[..end].trim().parse::<f64>().ok()
}
