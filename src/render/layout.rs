//! Bridges the template node tree onto the taffy flexbox solver.
//!
//! Content-bound nodes become measured leaves; the measure callback gets the
//! render engine as a captured reference, reconstructs the classic
//! undefined / at-most / exactly measure modes from taffy's inputs, and
//! reports intrinsic sizes for text and images.

use taffy::prelude::*;
use taffy::{NodeId, TaffyTree};

use crate::display::Slot;
use crate::error::Error;
use crate::render::node::Node;
use crate::render::RenderEngine;

/// Per-node payload carried through the taffy tree into measurement and
/// rasterization.
pub(crate) struct RenderBox {
    pub id: Option<String>,
    pub content: Option<Slot>,
    pub font_size: f32,
    pub padding: f32,
}

/// Sizing constraint for one axis of a measure call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MeasureMode {
    Undefined,
    AtMost,
    Exactly,
}

/// A solved layout: every node positioned and padded, ready to rasterize.
pub struct SolvedLayout {
    pub(crate) tree: TaffyTree<RenderBox>,
    pub(crate) root: NodeId,
}

/// Absolute pixel rectangle of one laid-out node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedRect {
    pub id: Option<String>,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub padding_left: i32,
    pub padding_right: i32,
    pub padding_top: i32,
    pub padding_bottom: i32,
}

/// Lays out a bound node tree against a `width`x`height` viewport.
pub(crate) fn solve(
    root_node: Node,
    width: u32,
    height: u32,
    engine: &RenderEngine,
) -> Result<SolvedLayout, Error> {
    let mut tree: TaffyTree<RenderBox> = TaffyTree::new();
    let root = inflate(&mut tree, root_node).map_err(|e| Error::Layout(e.to_string()))?;

    // The viewport is authoritative for the root rectangle.
    let mut root_style = tree
        .style(root)
        .map_err(|e| Error::Layout(e.to_string()))?
        .clone();
    root_style.size = Size {
        width: length(width as f32),
        height: length(height as f32),
    };
    tree.set_style(root, root_style)
        .map_err(|e| Error::Layout(e.to_string()))?;

    let available = Size {
        width: AvailableSpace::Definite(width as f32),
        height: AvailableSpace::Definite(height as f32),
    };
    tree.compute_layout_with_measure(root, available, |known, avail, _node, ctx, _style| {
        let Some(node_box) = ctx else {
            return Size::ZERO;
        };
        let w = axis(known.width, avail.width);
        let h = axis(known.height, avail.height);
        measure_box(engine, node_box, w, h)
    })
    .map_err(|e| Error::Layout(e.to_string()))?;

    Ok(SolvedLayout { tree, root })
}

fn inflate(tree: &mut TaffyTree<RenderBox>, node: Node) -> Result<NodeId, taffy::TaffyError> {
    let style = node.style();
    let Node {
        id,
        content,
        font_size,
        padding,
        children,
        ..
    } = node;
    let node_box = RenderBox {
        id,
        content,
        font_size,
        padding,
    };
    if node_box.content.is_some() {
        // Bound nodes are replaced elements: measured, never recursed into.
        tree.new_leaf_with_context(style, node_box)
    } else {
        let mut child_ids = Vec::with_capacity(children.len());
        for child in children {
            child_ids.push(inflate(tree, child)?);
        }
        let taffy_id = tree.new_with_children(style, &child_ids)?;
        tree.set_node_context(taffy_id, Some(node_box))?;
        Ok(taffy_id)
    }
}

fn axis(known: Option<f32>, avail: AvailableSpace) -> (f32, MeasureMode) {
    match (known, avail) {
        (Some(v), _) => (v, MeasureMode::Exactly),
        (None, AvailableSpace::Definite(v)) => (v, MeasureMode::AtMost),
        (None, _) => (f32::INFINITY, MeasureMode::Undefined),
    }
}

fn measure_box(
    engine: &RenderEngine,
    node_box: &RenderBox,
    (w, wm): (f32, MeasureMode),
    (h, hm): (f32, MeasureMode),
) -> Size<f32> {
    let (mut out_w, mut out_h) = match &node_box.content {
        Some(Slot::Text(text)) => {
            let (tw, th) = engine.measure_text(text, node_box.font_size, w);
            (tw + 2.0 * node_box.padding, th + 2.0 * node_box.padding)
        }
        Some(Slot::Image(image)) => measure_image(
            image.width() as f32,
            image.height() as f32,
            (w, wm),
            (h, hm),
        ),
        None => (0.0, 0.0),
    };
    if wm != MeasureMode::Undefined {
        out_w = out_w.min(w);
    }
    if hm != MeasureMode::Undefined {
        out_h = out_h.min(h);
    }
    Size {
        width: out_w,
        height: out_h,
    }
}

/// Aspect-preserving image measurement.
///
/// Fully unconstrained returns the intrinsic size; one exact axis with the
/// other at-most derives the free axis by uniform scale, clamped to its
/// hint; any other combination takes the hints verbatim.
fn measure_image(iw: f32, ih: f32, (w, wm): (f32, MeasureMode), (h, hm): (f32, MeasureMode)) -> (f32, f32) {
    if iw <= 0.0 || ih <= 0.0 {
        return (0.0, 0.0);
    }
    if wm == MeasureMode::Undefined && hm == MeasureMode::Undefined {
        return (iw, ih);
    }
    if wm == MeasureMode::Exactly && hm == MeasureMode::AtMost {
        let scaled = ih * w / iw;
        return if scaled <= h { (w, scaled) } else { (w, h) };
    }
    if wm == MeasureMode::AtMost && hm == MeasureMode::Exactly {
        let scaled = iw * h / ih;
        return if scaled <= w { (scaled, h) } else { (w, h) };
    }
    (
        if w.is_finite() { w } else { iw },
        if h.is_finite() { h } else { ih },
    )
}

impl SolvedLayout {
    /// Flattens the layout into absolute integer rectangles.
    ///
    /// Floats truncate toward zero so adjacent rectangles never overlap
    /// when totals do not divide evenly, and every rectangle is clipped to
    /// the viewport.
    pub fn rects(&self, viewport_width: u32, viewport_height: u32) -> Result<Vec<PlacedRect>, Error> {
        let mut out = Vec::new();
        self.collect_rects(
            self.root,
            0,
            0,
            viewport_width as i32,
            viewport_height as i32,
            &mut out,
        )?;
        Ok(out)
    }

    fn collect_rects(
        &self,
        node: NodeId,
        offset_x: i32,
        offset_y: i32,
        vw: i32,
        vh: i32,
        out: &mut Vec<PlacedRect>,
    ) -> Result<(), Error> {
        let layout = self
            .tree
            .layout(node)
            .map_err(|e| Error::Layout(e.to_string()))?;
        let x = offset_x + layout.location.x as i32;
        let y = offset_y + layout.location.y as i32;
        let w = layout.size.width as i32;
        let h = layout.size.height as i32;

        let clipped_x = x.clamp(0, vw);
        let clipped_y = y.clamp(0, vh);
        let clipped_w = ((x + w).min(vw) - clipped_x).max(0);
        let clipped_h = ((y + h).min(vh) - clipped_y).max(0);

        let id = self
            .tree
            .get_node_context(node)
            .and_then(|b| b.id.clone());
        out.push(PlacedRect {
            id,
            x: clipped_x,
            y: clipped_y,
            width: clipped_w,
            height: clipped_h,
            padding_left: layout.padding.left as i32,
            padding_right: layout.padding.right as i32,
            padding_top: layout.padding.top as i32,
            padding_bottom: layout.padding.bottom as i32,
        });

        let children = self
            .tree
            .children(node)
            .map_err(|e| Error::Layout(e.to_string()))?;
        for child in children {
            self.collect_rects(child, x, y, vw, vh, out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconstrained_image_measures_intrinsic() {
        let w = (f32::INFINITY, MeasureMode::Undefined);
        let h = (f32::INFINITY, MeasureMode::Undefined);
        assert_eq!(measure_image(80.0, 60.0, w, h), (80.0, 60.0));
    }

    #[test]
    fn exact_width_derives_height_by_scale() {
        let w = (40.0, MeasureMode::Exactly);
        let h = (100.0, MeasureMode::AtMost);
        assert_eq!(measure_image(80.0, 60.0, w, h), (40.0, 30.0));
    }

    #[test]
    fn derived_height_clamps_to_hint() {
        let w = (400.0, MeasureMode::Exactly);
        let h = (100.0, MeasureMode::AtMost);
        assert_eq!(measure_image(80.0, 60.0, w, h), (400.0, 100.0));
    }

    #[test]
    fn exact_height_derives_width_by_scale() {
        let w = (200.0, MeasureMode::AtMost);
        let h = (30.0, MeasureMode::Exactly);
        assert_eq!(measure_image(80.0, 60.0, w, h), (40.0, 30.0));
    }

    #[test]
    fn other_combinations_take_hints_verbatim() {
        let w = (120.0, MeasureMode::AtMost);
        let h = (90.0, MeasureMode::AtMost);
        assert_eq!(measure_image(80.0, 60.0, w, h), (120.0, 90.0));
    }

    #[test]
    fn degenerate_images_measure_zero() {
        let w = (120.0, MeasureMode::Exactly);
        let h = (90.0, MeasureMode::AtMost);
        assert_eq!(measure_image(0.0, 60.0, w, h), (0.0, 0.0));
    }

    #[test]
    fn axis_mode_reconstruction() {
        assert_eq!(axis(Some(10.0), AvailableSpace::Definite(50.0)), (10.0, MeasureMode::Exactly));
        assert_eq!(axis(None, AvailableSpace::Definite(50.0)), (50.0, MeasureMode::AtMost));
        assert_eq!(axis(None, AvailableSpace::MaxContent), (f32::INFINITY, MeasureMode::Undefined));
        assert_eq!(axis(None, AvailableSpace::MinContent), (f32::INFINITY, MeasureMode::Undefined));
    }
}
