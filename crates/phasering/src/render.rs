use crate::connector::ConnectorSegment;
use crate::geometry::Size;
use crate::layout::{Item, LayoutPass, Placement};
use crate::theme::{ConnectorStyle, ItemStyle, Marker, Theme};
use std::fmt::Debug;

/// A retained drawing surface. Handles stay valid until the next `clear`.
pub trait Surface {
    type Handle: Copy + Eq + Debug;

    fn resize(&mut self, size: Size);
    fn clear(&mut self);
    fn define_marker(&mut self, marker: &Marker);
    fn draw_connector(&mut self, segment: &ConnectorSegment, style: &ConnectorStyle)
    -> Self::Handle;
    fn draw_item(&mut self, item: &Item, placement: &Placement, style: &ItemStyle) -> Self::Handle;
    fn restyle_connector(&mut self, handle: Self::Handle, style: &ConnectorStyle);
    fn restyle_item(&mut self, handle: Self::Handle, style: &ItemStyle);
}

/// Owns a surface and the per-pass index from step number to drawn element.
pub struct Renderer<S: Surface> {
    surface: S,
    connectors: Vec<S::Handle>,
    items: Vec<S::Handle>,
}

impl<S: Surface> Renderer<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            connectors: Vec::new(),
            items: Vec::new(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Redraws everything from `pass`. Nothing from a previous pass survives.
    pub fn render(&mut self, pass: &LayoutPass, items: &[Item], theme: &Theme) {
        self.surface.resize(pass.size);
        self.surface.clear();
        self.connectors.clear();
        self.items.clear();

        if pass.is_empty() {
            return;
        }

        for marker in theme.markers() {
            self.surface.define_marker(&marker);
        }

        let connector_style = theme.connector_style(false);
        self.connectors = pass
            .connectors
            .iter()
            .map(|segment| self.surface.draw_connector(segment, &connector_style))
            .collect();

        let item_style = theme.item_style(false);
        self.items = items
            .iter()
            .zip(&pass.placements)
            .map(|(item, placement)| self.surface.draw_item(item, placement, &item_style))
            .collect();

        log::debug!(
            "Rendered {} items and {} connectors at {}x{}",
            self.items.len(),
            self.connectors.len(),
            pass.size.width,
            pass.size.height
        );
    }

    pub fn connector_handle(&self, index: usize) -> Option<S::Handle> {
        self.connectors.get(index).copied()
    }

    pub fn item_handle(&self, index: usize) -> Option<S::Handle> {
        self.items.get(index).copied()
    }

    /// Styles step `index` and its outgoing connector. Baseline values always come from the
    /// theme so turning a highlight off restores exactly what `render` drew.
    pub fn set_highlight(&mut self, index: usize, highlighted: bool, theme: &Theme) {
        if let Some(handle) = self.item_handle(index) {
            self.surface
                .restyle_item(handle, &theme.item_style(highlighted));
        }
        if let Some(handle) = self.connector_handle(index) {
            self.surface
                .restyle_connector(handle, &theme.connector_style(highlighted));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::ConnectorSettings;
    use crate::layout::{BoxSize, Label, LayoutEngine};

    #[derive(Default)]
    struct Recorder {
        size: Size,
        clears: usize,
        markers: Vec<&'static str>,
        connectors: Vec<(usize, ConnectorStyle)>,
        items: Vec<(usize, ItemStyle)>,
    }

    impl Surface for Recorder {
        type Handle = usize;

        fn resize(&mut self, size: Size) {
            self.size = size;
        }

        fn clear(&mut self) {
            self.clears += 1;
            self.markers.clear();
            self.connectors.clear();
            self.items.clear();
        }

        fn define_marker(&mut self, marker: &Marker) {
            self.markers.push(marker.id);
        }

        fn draw_connector(&mut self, segment: &ConnectorSegment, style: &ConnectorStyle) -> usize {
            self.connectors.push((segment.index, style.clone()));
            self.connectors.len() - 1
        }

        fn draw_item(&mut self, item: &Item, _: &Placement, style: &ItemStyle) -> usize {
            self.items.push((item.index, style.clone()));
            self.items.len() - 1
        }

        fn restyle_connector(&mut self, handle: usize, style: &ConnectorStyle) {
            self.connectors[handle].1 = style.clone();
        }

        fn restyle_item(&mut self, handle: usize, style: &ItemStyle) {
            self.items[handle].1 = style.clone();
        }
    }

    fn items(n: usize) -> Vec<Item> {
        (0..n)
            .map(|i| Item::new(i, Label::new(format!("Step {i}")), BoxSize::default()))
            .collect()
    }

    fn pass(size: Size, n: usize) -> LayoutPass {
        LayoutEngine::default().pass(size, &vec![BoxSize::default(); n], &ConnectorSettings::default())
    }

    #[test]
    fn test_render_replaces_previous_pass() {
        let theme = Theme::default();
        let mut renderer = Renderer::new(Recorder::default());

        renderer.render(&pass(Size::new(800.0, 800.0), 4), &items(4), &theme);
        renderer.render(&pass(Size::new(400.0, 300.0), 4), &items(4), &theme);

        let surface = renderer.surface();
        assert_eq!(surface.clears, 2);
        assert_eq!(surface.size, Size::new(400.0, 300.0));
        assert_eq!(surface.markers.len(), 2);
        assert_eq!(surface.connectors.len(), 4);
        assert_eq!(surface.items.len(), 4);
    }

    #[test]
    fn test_index_maps_to_source_step() {
        let theme = Theme::default();
        let mut renderer = Renderer::new(Recorder::default());
        renderer.render(&pass(Size::new(800.0, 800.0), 5), &items(5), &theme);

        for k in 0..5 {
            let handle = renderer.connector_handle(k).unwrap();
            assert_eq!(renderer.surface().connectors[handle].0, k);
        }
        assert!(renderer.connector_handle(5).is_none());
    }

    #[test]
    fn test_empty_pass_draws_nothing() {
        let theme = Theme::default();
        let mut renderer = Renderer::new(Recorder::default());
        renderer.render(&pass(Size::new(800.0, 800.0), 3), &items(3), &theme);
        renderer.render(&pass(Size::new(0.0, 0.0), 3), &items(3), &theme);

        let surface = renderer.surface();
        assert!(surface.connectors.is_empty());
        assert!(surface.items.is_empty());
        assert!(surface.markers.is_empty());
        assert!(renderer.item_handle(0).is_none());
    }

    #[test]
    fn test_set_highlight_round_trip() {
        let theme = Theme::default();
        let mut renderer = Renderer::new(Recorder::default());
        renderer.render(&pass(Size::new(800.0, 800.0), 4), &items(4), &theme);
        let before = (
            renderer.surface().connectors.clone(),
            renderer.surface().items.clone(),
        );

        renderer.set_highlight(2, true, &theme);
        assert!(renderer.surface().connectors[2].1.highlighted);
        assert!(renderer.surface().items[2].1.highlighted);

        renderer.set_highlight(2, false, &theme);
        let after = (
            renderer.surface().connectors.clone(),
            renderer.surface().items.clone(),
        );
        assert_eq!(before, after);
    }
}
