use crate::connector::ConnectorSettings;
use crate::geometry::{Point, Size};
use crate::highlight::{HighlightState, Interaction, Target};
use crate::layout::{self, BoxSize, Item, LayoutEngine, LayoutPass};
use crate::render::{Renderer, Surface};
use crate::theme::Theme;
use thiserror::Error;

/// Pointer distance within which a connector counts as hovered.
pub const CONNECTOR_HIT_TOLERANCE: f64 = 6.0;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DiagramError {
    #[error("No drawing surface to render into")]
    MissingSurface,
    #[error("No steps to lay out")]
    NoItems,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DiagramOptions {
    pub engine: LayoutEngine,
    pub connectors: ConnectorSettings,
    pub theme: Theme,
}

/// One independent diagram: its steps, its surface and its highlight.
pub struct Diagram<S: Surface> {
    options: DiagramOptions,
    items: Vec<Item>,
    renderer: Renderer<S>,
    highlight: HighlightState,
    pass: LayoutPass,
}

impl<S: Surface> Diagram<S> {
    pub fn init(
        surface: Option<S>,
        items: Vec<Item>,
        options: DiagramOptions,
    ) -> Result<Self, DiagramError> {
        let surface = surface.ok_or(DiagramError::MissingSurface)?;
        if items.is_empty() {
            return Err(DiagramError::NoItems);
        }

        Ok(Self {
            options,
            items,
            renderer: Renderer::new(surface),
            highlight: HighlightState::Idle,
            pass: LayoutPass::default(),
        })
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn pass(&self) -> &LayoutPass {
        &self.pass
    }

    pub fn surface(&self) -> &S {
        self.renderer.surface()
    }

    pub fn renderer(&self) -> &Renderer<S> {
        &self.renderer
    }

    pub fn options(&self) -> &DiagramOptions {
        &self.options
    }

    pub fn highlight(&self) -> HighlightState {
        self.highlight
    }

    /// Measure, position, clear and redraw for a container of `size`.
    pub fn relayout(&mut self, size: Size) -> &LayoutPass {
        let boxes: Vec<BoxSize> = self.items.iter().map(|item| item.size).collect();
        self.pass = self
            .options
            .engine
            .pass(size, &boxes, &self.options.connectors);
        layout::write_positions(&self.pass.placements, &mut self.items);

        self.renderer
            .render(&self.pass, &self.items, &self.options.theme);

        if let Some(k) = self.highlight.active() {
            if k < self.pass.placements.len() {
                self.renderer.set_highlight(k, true, &self.options.theme);
            } else {
                self.highlight = HighlightState::Idle;
            }
        }
        &self.pass
    }

    /// Feeds one pointer or keyboard event through the highlight state machine.
    pub fn handle(&mut self, event: Interaction) -> HighlightState {
        let next = self.highlight.on(event, self.pass.placements.len());
        if next == self.highlight {
            return next;
        }

        if let Some(prev) = self.highlight.active() {
            self.renderer.set_highlight(prev, false, &self.options.theme);
        }
        if let Some(k) = next.active() {
            self.renderer.set_highlight(k, true, &self.options.theme);
            if let Some((index, source)) = event.activation() {
                log::info!(
                    "Activated step {} ({}) via {}",
                    index,
                    self.items[index].label,
                    source
                );
            }
        }
        self.highlight = next;
        next
    }

    /// Which step or connector sits under `point`. Steps win over connectors.
    pub fn hit_test(&self, point: Point) -> Option<Target> {
        if let Some(p) = self.pass.placements.iter().find(|p| p.contains(point)) {
            return Some(Target::Item(p.index));
        }
        self.pass
            .connectors
            .iter()
            .map(|c| (c.index, c.distance_to(point)))
            .filter(|(_, d)| *d <= CONNECTOR_HIT_TOLERANCE)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| Target::Connector(index))
    }
}
