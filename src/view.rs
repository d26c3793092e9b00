//! Selection state and render notification.
//!
//! `ViewBinding` owns the current `Metric` selection and a read-only handle to
//! the table being displayed. The renderer is invoked on every selection
//! change, and on demand through `force_redraw` after a data swap.

use std::sync::Arc;

use crate::domain::{Metric, MetricTable};

/// Something that can draw a table for one metric.
pub trait Renderer {
    fn render(&mut self, table: &MetricTable, metric: Metric);
}

impl<F> Renderer for F
where
    F: FnMut(&MetricTable, Metric),
{
    fn render(&mut self, table: &MetricTable, metric: Metric) {
        self(table, metric)
    }
}

pub struct ViewBinding<R> {
    selection: Metric,
    table: Arc<MetricTable>,
    renderer: R,
}

impl<R: Renderer> ViewBinding<R> {
    /// Bind a renderer and draw the initial frame.
    pub fn new(table: Arc<MetricTable>, selection: Metric, renderer: R) -> Self {
        let mut view = Self {
            selection,
            table,
            renderer,
        };
        view.draw();
        view
    }

    pub fn selection(&self) -> Metric {
        self.selection
    }

    pub fn table(&self) -> &Arc<MetricTable> {
        &self.table
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Change the selection. Renders only if the value actually changed.
    pub fn select(&mut self, metric: Metric) -> bool {
        if metric == self.selection {
            return false;
        }
        log::debug!("selection: {} -> {}", self.selection, metric);
        self.selection = metric;
        self.draw();
        true
    }

    pub fn select_next(&mut self) -> bool {
        self.select(self.selection.next())
    }

    pub fn select_prev(&mut self) -> bool {
        self.select(self.selection.prev())
    }

    /// Point the view at a new table and redraw once with the current selection.
    pub fn show(&mut self, table: Arc<MetricTable>) {
        self.table = table;
        self.force_redraw();
    }

    /// Re-render with the current selection even though it did not change.
    pub fn force_redraw(&mut self) {
        self.draw();
    }

    /// Redraw by bouncing the selection through a decoy and back.
    ///
    /// The renderer fires twice (decoy, then original) and the selection ends
    /// where it started. Rendering is synchronous, so nothing else observes the
    /// intermediate value. Prefer `force_redraw`.
    pub fn round_trip_redraw(&mut self) {
        let current = self.selection;
        self.select(current.other());
        self.select(current);
    }

    fn draw(&mut self) {
        self.renderer.render(&self.table, self.selection);
    }
}
