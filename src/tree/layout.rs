use tracing::{debug_span, trace};

use super::{TARGET, Tree};
use crate::animation::{AnimationToken, Animator};
use crate::error::TreeError;
use crate::model::TreeId;
use crate::render::RowRenderer;
use crate::scrollbar::ScrollMetrics;

impl<Id, R, A> Tree<Id, R, A>
where
    Id: TreeId + 'static,
    R: RowRenderer<Id>,
    A: Animator<R::Handle>,
{
    /// Starts rendering: rows around the scroll position get attached.
    pub fn render(&mut self) -> Result<(), TreeError> {
        let _span = debug_span!(target: TARGET, "render").entered();
        self.rendered = true;
        self.viewport.invalidate();
        self.render_viewport()
    }

    /// Reconciles the attached rows with the window around the scroll position.
    ///
    /// Deferred while row transitions run; replayed when the last one finishes.
    pub fn render_viewport(&mut self) -> Result<(), TreeError> {
        if !self.rendered {
            return Ok(());
        }
        if self.viewport.running_animations() > 0 {
            let running = self.viewport.running_animations();
            trace!(target: TARGET, running, "viewport render deferred");
            self.viewport.defer_render();
            return Ok(());
        }
        let index = self.viewport.index_at_offset(
            &self.flat,
            &self.store,
            self.scroll_top,
            self.config.node_height,
        );
        let range = self.viewport.view_range_for_index(index, self.flat.len());
        let (viewport, mut cx) = self.parts();
        viewport.render_view_range(&mut cx, range)?;
        let metrics = self.scroll_metrics();
        self.scrollbar.update_thumb(false, metrics);
        Ok(())
    }

    /// Drops the rendered range and renders the window again from scratch.
    pub fn rerender_viewport(&mut self) -> Result<(), TreeError> {
        self.viewport.invalidate();
        self.render_viewport()
    }

    /// Applies what the mutations since the last call left pending: the viewport render
    /// and the scrollbar recomputation. Call once per event-loop turn.
    pub fn validate_layout(&mut self) -> Result<(), TreeError> {
        let max_top = self.content_height().saturating_sub(self.view_height);
        if self.scroll_top > max_top {
            self.scroll_top = max_top;
            self.layout_invalid = true;
        }
        // A render deferred behind transitions that were stopped rather than finished.
        let replay = self.viewport.running_animations() == 0 && self.viewport.take_pending_render();
        if self.layout_invalid || replay {
            self.layout_invalid = false;
            self.render_viewport()?;
        }
        let metrics = self.scroll_metrics();
        self.scrollbar.flush(metrics);
        Ok(())
    }

    /// Reports the completion of a row transition started through the animator.
    ///
    /// Returns `false` for unknown or already finalized tokens.
    pub fn animation_finished(&mut self, token: AnimationToken) -> Result<bool, TreeError> {
        let (viewport, mut cx) = self.parts();
        if !viewport.finish_job(&mut cx, token) {
            return Ok(false);
        }
        if self.viewport.running_animations() == 0 && self.viewport.take_pending_render() {
            self.render_viewport()?;
        }
        Ok(true)
    }

    pub fn set_view_range_size(&mut self, size: usize) -> Result<(), TreeError> {
        if size == self.viewport.view_range_size() {
            return Ok(());
        }
        self.viewport.set_view_range_size(size);
        self.render_viewport()
    }

    /// Window size for a viewport `height` rows high: two screens, at least 4 entries.
    pub fn calculate_view_range_size(&self, height: u32) -> Result<usize, TreeError> {
        let node_height = self.config.node_height;
        if node_height == 0 {
            return Err(TreeError::ZeroNodeHeight);
        }
        let rows = height.div_ceil(node_height) as usize;
        Ok((rows * 2).max(4))
    }

    /// Sets the height of the visible area and adapts the window size to it.
    pub fn set_view_height(&mut self, height: u32) -> Result<(), TreeError> {
        let size = self.calculate_view_range_size(height)?;
        self.view_height = height;
        self.viewport.set_view_range_size(size);
        self.layout_invalid = true;
        Ok(())
    }

    #[inline]
    pub const fn view_height(&self) -> u32 {
        self.view_height
    }

    /// Scrolls to `top` (row units) and renders the window around it.
    pub fn set_scroll_top(&mut self, top: u32) -> Result<(), TreeError> {
        let max_top = self.content_height().saturating_sub(self.view_height);
        let top = top.min(max_top);
        if top == self.scroll_top {
            return Ok(());
        }
        self.scroll_top = top;
        self.render_viewport()
    }

    /// Scrolls the least amount needed to show `id`. Nothing happens before the first
    /// render or for nodes outside the flat list.
    pub fn scroll_to(&mut self, id: Id) -> Result<(), TreeError> {
        if !self.rendered {
            return Ok(());
        }
        let Some(index) = self.flat.index_of(id) else {
            return Ok(());
        };
        let top = self.offset_of(index);
        let bottom = top.saturating_add(self.row_height(id));
        let scroll_top = if top < self.scroll_top {
            top
        } else if bottom > self.scroll_top.saturating_add(self.view_height) {
            bottom.saturating_sub(self.view_height)
        } else {
            self.scroll_top
        };
        self.scroll_top = scroll_top;
        self.render_viewport()
    }

    /// Makes the primary selection visible and scrolls to it.
    pub fn reveal_selection(&mut self) -> Result<(), TreeError> {
        let Some(primary) = self.selection.primary() else {
            return Ok(());
        };
        if !self.flat.contains(primary) {
            self.expand_all_parent_nodes(primary)?;
            self.layout_invalid = false;
            self.rerender_viewport()?;
        }
        self.scroll_to(primary)
    }

    /// Stores the measured heights of attached rows and forgets those of detached rows.
    pub fn update_node_heights(&mut self) {
        let measured: Vec<(Id, Option<u32>)> = self
            .viewport
            .attached_rows()
            .map(|(id, handle)| (id, self.renderer.measure(handle)))
            .collect();
        let detached: Vec<Id> = self.viewport.detached_rows().collect();
        for (id, height) in measured {
            if let Some(node) = self.store.get_mut(id) {
                node.height = height;
            }
        }
        for id in detached {
            if let Some(node) = self.store.get_mut(id) {
                node.height = None;
            }
        }
        let metrics = self.scroll_metrics();
        self.scrollbar.update_thumb(false, metrics);
    }

    /// Heights reserved before and after the attached rows.
    pub fn filler_heights(&self) -> (u32, u32) {
        self.viewport.filler_heights(&self.flat, &self.store, self.config.node_height)
    }

    /// Total height of the flat list.
    pub fn content_height(&self) -> u32 {
        self.flat
            .as_slice()
            .iter()
            .map(|id| self.row_height(*id))
            .fold(0, u32::saturating_add)
    }

    pub fn scroll_metrics(&self) -> ScrollMetrics {
        ScrollMetrics {
            offset: self.view_height as f32,
            scroll: self.content_height() as f32,
            position: self.scroll_top as f32,
        }
    }

    fn row_height(&self, id: Id) -> u32 {
        self.store
            .get(id)
            .and_then(|node| node.height)
            .unwrap_or(self.config.node_height)
    }

    fn offset_of(&self, index: usize) -> u32 {
        self.flat.as_slice()[..index.min(self.flat.len())]
            .iter()
            .map(|id| self.row_height(*id))
            .fold(0, u32::saturating_add)
    }
}
