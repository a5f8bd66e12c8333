use std::time::Duration;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{error, trace};

use crate::animation::{AnimationKind, AnimationToken, Animator};
use crate::error::TreeError;
use crate::flat_list::FlatList;
use crate::model::TreeId;
use crate::range::Range;
use crate::render::{RowPosition, RowRenderer};
use crate::selection::Selection;
use crate::store::NodeStore;

const TARGET: &str = "tree_viewport";

/// Lifecycle of a row that has a handle. Rows without an entry are absent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowPhase {
    Stable,
    /// Attached, opening animation running.
    Showing(AnimationToken),
    /// Still attached but already gone from the flat list, closing animation running.
    Hiding(AnimationToken),
}

#[derive(Clone, Copy, Debug)]
struct RowEntry<H> {
    handle: H,
    attached: bool,
    phase: RowPhase,
}

#[derive(Clone, Debug)]
struct AnimationJob<Id> {
    kind: AnimationKind,
    rows: SmallVec<[Id; 8]>,
}

/// Animation applied to rows entering or leaving the flat list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Transition {
    pub kind: AnimationKind,
    pub duration: Duration,
}

impl Transition {
    pub(crate) const fn reversed(self) -> Self {
        Self {
            kind: self.kind.reversed(),
            duration: self.duration,
        }
    }
}

/// Borrowed collaborators of one viewport operation.
pub(crate) struct RenderCx<'a, Id, R, A> {
    pub flat: &'a FlatList<Id>,
    pub store: &'a NodeStore<Id>,
    pub selection: &'a Selection<Id>,
    pub renderer: &'a mut R,
    pub animator: &'a mut A,
}

/// Rendered-range state machine over the flat list.
///
/// `rendered` always covers a contiguous slice of the flat list whose rows are all
/// attached. It only changes by union with, or subtraction of, adjacent ranges, except
/// when `dirty` forces a rebuild from scratch.
#[derive(Clone, Debug)]
pub struct Viewport<Id, H> {
    rendered: Range,
    view_range_size: usize,
    dirty: bool,
    rows: FxHashMap<Id, RowEntry<H>>,
    jobs: FxHashMap<AnimationToken, AnimationJob<Id>>,
    pending_render: bool,
    next_token: u64,
}

impl<Id: TreeId, H: Copy + Eq> Viewport<Id, H> {
    pub fn new(view_range_size: usize) -> Self {
        Self {
            rendered: Range::EMPTY,
            view_range_size: view_range_size.max(1),
            dirty: true,
            rows: FxHashMap::default(),
            jobs: FxHashMap::default(),
            pending_render: false,
            next_token: 0,
        }
    }

    #[inline]
    pub const fn rendered(&self) -> Range {
        self.rendered
    }

    #[inline]
    pub const fn view_range_size(&self) -> usize {
        self.view_range_size
    }

    pub(crate) fn set_view_range_size(&mut self, size: usize) {
        self.view_range_size = size.max(1);
    }

    #[inline]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Forces the next reconciliation to rebuild the rendered rows from scratch.
    pub(crate) const fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Number of row transitions still running.
    #[inline]
    pub fn running_animations(&self) -> usize {
        self.jobs.len()
    }

    pub(crate) const fn defer_render(&mut self) {
        self.pending_render = true;
    }

    pub(crate) fn take_pending_render(&mut self) -> bool {
        std::mem::take(&mut self.pending_render)
    }

    pub fn is_attached(&self, id: Id) -> bool {
        self.rows.get(&id).is_some_and(|entry| entry.attached)
    }

    pub fn phase(&self, id: Id) -> Option<RowPhase> {
        self.rows.get(&id).map(|entry| entry.phase)
    }

    pub fn handle(&self, id: Id) -> Option<H> {
        self.rows.get(&id).map(|entry| entry.handle)
    }

    /// Attached rows with their handles, in no particular order.
    pub(crate) fn attached_rows(&self) -> impl Iterator<Item = (Id, H)> + '_ {
        self.rows
            .iter()
            .filter(|(_, entry)| entry.attached)
            .map(|(id, entry)| (*id, entry.handle))
    }

    /// Rows with a handle that are currently detached.
    pub(crate) fn detached_rows(&self) -> impl Iterator<Item = Id> + '_ {
        self.rows
            .iter()
            .filter(|(_, entry)| !entry.attached)
            .map(|(id, _)| *id)
    }

    /// Window of `view_range_size` entries around `index`: a quarter before it, the
    /// rest after it, shifted back when the list end truncates it.
    pub fn view_range_for_index(&self, index: usize, len: usize) -> Range {
        let size = self.view_range_size;
        let quarter = size / 4;
        let from = index.saturating_sub(quarter);
        let to = (from + size).min(len);
        let from = if to.saturating_sub(from) < size {
            to.saturating_sub(size)
        } else {
            from
        };
        Range::new(from.min(to), to)
    }

    /// Flat-list index of the entry spanning `offset` (row units).
    pub fn index_at_offset(
        &self,
        flat: &FlatList<Id>,
        store: &NodeStore<Id>,
        offset: u32,
        node_height: u32,
    ) -> usize {
        let mut top = 0u32;
        for (index, id) in flat.as_slice().iter().enumerate() {
            let bottom = top.saturating_add(row_height(store, *id, node_height));
            if offset < bottom {
                return index;
            }
            top = bottom;
        }
        flat.len().saturating_sub(1)
    }

    /// Heights of the fillers standing in for the rows before and after the rendered range.
    pub fn filler_heights(
        &self,
        flat: &FlatList<Id>,
        store: &NodeStore<Id>,
        node_height: u32,
    ) -> (u32, u32) {
        let ids = flat.as_slice();
        let from = self.rendered.from.min(ids.len());
        let to = self.rendered.to.clamp(from, ids.len());
        let sum = |slice: &[Id]| {
            slice
                .iter()
                .map(|id| row_height(store, *id, node_height))
                .fold(0u32, u32::saturating_add)
        };
        (sum(&ids[..from]), sum(&ids[to..]))
    }

    /// Reconciles the attached rows with `range`.
    ///
    /// Rows in both the old and the new range are left untouched. Fails if the first or
    /// last row of the resulting range is not attached.
    pub(crate) fn render_view_range<R, A>(
        &mut self,
        cx: &mut RenderCx<'_, Id, R, A>,
        range: Range,
    ) -> Result<(), TreeError>
    where
        R: RowRenderer<Id, Handle = H>,
        A: Animator<H>,
    {
        let range = Range::new(range.from.min(cx.flat.len()), range.to.min(cx.flat.len()));
        if range == self.rendered && !self.dirty {
            return Ok(());
        }
        if self.dirty {
            self.dirty = false;
            self.detach_all(cx);
            self.rendered = Range::new(range.from, range.from);
            self.render_rows_in_range(cx, range)?;
        } else {
            let to_remove = self.rendered.subtract(&range);
            let to_render = range.subtract(&self.rendered);
            for part in to_remove {
                self.remove_rows_in_range(cx, part)?;
            }
            for part in to_render {
                self.render_rows_in_range(cx, part)?;
            }
        }
        self.check_rendered(cx)
    }

    pub(crate) fn render_rows_in_range<R, A>(
        &mut self,
        cx: &mut RenderCx<'_, Id, R, A>,
        range: Range,
    ) -> Result<(), TreeError>
    where
        R: RowRenderer<Id, Handle = H>,
        A: Animator<H>,
    {
        if range.is_empty() {
            return Ok(());
        }
        for index in range.iter() {
            self.attach_row(cx, index, range)?;
        }
        self.rendered = self.rendered.union_contiguous(&range)?;
        trace!(target: TARGET, "{} rows rendered from {}", range.size(), range);
        Ok(())
    }

    pub(crate) fn remove_rows_in_range<R, A>(
        &mut self,
        cx: &mut RenderCx<'_, Id, R, A>,
        range: Range,
    ) -> Result<(), TreeError>
    where
        R: RowRenderer<Id, Handle = H>,
        A: Animator<H>,
    {
        if range.is_empty() {
            return Ok(());
        }
        for index in range.iter() {
            let id = entry_at(cx.flat, index)?;
            self.detach_row(cx, id);
        }
        self.rendered = self.rendered.subtract_contiguous(&range)?;
        trace!(target: TARGET, "{} rows removed from {}", range.size(), range);
        Ok(())
    }

    /// Adjusts the rendered range after `count` rows were spliced in at `at`.
    ///
    /// Rows landing before the range shift it. Rows landing within the first
    /// `view_range_size` slots of the range are attached and grow it. Rows landing
    /// further inside an oversized range cut it short, rows after it leave it alone.
    pub(crate) fn rows_inserted<R, A>(
        &mut self,
        cx: &mut RenderCx<'_, Id, R, A>,
        at: usize,
        count: usize,
        transition: Option<Transition>,
    ) -> Result<(), TreeError>
    where
        R: RowRenderer<Id, Handle = H>,
        A: Animator<H>,
    {
        if count == 0 || self.dirty {
            return Ok(());
        }
        let Range { from, to } = self.rendered;
        if at < from {
            self.rendered = self.rendered.shifted(count);
            return Ok(());
        }
        if at <= to && self.attaches_at(at) {
            let inserted = Range::new(at, at + count);
            // The old rows behind `at` already sit at [at + count, to + count).
            self.rendered = Range::new(from, to + count);
            let mut started: SmallVec<[Id; 8]> = SmallVec::new();
            for index in inserted.iter() {
                self.attach_row(cx, index, inserted)?;
                started.push(entry_at(cx.flat, index)?);
            }
            trace!(target: TARGET, "{} inserted rows rendered at {}", count, at);
            if let Some(transition) = transition {
                self.start_job(cx, started, transition);
            }
            return Ok(());
        }
        if at < to {
            // The old rows behind the insertion moved to [at + count, to + count).
            let tail = Range::new(at + count, to + count);
            for index in tail.iter() {
                let id = entry_at(cx.flat, index)?;
                self.detach_row(cx, id);
            }
            self.rendered = Range::new(from, at);
            trace!(
                target: TARGET,
                "rendered range cut to {} by insertion at {}",
                self.rendered,
                at
            );
        }
        Ok(())
    }

    /// Returns `true` if rows inserted at `at` would be attached.
    pub(crate) const fn attaches_at(&self, at: usize) -> bool {
        at >= self.rendered.from
            && at <= self.rendered.to
            && at < self.rendered.from + self.view_range_size
    }

    /// Adjusts the rendered range after `removed` (formerly at `range`) left the flat list.
    ///
    /// Attached rows are detached, or kept attached in the hiding phase while `transition`
    /// runs.
    pub(crate) fn rows_removed<R, A>(
        &mut self,
        cx: &mut RenderCx<'_, Id, R, A>,
        range: Range,
        removed: &[Id],
        transition: Option<Transition>,
    ) where
        R: RowRenderer<Id, Handle = H>,
        A: Animator<H>,
    {
        let mut hiding: SmallVec<[Id; 8]> = SmallVec::new();
        for id in removed {
            if let Some(RowPhase::Showing(token)) = self.phase(*id) {
                self.cancel_job(cx, token);
            }
            if !self.is_attached(*id) || matches!(self.phase(*id), Some(RowPhase::Hiding(_))) {
                continue;
            }
            if transition.is_some() {
                hiding.push(*id);
            } else {
                self.detach_row(cx, *id);
            }
        }
        if !self.dirty {
            let before = Range::new(0, self.rendered.from).intersect(&range).size();
            let inside = self.rendered.intersect(&range).size();
            self.rendered =
                Range::new(self.rendered.from - before, self.rendered.to - before - inside);
        }
        if let Some(transition) = transition {
            self.start_job(cx, hiding, transition);
        }
    }

    /// Drops the handles of deleted nodes. Rows still hiding are released when their
    /// transition finishes.
    pub(crate) fn forget<R, A>(&mut self, cx: &mut RenderCx<'_, Id, R, A>, ids: &[Id])
    where
        R: RowRenderer<Id, Handle = H>,
        A: Animator<H>,
    {
        for id in ids {
            let Some(entry) = self.rows.get(id).copied() else {
                continue;
            };
            match entry.phase {
                RowPhase::Hiding(_) => continue,
                RowPhase::Showing(token) => self.cancel_job(cx, token),
                RowPhase::Stable => {}
            }
            if entry.attached {
                cx.renderer.detach(entry.handle);
            }
            cx.renderer.destroy(entry.handle);
            self.rows.remove(id);
        }
    }

    /// Refreshes the row of `id`, if it has one.
    pub(crate) fn decorate<R, A>(&self, cx: &mut RenderCx<'_, Id, R, A>, id: Id)
    where
        R: RowRenderer<Id, Handle = H>,
    {
        let Some(entry) = self.rows.get(&id) else {
            return;
        };
        if let Some(node) = cx.store.get(id) {
            cx.renderer.decorate(entry.handle, node, cx.selection.contains(id));
        }
    }

    /// Finalizes the transition `token`. Returns `false` for unknown tokens.
    pub(crate) fn finish_job<R, A>(
        &mut self,
        cx: &mut RenderCx<'_, Id, R, A>,
        token: AnimationToken,
    ) -> bool
    where
        R: RowRenderer<Id, Handle = H>,
    {
        let Some(job) = self.jobs.remove(&token) else {
            return false;
        };
        for id in job.rows {
            let Some(entry) = self.rows.get_mut(&id) else {
                continue;
            };
            let phase = entry.phase;
            match phase {
                RowPhase::Showing(owner) if owner == token => entry.phase = RowPhase::Stable,
                RowPhase::Hiding(owner) if owner == token => {
                    entry.phase = RowPhase::Stable;
                    if entry.attached {
                        cx.renderer.detach(entry.handle);
                        entry.attached = false;
                    }
                    if cx.store.get(id).is_none() {
                        cx.renderer.destroy(entry.handle);
                        self.rows.remove(&id);
                    }
                }
                _ => {}
            }
        }
        trace!(target: TARGET, "{:?} finished ({:?})", token, job.kind);
        true
    }

    /// Stops a running transition and finalizes it synchronously.
    pub(crate) fn cancel_job<R, A>(
        &mut self,
        cx: &mut RenderCx<'_, Id, R, A>,
        token: AnimationToken,
    )
    where
        R: RowRenderer<Id, Handle = H>,
        A: Animator<H>,
    {
        if self.jobs.contains_key(&token) {
            cx.animator.stop(token);
            self.finish_job(cx, token);
        }
    }

    fn start_job<R, A>(
        &mut self,
        cx: &mut RenderCx<'_, Id, R, A>,
        rows: SmallVec<[Id; 8]>,
        transition: Transition,
    )
    where
        R: RowRenderer<Id, Handle = H>,
        A: Animator<H>,
    {
        if rows.is_empty() {
            return;
        }
        let token = AnimationToken(self.next_token);
        self.next_token += 1;
        let mut handles: SmallVec<[H; 8]> = SmallVec::new();
        for id in &rows {
            if let Some(entry) = self.rows.get_mut(id) {
                entry.phase = if transition.kind.is_hiding() {
                    RowPhase::Hiding(token)
                } else {
                    RowPhase::Showing(token)
                };
                handles.push(entry.handle);
            }
        }
        self.jobs.insert(
            token,
            AnimationJob {
                kind: transition.kind,
                rows,
            },
        );
        if !cx.animator.animate(token, &handles, transition.kind, transition.duration) {
            self.finish_job(cx, token);
        }
    }

    /// Attaches the flat-list entry at `index`, reusing its handle if it has one.
    /// `bounds` is the range being attached in the same pass.
    fn attach_row<R, A>(
        &mut self,
        cx: &mut RenderCx<'_, Id, R, A>,
        index: usize,
        bounds: Range,
    ) -> Result<(), TreeError>
    where
        R: RowRenderer<Id, Handle = H>,
        A: Animator<H>,
    {
        let id = entry_at(cx.flat, index)?;
        if let Some(RowPhase::Hiding(token)) = self.phase(id) {
            self.cancel_job(cx, token);
        }
        if self.is_attached(id) {
            return Ok(());
        }
        let node = cx.store.node(id)?;
        let handle = match self.rows.get(&id) {
            Some(entry) => entry.handle,
            None => cx.renderer.render_node(node),
        };
        let position = self.position_for(cx.flat, index, bounds);
        cx.renderer.attach(handle, position);
        cx.renderer.decorate(handle, node, cx.selection.contains(id));
        self.rows.insert(
            id,
            RowEntry {
                handle,
                attached: true,
                phase: RowPhase::Stable,
            },
        );
        Ok(())
    }

    fn detach_row<R, A>(&mut self, cx: &mut RenderCx<'_, Id, R, A>, id: Id)
    where
        R: RowRenderer<Id, Handle = H>,
        A: Animator<H>,
    {
        if let Some(RowPhase::Showing(token)) = self.phase(id) {
            self.cancel_job(cx, token);
        }
        if let Some(entry) = self.rows.get_mut(&id) {
            if entry.attached {
                cx.renderer.detach(entry.handle);
                entry.attached = false;
            }
        }
    }

    /// Detaches every row that is not hiding.
    fn detach_all<R, A>(&mut self, cx: &mut RenderCx<'_, Id, R, A>)
    where
        R: RowRenderer<Id, Handle = H>,
        A: Animator<H>,
    {
        let showing: SmallVec<[AnimationToken; 4]> = self
            .jobs
            .iter()
            .filter(|(_, job)| !job.kind.is_hiding())
            .map(|(token, _)| *token)
            .collect();
        for token in showing {
            self.cancel_job(cx, token);
        }
        for entry in self.rows.values_mut() {
            if entry.attached && entry.phase == RowPhase::Stable {
                cx.renderer.detach(entry.handle);
                entry.attached = false;
            }
        }
    }

    /// Nearest attached predecessor, else nearest attached successor, else a filler edge.
    fn position_for(&self, flat: &FlatList<Id>, index: usize, bounds: Range) -> RowPosition<H> {
        let low = self.rendered.from.min(bounds.from);
        let high = self.rendered.to.max(bounds.to).min(flat.len());
        let attached = |at: usize| {
            flat.get(at)
                .and_then(|id| self.rows.get(&id))
                .filter(|entry| entry.attached && !matches!(entry.phase, RowPhase::Hiding(_)))
                .map(|entry| entry.handle)
        };
        if let Some(handle) = (low..index).rev().find_map(attached) {
            return RowPosition::After(handle);
        }
        if let Some(handle) = (index + 1..high).find_map(attached) {
            return RowPosition::Before(handle);
        }
        if index <= self.rendered.from {
            RowPosition::Start
        } else {
            RowPosition::End
        }
    }

    fn check_rendered<R, A>(&self, cx: &RenderCx<'_, Id, R, A>) -> Result<(), TreeError> {
        if self.rendered.is_empty() {
            return Ok(());
        }
        let first = cx.flat.get(self.rendered.from);
        let last = cx.flat.get(self.rendered.to - 1);
        let ok = first.is_some_and(|id| self.is_attached(id))
            && last.is_some_and(|id| self.is_attached(id));
        if ok {
            Ok(())
        } else {
            error!(target: TARGET, range = %self.rendered, "rows not rendered as expected");
            Err(TreeError::RenderedRangeNotAttached { range: self.rendered })
        }
    }
}

#[inline]
fn row_height<Id: TreeId>(store: &NodeStore<Id>, id: Id, node_height: u32) -> u32 {
    store
        .get(id)
        .and_then(|node| node.height())
        .unwrap_or(node_height)
}

fn entry_at<Id: TreeId>(flat: &FlatList<Id>, index: usize) -> Result<Id, TreeError> {
    flat.get(index).ok_or_else(|| {
        error!(target: TARGET, index, len = flat.len(), "flat list index out of bounds");
        TreeError::InvariantViolation(format!(
            "flat list index {index} out of bounds (len {})",
            flat.len()
        ))
    })
}
