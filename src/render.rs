use std::fmt::Debug;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::model::TreeId;
use crate::node::TreeNode;

/// Where a row is attached relative to the rows already on the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowPosition<H> {
    /// First row, right after the leading filler.
    Start,
    /// Last row, right before the trailing filler.
    End,
    After(H),
    Before(H),
}

/// Surface the tree renders rows into.
///
/// A handle lives from `render_node` until `destroy`; in between it may be attached
/// and detached any number of times.
pub trait RowRenderer<Id> {
    type Handle: Copy + Eq + Hash + Debug;

    /// Creates a detached row for `node`.
    fn render_node(&mut self, node: &TreeNode<Id>) -> Self::Handle;

    fn attach(&mut self, handle: Self::Handle, position: RowPosition<Self::Handle>);

    fn detach(&mut self, handle: Self::Handle);

    /// Releases a detached row for good.
    fn destroy(&mut self, handle: Self::Handle);

    /// Refreshes a row after node flags (selection, expansion, check) changed.
    fn decorate(&mut self, _handle: Self::Handle, _node: &TreeNode<Id>, _selected: bool) {}

    /// Height of an attached row, `None` if unknown.
    fn measure(&self, _handle: Self::Handle) -> Option<u32> {
        None
    }
}

/// Handle of a row on a [`RowSurface`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowHandle(u64);

#[derive(Clone, Debug)]
struct SurfaceRow<Id> {
    id: Id,
    selected: bool,
}

/// In-memory row surface: an ordered list of attached rows.
///
/// Used by the [`TreeView`](crate::TreeView) widget to draw the attached rows and
/// handy for inspecting what the tree rendered.
#[derive(Clone, Debug)]
pub struct RowSurface<Id> {
    rows: FxHashMap<RowHandle, SurfaceRow<Id>>,
    order: Vec<RowHandle>,
    heights: FxHashMap<Id, u32>,
    rendered: Vec<Id>,
    next_handle: u64,
}

impl<Id: TreeId> Default for RowSurface<Id> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id: TreeId> RowSurface<Id> {
    pub fn new() -> Self {
        Self {
            rows: FxHashMap::default(),
            order: Vec::new(),
            heights: FxHashMap::default(),
            rendered: Vec::new(),
            next_handle: 0,
        }
    }

    /// Node ids of the attached rows, top to bottom.
    pub fn attached_ids(&self) -> Vec<Id> {
        self.order
            .iter()
            .filter_map(|handle| self.rows.get(handle).map(|row| row.id))
            .collect()
    }

    #[inline]
    pub fn attached_len(&self) -> usize {
        self.order.len()
    }

    pub fn is_attached(&self, handle: RowHandle) -> bool {
        self.order.contains(&handle)
    }

    /// Number of live (not destroyed) rows.
    #[inline]
    pub fn live_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_selected(&self, id: Id) -> bool {
        self.order
            .iter()
            .filter_map(|handle| self.rows.get(handle))
            .any(|row| row.id == id && row.selected)
    }

    /// Ids passed to `render_node`, oldest first.
    pub fn rendered_log(&self) -> &[Id] {
        &self.rendered
    }

    pub fn clear_log(&mut self) {
        self.rendered.clear();
    }

    /// Reported by `measure` for rows of `id`.
    pub fn set_row_height(&mut self, id: Id, height: u32) {
        self.heights.insert(id, height);
    }

    fn position_of(&self, handle: RowHandle) -> Option<usize> {
        self.order.iter().position(|candidate| *candidate == handle)
    }
}

impl<Id: TreeId> RowRenderer<Id> for RowSurface<Id> {
    type Handle = RowHandle;

    fn render_node(&mut self, node: &TreeNode<Id>) -> RowHandle {
        let handle = RowHandle(self.next_handle);
        self.next_handle += 1;
        self.rendered.push(node.id());
        self.rows.insert(
            handle,
            SurfaceRow {
                id: node.id(),
                selected: false,
            },
        );
        handle
    }

    fn attach(&mut self, handle: RowHandle, position: RowPosition<RowHandle>) {
        if let Some(current) = self.position_of(handle) {
            self.order.remove(current);
        }
        let at = match position {
            RowPosition::Start => 0,
            RowPosition::End => self.order.len(),
            RowPosition::After(anchor) => self
                .position_of(anchor)
                .map_or(self.order.len(), |at| at + 1),
            RowPosition::Before(anchor) => self.position_of(anchor).unwrap_or(0),
        };
        self.order.insert(at, handle);
    }

    fn detach(&mut self, handle: RowHandle) {
        if let Some(current) = self.position_of(handle) {
            self.order.remove(current);
        }
    }

    fn destroy(&mut self, handle: RowHandle) {
        self.detach(handle);
        self.rows.remove(&handle);
    }

    fn decorate(&mut self, handle: RowHandle, _node: &TreeNode<Id>, selected: bool) {
        if let Some(row) = self.rows.get_mut(&handle) {
            row.selected = selected;
        }
    }

    fn measure(&self, handle: RowHandle) -> Option<u32> {
        let row = self.rows.get(&handle)?;
        self.heights.get(&row.id).copied()
    }
}
