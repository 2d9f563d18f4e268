use crate::context::LayoutContext;
use crate::region::Region;
use crate::types::Pt;
use std::ops::{Deref, DerefMut};

/// Context fields a [`StateGuard`] can snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskField {
    Bounds,
    Cursor,
}

#[derive(Debug, Clone, Copy, Default)]
struct Snapshot {
    bounds: Option<Region>,
    y: Option<Pt>,
}

/// Restores the masked fields when dropped, whether the scope returned, bailed out
/// with `?` or unwound.
pub struct StateGuard<'a> {
    ctx: &'a mut LayoutContext,
    saved: Snapshot,
}

impl<'a> StateGuard<'a> {
    pub fn new(ctx: &'a mut LayoutContext, fields: &[MaskField]) -> Self {
        let mut saved = Snapshot::default();
        for field in fields {
            match field {
                MaskField::Bounds => saved.bounds = Some(ctx.bounds),
                MaskField::Cursor => saved.y = Some(ctx.y),
            }
        }
        Self { ctx, saved }
    }
}

impl Deref for StateGuard<'_> {
    type Target = LayoutContext;

    fn deref(&self) -> &LayoutContext {
        self.ctx
    }
}

impl DerefMut for StateGuard<'_> {
    fn deref_mut(&mut self) -> &mut LayoutContext {
        self.ctx
    }
}

impl Drop for StateGuard<'_> {
    fn drop(&mut self) {
        if let Some(bounds) = self.saved.bounds {
            self.ctx.bounds = bounds;
        }
        if let Some(y) = self.saved.y {
            self.ctx.y = y;
        }
    }
}

impl LayoutContext {
    /// Runs `body` with the listed fields saved, then puts them back on every exit path.
    pub fn mask<T, E, F>(&mut self, fields: &[MaskField], body: F) -> Result<T, E>
    where
        F: FnOnce(&mut LayoutContext) -> Result<T, E>,
    {
        let mut guard = StateGuard::new(self, fields);
        body(&mut *guard)
    }
}
