use crate::context::LayoutContext;
use crate::debug::json_str;
use crate::deferred::DeferredRegion;
use crate::error::LayoutError;
use crate::region::RegionOptions;
use crate::types::Point;

/// Well-known slots activated once per page by [`LayoutContext::start_new_page`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatingSlot {
    Header,
    Footer,
}

impl RepeatingSlot {
    pub fn as_str(self) -> &'static str {
        match self {
            RepeatingSlot::Header => "header",
            RepeatingSlot::Footer => "footer",
        }
    }
}

impl LayoutContext {
    /// Anchors a deferred region at `top_left` (relative to the active region), binds
    /// `action` and stores it in `slot`, replacing the previous binding.
    ///
    /// Unset sizes default to the margin box.
    pub fn bind_repeating<F>(
        &mut self,
        slot: RepeatingSlot,
        top_left: Point,
        options: RegionOptions,
        action: F,
    ) -> Result<&DeferredRegion, LayoutError>
    where
        F: Fn(&mut LayoutContext) -> Result<(), LayoutError> + Send + Sync + 'static,
    {
        let margin_box = *self.margin_box();
        let (width, height) = options.resolve(margin_box.width(), margin_box.height());
        let mut region = DeferredRegion::anchored(self, top_left, width, height)?;
        region.bind_action(action);
        self.log_event(
            "repeating.bind",
            &[
                ("slot", json_str(slot.as_str())),
                ("x", region.region().absolute_left().to_string()),
                ("y", region.region().absolute_top().to_string()),
            ],
        );

        let stored = match slot {
            RepeatingSlot::Header => &mut self.header,
            RepeatingSlot::Footer => &mut self.footer,
        };
        let region: &DeferredRegion = stored.insert(region);
        Ok(region)
    }

    pub fn header<F>(
        &mut self,
        top_left: Point,
        options: RegionOptions,
        action: F,
    ) -> Result<&DeferredRegion, LayoutError>
    where
        F: Fn(&mut LayoutContext) -> Result<(), LayoutError> + Send + Sync + 'static,
    {
        self.bind_repeating(RepeatingSlot::Header, top_left, options, action)
    }

    pub fn footer<F>(
        &mut self,
        top_left: Point,
        options: RegionOptions,
        action: F,
    ) -> Result<&DeferredRegion, LayoutError>
    where
        F: Fn(&mut LayoutContext) -> Result<(), LayoutError> + Send + Sync + 'static,
    {
        self.bind_repeating(RepeatingSlot::Footer, top_left, options, action)
    }

    pub fn repeating(&self, slot: RepeatingSlot) -> Option<&DeferredRegion> {
        match slot {
            RepeatingSlot::Header => self.header.as_ref(),
            RepeatingSlot::Footer => self.footer.as_ref(),
        }
    }

    pub fn clear_repeating(&mut self, slot: RepeatingSlot) -> Option<DeferredRegion> {
        match slot {
            RepeatingSlot::Header => self.header.take(),
            RepeatingSlot::Footer => self.footer.take(),
        }
    }
}
