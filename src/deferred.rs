use crate::context::LayoutContext;
use crate::debug::json_str;
use crate::error::LayoutError;
use crate::mask::MaskField;
use crate::region::{Region, RegionOptions};
use crate::translate::Direction;
use crate::types::{Point, Pt};
use std::fmt;
use std::sync::Arc;

pub type Action = Arc<dyn Fn(&mut LayoutContext) -> Result<(), LayoutError> + Send + Sync>;

/// A region whose geometry is fixed at construction and whose content is drawn on
/// demand by [`DeferredRegion::activate`].
///
/// Cloning is cheap and shares the bound action.
#[derive(Clone)]
pub struct DeferredRegion {
    region: Region,
    action: Option<Action>,
}

impl DeferredRegion {
    /// `origin` is the top-left corner relative to the context's active region. It is
    /// resolved to page coordinates now, so later changes to the active region do not
    /// move this region. Unset sizes default to the active region's.
    pub fn new(
        ctx: &LayoutContext,
        origin: Point,
        options: RegionOptions,
    ) -> Result<Self, LayoutError> {
        let parent = ctx.bounds();
        let (width, height) = options.resolve(parent.width(), parent.height());
        Self::anchored(ctx, origin, width, height)
    }

    pub(crate) fn anchored(
        ctx: &LayoutContext,
        origin: Point,
        width: Pt,
        height: Pt,
    ) -> Result<Self, LayoutError> {
        let anchor = ctx.translate(origin, Direction::ToAbsolute);
        Ok(Self {
            region: Region::new(anchor, width, height)?,
            action: None,
        })
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    /// Replaces any previously bound action. Nothing runs until activation.
    pub fn bind_action<F>(&mut self, action: F)
    where
        F: Fn(&mut LayoutContext) -> Result<(), LayoutError> + Send + Sync + 'static,
    {
        self.action = Some(Arc::new(action));
    }

    /// Runs the bound action with this region active and the cursor at its top.
    ///
    /// The context's active region and cursor are put back before this returns, also
    /// when the action fails or panics. Activations nest.
    pub fn activate(&self, ctx: &mut LayoutContext) -> Result<(), LayoutError> {
        let Some(action) = self.action.as_ref() else {
            return Err(LayoutError::NoActionBound);
        };
        let region = self.region;
        ctx.note_activation();
        ctx.log_event(
            "region.activate",
            &[
                ("x", region.absolute_left().to_string()),
                ("y", region.absolute_top().to_string()),
                ("page", ctx.page_number().to_string()),
            ],
        );

        let result = ctx.mask(&[MaskField::Bounds, MaskField::Cursor], |ctx| {
            ctx.bounds = region;
            ctx.y = region.absolute_top();
            action(ctx)
        });
        match &result {
            Ok(()) => ctx.log_event("region.restore", &[]),
            Err(err) => ctx.log_event(
                "region.activate_failed",
                &[("error", json_str(&err.to_string()))],
            ),
        }
        result
    }
}

impl fmt::Debug for DeferredRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredRegion")
            .field("region", &self.region)
            .field("has_action", &self.has_action())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Size;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn letter() -> LayoutContext {
        LayoutContext::builder()
            .page_size(Size::letter())
            .margin_all(36.0)
            .build()
            .expect("context")
    }

    fn top_recorder(
        log: Arc<Mutex<Vec<Pt>>>,
    ) -> impl Fn(&mut LayoutContext) -> Result<(), LayoutError> + Send + Sync + 'static {
        move |ctx: &mut LayoutContext| {
            log.lock().expect("log").push(ctx.bounds().absolute_top());
            Ok(())
        }
    }

    #[test]
    fn activate_without_action_fails_and_leaves_context_alone() {
        let mut ctx = letter();
        let region = DeferredRegion::new(&ctx, Point::new(0.0, 100.0), RegionOptions::new())
            .expect("region");
        let bounds = *ctx.bounds();
        let y = ctx.y();
        let err = region.activate(&mut ctx).expect_err("unbound action");
        assert!(matches!(err, LayoutError::NoActionBound));
        assert_eq!(*ctx.bounds(), bounds);
        assert_eq!(ctx.y(), y);
    }

    #[test]
    fn binding_does_not_run_and_rebinding_replaces() {
        let mut ctx = letter();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let mut region =
            DeferredRegion::new(&ctx, Point::new(0.0, 100.0), RegionOptions::sized(10.0, 10.0))
                .expect("region");
        let counter = Arc::clone(&first);
        region.bind_action(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let counter = Arc::clone(&second);
        region.bind_action(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        assert_eq!(second.load(Ordering::SeqCst), 0);

        region.activate(&mut ctx).expect("activate");
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn anchor_is_fixed_at_construction() {
        let mut ctx = letter();
        let log = Arc::new(Mutex::new(Vec::new()));
        let region = ctx
            .lazy_region(
                Point::new(72.0, 720.0),
                RegionOptions::sized(200.0, 50.0),
                top_recorder(Arc::clone(&log)),
            )
            .expect("lazy region");
        // Margin box bottom-left is (36, 36).
        assert_eq!(region.region().absolute_left(), Pt::from_f32(108.0));
        assert_eq!(region.region().absolute_top(), Pt::from_f32(756.0));

        ctx.region(Point::new(100.0, 300.0), RegionOptions::sized(100.0, 100.0), |ctx| {
            region.activate(ctx)
        })
        .expect("activate inside another region");
        assert_eq!(*log.lock().expect("log"), vec![Pt::from_f32(756.0)]);
    }

    #[test]
    fn repeated_activation_is_deterministic() {
        let mut ctx = letter();
        let log = Arc::new(Mutex::new(Vec::new()));
        let region = ctx
            .lazy_region(
                Point::new(72.0, 720.0),
                RegionOptions::sized(200.0, 50.0),
                top_recorder(Arc::clone(&log)),
            )
            .expect("lazy region");

        for _ in 0..3 {
            ctx.set_y(Pt::from_f32(300.0));
            region.activate(&mut ctx).expect("activate");
            assert_eq!(ctx.y(), Pt::from_f32(300.0));
        }
        let log = log.lock().expect("log");
        assert_eq!(log.len(), 3);
        assert!(log.iter().all(|top| *top == region.region().absolute_top()));
    }

    #[test]
    fn action_sees_region_and_cursor_at_top() {
        let mut ctx = letter();
        let seen = Arc::new(Mutex::new(None));
        let record = Arc::clone(&seen);
        let region = ctx
            .lazy_region(Point::new(0.0, 50.0), RegionOptions::sized(100.0, 20.0), move |ctx| {
                *record.lock().expect("seen") = Some((*ctx.bounds(), ctx.y(), ctx.cursor()));
                ctx.text("footer");
                Ok(())
            })
            .expect("lazy region");
        ctx.move_down(500.0);
        region.activate(&mut ctx).expect("activate");

        let (bounds, y, cursor) = seen.lock().expect("seen").expect("action ran");
        assert_eq!(bounds, *region.region());
        assert_eq!(y, Pt::from_f32(86.0));
        assert_eq!(cursor, Pt::from_f32(20.0));
        assert_eq!(ctx.y(), Pt::from_f32(256.0));
    }

    #[test]
    fn failing_action_restores_then_propagates() {
        let mut ctx = letter();
        let region = ctx
            .lazy_region(Point::new(0.0, 100.0), RegionOptions::new(), |ctx| {
                ctx.move_down(10.0);
                Err(LayoutError::Action("render failed".to_string()))
            })
            .expect("lazy region");
        ctx.set_y(Pt::from_f32(123.0));
        let bounds = *ctx.bounds();
        let err = region.activate(&mut ctx).expect_err("should fail");
        assert!(matches!(err, LayoutError::Action(ref m) if m == "render failed"));
        assert_eq!(*ctx.bounds(), bounds);
        assert_eq!(ctx.y(), Pt::from_f32(123.0));
    }

    #[test]
    fn panicking_action_restores_state() {
        let mut ctx = letter();
        let region = ctx
            .lazy_region(Point::new(0.0, 100.0), RegionOptions::new(), |ctx| {
                ctx.move_down(10.0);
                panic!("action panicked");
            })
            .expect("lazy region");
        let bounds = *ctx.bounds();
        let y = ctx.y();
        let result = catch_unwind(AssertUnwindSafe(|| region.activate(&mut ctx)));
        assert!(result.is_err());
        assert_eq!(*ctx.bounds(), bounds);
        assert_eq!(ctx.y(), y);
    }

    #[test]
    fn nested_activation_restores_in_lifo_order() {
        let mut ctx = letter();
        let trace: Arc<Mutex<Vec<(&'static str, Pt, Pt)>>> = Arc::new(Mutex::new(Vec::new()));

        let inner_trace = Arc::clone(&trace);
        let inner = ctx
            .lazy_region(Point::new(0.0, 200.0), RegionOptions::sized(50.0, 50.0), move |ctx| {
                ctx.move_down(5.0);
                inner_trace
                    .lock()
                    .expect("trace")
                    .push(("inner", ctx.bounds().absolute_top(), ctx.y()));
                Ok(())
            })
            .expect("inner");

        let outer_trace = Arc::clone(&trace);
        let outer = ctx
            .lazy_region(Point::new(0.0, 600.0), RegionOptions::sized(300.0, 300.0), move |ctx| {
                let before = (*ctx.bounds(), ctx.y());
                ctx.move_down(20.0);
                let mid = ctx.y();
                inner.activate(ctx)?;
                // Inner restore finished before control came back here.
                assert_eq!(*ctx.bounds(), before.0);
                assert_eq!(ctx.y(), mid);
                outer_trace
                    .lock()
                    .expect("trace")
                    .push(("outer", ctx.bounds().absolute_top(), ctx.y()));
                Ok(())
            })
            .expect("outer");

        let bounds = *ctx.bounds();
        let y = ctx.y();
        outer.activate(&mut ctx).expect("outer activate");
        assert_eq!(*ctx.bounds(), bounds);
        assert_eq!(ctx.y(), y);

        let trace = trace.lock().expect("trace");
        assert_eq!(
            *trace,
            vec![
                ("inner", Pt::from_f32(236.0), Pt::from_f32(231.0)),
                ("outer", Pt::from_f32(636.0), Pt::from_f32(616.0)),
            ]
        );
    }

    #[test]
    fn deep_failure_restores_every_level() {
        let mut ctx = letter();
        let innermost = ctx
            .lazy_region(Point::new(0.0, 100.0), RegionOptions::sized(10.0, 10.0), |_| {
                Err(LayoutError::Action("deep".to_string()))
            })
            .expect("innermost");
        let middle = ctx
            .lazy_region(Point::new(0.0, 300.0), RegionOptions::sized(20.0, 20.0), move |ctx| {
                ctx.move_down(1.0);
                innermost.activate(ctx)
            })
            .expect("middle");
        let outer = ctx
            .lazy_region(Point::new(0.0, 500.0), RegionOptions::sized(30.0, 30.0), move |ctx| {
                let y = ctx.y();
                let err = middle.activate(ctx).expect_err("middle fails");
                assert_eq!(ctx.y(), y);
                Err(err)
            })
            .expect("outer");

        let bounds = *ctx.bounds();
        let y = ctx.y();
        let err = outer.activate(&mut ctx).expect_err("outer fails");
        assert!(err.to_string().contains("deep"));
        assert_eq!(*ctx.bounds(), bounds);
        assert_eq!(ctx.y(), y);
    }
}
