use crate::canvas::{Canvas, Document};
use crate::debug::{DebugLogger, json_str};
use crate::deferred::DeferredRegion;
use crate::error::LayoutError;
use crate::mask::MaskField;
use crate::metrics::{DocumentMetrics, PageMetrics};
use crate::region::{Region, RegionOptions};
use crate::translate::{Direction, translate};
use crate::types::{Margins, Point, Pt, Size};
use std::path::PathBuf;

/// Shared writing state of a document: the active region, the cursor and the page.
///
/// The cursor (`y`) is an absolute page coordinate; [`LayoutContext::cursor`] gives it
/// relative to the bottom of the active region.
pub struct LayoutContext {
    pub(crate) bounds: Region,
    pub(crate) y: Pt,
    page_size: Size,
    margins: Margins,
    margin_box: Region,
    page_number: usize,
    pub(crate) header: Option<DeferredRegion>,
    pub(crate) footer: Option<DeferredRegion>,
    canvas: Canvas,
    debug: Option<DebugLogger>,
    metrics: DocumentMetrics,
    page_activations: usize,
}

#[derive(Clone)]
pub struct LayoutContextBuilder {
    page_size: Size,
    margins: Margins,
    font_size: f32,
    debug_path: Option<PathBuf>,
}

impl LayoutContext {
    pub fn builder() -> LayoutContextBuilder {
        LayoutContextBuilder::new()
    }

    pub fn bounds(&self) -> &Region {
        &self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Region) {
        self.bounds = bounds;
    }

    /// Absolute vertical write position.
    pub fn y(&self) -> Pt {
        self.y
    }

    pub fn set_y(&mut self, y: Pt) {
        self.y = y;
    }

    /// Write position measured from the bottom of the active region.
    pub fn cursor(&self) -> Pt {
        self.y - self.bounds.absolute_bottom()
    }

    pub fn move_down(&mut self, amount: f32) {
        self.y -= Pt::from_f32(amount);
    }

    pub fn page_size(&self) -> Size {
        self.page_size
    }

    pub fn margins(&self) -> Margins {
        self.margins
    }

    pub fn margin_box(&self) -> &Region {
        &self.margin_box
    }

    pub fn page_number(&self) -> usize {
        self.page_number
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn translate(&self, point: Point, direction: Direction) -> Point {
        translate(&self.bounds, point, direction)
    }

    /// Finishes the current page and opens the next one, then activates the bound
    /// header and footer once each.
    pub fn start_new_page(&mut self) -> Result<(), LayoutError> {
        self.finish_page();
        self.canvas.show_page();
        self.page_number += 1;
        self.begin_page();

        if let Some(header) = self.header.clone() {
            header.activate(self)?;
        }
        if let Some(footer) = self.footer.clone() {
            footer.activate(self)?;
        }
        Ok(())
    }

    fn begin_page(&mut self) {
        self.bounds = self.margin_box;
        self.y = self.margin_box.absolute_top();
        self.page_activations = 0;
        self.log_event("page.start", &[("page", self.page_number.to_string())]);
    }

    fn finish_page(&mut self) {
        self.metrics.record_page(PageMetrics {
            page_number: self.page_number,
            command_count: self.canvas.current_command_count(),
            activation_count: self.page_activations,
        });
    }

    pub(crate) fn note_activation(&mut self) {
        self.page_activations += 1;
    }

    pub(crate) fn log_event(&self, kind: &str, fields: &[(&str, String)]) {
        if let Some(logger) = &self.debug {
            logger.event(kind, fields);
        }
    }

    /// Runs `body` inside a region entered right away at `top_left` (relative to the
    /// active region).
    ///
    /// With an explicit height the cursor ends at the region's bottom edge. Without one
    /// the region reaches down to the parent's bottom and the cursor stays where `body`
    /// left it.
    pub fn region<F>(
        &mut self,
        top_left: Point,
        options: RegionOptions,
        body: F,
    ) -> Result<(), LayoutError>
    where
        F: FnOnce(&mut LayoutContext) -> Result<(), LayoutError>,
    {
        let anchor = self.translate(top_left, Direction::ToAbsolute);
        let width = options.width.unwrap_or(self.bounds.width());
        let height = options
            .height
            .unwrap_or(anchor.y - self.bounds.absolute_bottom());
        let entered = Region::new(anchor, width, height)?;
        self.log_event(
            "region.enter",
            &[
                ("x", entered.absolute_left().to_string()),
                ("y", entered.absolute_top().to_string()),
                ("width", width.to_string()),
                ("height", height.to_string()),
            ],
        );

        self.mask(&[MaskField::Bounds], |ctx| {
            ctx.bounds = entered;
            ctx.y = entered.absolute_top();
            body(ctx)?;
            if options.height.is_some() {
                ctx.y = entered.absolute_bottom();
            }
            Ok(())
        })
    }

    /// Runs `body` right away in the active region shrunk by `margin` on every side.
    pub fn padded_region<F>(&mut self, margin: f32, body: F) -> Result<(), LayoutError>
    where
        F: FnOnce(&mut LayoutContext) -> Result<(), LayoutError>,
    {
        let margin = Pt::from_f32(margin);
        if margin < Pt::ZERO {
            return Err(LayoutError::Geometry(format!(
                "padding must not be negative (got {}pt)",
                margin
            )));
        }
        let width = self.bounds.width() - margin * 2;
        let height = self.bounds.height() - margin * 2;
        if !width.is_positive() || !height.is_positive() {
            return Err(LayoutError::Geometry(format!(
                "padding {}pt leaves no room in a {}x{}pt region",
                margin,
                self.bounds.width(),
                self.bounds.height()
            )));
        }
        let top_left = Point::from_pt(
            self.bounds.left() + margin,
            self.bounds.top() - margin,
        );
        let options = RegionOptions {
            width: Some(width),
            height: Some(height),
        };
        self.region(top_left, options, body)
    }

    /// Builds a deferred region at `origin` and binds `action` to it without running it.
    pub fn lazy_region<F>(
        &self,
        origin: Point,
        options: RegionOptions,
        action: F,
    ) -> Result<DeferredRegion, LayoutError>
    where
        F: Fn(&mut LayoutContext) -> Result<(), LayoutError> + Send + Sync + 'static,
    {
        let mut region = DeferredRegion::new(self, origin, options)?;
        region.bind_action(action);
        Ok(region)
    }

    /// Draws one line at the cursor, flush with the left edge of the active region,
    /// and moves the cursor below it.
    pub fn text(&mut self, text: impl Into<String>) {
        let line_height = self.canvas.font_size();
        let baseline = self.y - line_height;
        self.canvas
            .draw_string(self.bounds.absolute_left(), baseline, text);
        self.y = baseline;
    }

    /// `at` is relative to the active region.
    pub fn draw_text_at(&mut self, text: impl Into<String>, at: Point) {
        let at = self.translate(at, Direction::ToAbsolute);
        self.canvas.draw_string(at.x, at.y, text);
    }

    pub fn set_font_size(&mut self, size: f32) {
        self.canvas.set_font_size(Pt::from_f32(size));
    }

    /// Applies to later strokes on the current page; negative widths clamp to zero.
    pub fn set_line_width(&mut self, width: f32) {
        self.canvas.set_line_width(Pt::from_f32(width));
    }

    pub fn stroke_bounds(&mut self) {
        let bounds = self.bounds;
        self.canvas.draw_rect(
            bounds.absolute_left(),
            bounds.absolute_bottom(),
            bounds.width(),
            bounds.height(),
        );
        self.canvas.stroke();
    }

    pub fn finish(self) -> Document {
        self.finish_with_metrics().0
    }

    pub fn finish_with_metrics(mut self) -> (Document, DocumentMetrics) {
        self.finish_page();
        if let Some(logger) = self.debug.take() {
            logger.finish("layout");
        }
        (self.canvas.finish(), self.metrics)
    }
}

impl LayoutContextBuilder {
    pub fn new() -> Self {
        Self {
            page_size: Size::a4(),
            margins: Margins::all(36.0),
            font_size: 12.0,
            debug_path: None,
        }
    }

    pub fn page_size(mut self, size: Size) -> Self {
        self.page_size = size;
        self
    }

    pub fn margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    pub fn margin_all(mut self, value: f32) -> Self {
        self.margins = Margins::all(value);
        self
    }

    /// Also the line height used by [`LayoutContext::text`].
    pub fn font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    /// JSON-lines event log; counters are summarized when the context is finished.
    pub fn debug_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.debug_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<LayoutContext, LayoutError> {
        if !self.page_size.width.is_positive() || !self.page_size.height.is_positive() {
            return Err(LayoutError::InvalidConfiguration(format!(
                "page_size must be positive (got {}x{}pt)",
                self.page_size.width, self.page_size.height
            )));
        }
        if self.margins.any_negative() {
            return Err(LayoutError::InvalidConfiguration(
                "margins must not be negative".to_string(),
            ));
        }
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(LayoutError::InvalidConfiguration(format!(
                "font_size must be > 0 (got {})",
                self.font_size
            )));
        }
        let margins = self.margins;
        let width = self.page_size.width - margins.left - margins.right;
        let height = self.page_size.height - margins.top - margins.bottom;
        let margin_box = Region::new(
            Point::from_pt(margins.left, self.page_size.height - margins.top),
            width,
            height,
        )
        .map_err(|_| {
            LayoutError::InvalidConfiguration(format!(
                "margins leave no content area on a {}x{}pt page",
                self.page_size.width, self.page_size.height
            ))
        })?;
        let debug = match self.debug_path {
            Some(path) => Some(DebugLogger::new(path)?),
            None => None,
        };

        let mut ctx = LayoutContext {
            bounds: margin_box,
            y: margin_box.absolute_top(),
            page_size: self.page_size,
            margins,
            margin_box,
            page_number: 1,
            header: None,
            footer: None,
            canvas: Canvas::new(self.page_size, Pt::from_f32(self.font_size)),
            debug,
            metrics: DocumentMetrics::default(),
            page_activations: 0,
        };
        let page_size = format!("{}x{}", self.page_size.width, self.page_size.height);
        ctx.log_event("layout.config", &[("page_size", json_str(&page_size))]);
        ctx.begin_page();
        Ok(ctx)
    }
}

impl Default for LayoutContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
