mod canvas;
mod context;
mod debug;
mod deferred;
mod error;
mod mask;
mod metrics;
mod region;
mod repeating;
mod translate;
mod types;

pub use canvas::{Canvas, Command, Document, Page};
pub use context::{LayoutContext, LayoutContextBuilder};
pub use deferred::{Action, DeferredRegion};
pub use error::LayoutError;
pub use mask::{MaskField, StateGuard};
pub use metrics::{DocumentMetrics, PageMetrics};
pub use region::{Region, RegionOptions};
pub use repeating::RepeatingSlot;
pub use translate::{Direction, translate};
pub use types::{Margins, Point, Pt, Size};
