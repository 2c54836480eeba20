//! Device-independent 2D vector graphics for map-style plotting.
//!
//! The crate is split along the classic plotting pipeline:
//!
//! - [`types`] and [`color`] hold the small value types everything else
//!   moves around: points, rectangular limits, and colors with a
//!   forgiving text mini-language.
//! - [`shape`] is the geometry model, a tagged [`shape::Shape`] enum of
//!   points, arcs, polylines, polygons and multipoints, each tracking
//!   its own bounding box and display flags.
//! - [`symbol`] and [`legend`] classify data values into colors:
//!   single-symbol, unique-value, class-breaks, and scaled renderings.
//! - [`device`] is the output layer. A [`device::Device`] owns a set of
//!   [`area::DrawingArea`]s (world-to-device coordinate mappings) over a
//!   [`device::Surface`] backend: an interactive double-buffered raster
//!   surface or a PostScript emitter.
//!
//! A minimal session maps data coordinates through a drawing area and
//! stroke-paints onto whichever backend is attached:
//!
//! ```no_run
//! use grist::area::DrawingArea;
//! use grist::color::parse_color;
//! use grist::device::{CloseMode, Device, Orientation, PageSize};
//! use grist::types::Limits;
//!
//! # fn main() -> Result<(), grist::errors::DeviceError> {
//! let mut dev = Device::create_postscript("plot.ps", PageSize::A, Orientation::Portrait)?;
//! let area = dev.add_drawing_area(DrawingArea::new(
//!     "main",
//!     Limits::new(72.0, 72.0, 540.0, 720.0),
//!     Limits::new(0.0, 0.0, 100.0, 100.0),
//! ));
//! let mut ctx = dev.area_ctx(area);
//! ctx.set_color(parse_color("Orange"));
//! let a = ctx.area().to_device(grist::types::GrPoint::new(0.0, 0.0));
//! let b = ctx.area().to_device(grist::types::GrPoint::new(100.0, 100.0));
//! ctx.draw_line(a.x, a.y, b.x, b.y);
//! dev.plot_end(CloseMode::Hard)?;
//! # Ok(())
//! # }
//! ```

pub mod anchor;
pub mod area;
pub mod color;
pub mod device;
pub mod errors;
pub mod legend;
pub mod log;
pub mod shape;
pub mod symbol;
pub mod types;

pub use anchor::TextAnchor;
pub use area::DrawingArea;
pub use color::{GrColor, parse_color};
pub use device::{AreaId, CloseMode, Device, Orientation, PageSize, Surface};
pub use device::postscript::PsSurface;
pub use device::raster::RasterSurface;
pub use errors::DeviceError;
pub use legend::Legend;
pub use shape::{Shape, ShapeList, ShapeOps};
pub use symbol::{ClassificationKind, Symbol, SymbolKind, SymbolStyle};
pub use types::{GrPoint, GrPointZm, Limits};
