//! Error types with diagnostics using miette.
//!
//! Only resource-acquisition boundaries produce errors here. The rendering
//! hot path (point stores, font selection, color parsing) degrades silently
//! instead; see the module docs in `color` and `shape`.

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised by the rendering backends.
#[derive(Error, Diagnostic, Debug)]
pub enum DeviceError {
    /// The PostScript output file could not be created.
    #[error("cannot create output file `{path}`")]
    #[diagnostic(code(grist::device::create))]
    Create {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing buffered output to the underlying stream failed.
    #[error("write to device output failed")]
    #[diagnostic(code(grist::device::write))]
    Write(#[from] std::io::Error),

    /// The device output was already closed with a hard `plot_end`.
    #[error("device output is already closed")]
    #[diagnostic(
        code(grist::device::closed),
        help("plot_end(CloseMode::Hard) may only be issued once per device")
    )]
    Closed,

    /// An image save was requested before any off-screen buffer existed.
    #[error("no off-screen buffer has been set up")]
    #[diagnostic(
        code(grist::device::no_buffer),
        help("call setup_double_buffer before save_as_file")
    )]
    NoBuffer,

    /// The off-screen buffer could not be allocated.
    #[error("cannot allocate a {width}x{height} off-screen buffer")]
    #[diagnostic(code(grist::device::buffer_alloc))]
    BufferAlloc { width: u32, height: u32 },

    /// PNG or JPEG encoding failed.
    #[error("image encoding failed: {message}")]
    #[diagnostic(code(grist::device::encode))]
    Encode { message: String },

    /// The supplied font data could not be parsed.
    #[error("font data could not be parsed: {message}")]
    #[diagnostic(code(grist::device::font))]
    Font { message: String },
}
