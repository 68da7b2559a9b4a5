pub mod scripted;
pub mod segment;
pub mod session;

pub use scripted::ScriptedSource;
pub use segment::{CaptureRecord, Segment};
pub use session::{CaptureError, CaptureEvent, CaptureSession, CaptureState, SessionError};
