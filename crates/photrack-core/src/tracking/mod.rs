pub mod objects;
pub mod reacquire;
pub mod session;

pub use objects::{hypothesis_rounds, round_seeds, TrackedObject};
pub use reacquire::{
    measure_frame, measure_pass, FrameOutcome, HypothesisCursor, MeasurementStatus,
    ObjectMeasurement, TrackVerdict,
};
pub use session::TrackingSession;
