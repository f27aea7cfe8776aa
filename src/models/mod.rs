mod location;

pub use location::{Fix, LocationRecord, TrackUpdate};
