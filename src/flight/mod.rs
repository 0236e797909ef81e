mod sequencer;
mod status;

pub use sequencer::{FlightSequencer, SequencerCommand};
pub use status::Status;
