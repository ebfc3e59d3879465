//! Domain types shared across the pipeline and the risk gate.

pub mod bar;
pub mod signal;
pub mod structure;

pub use bar::{PriceBar, PriceHistory};
pub use signal::{Analysis, CandidateSignal, NoSignalReason, SignalEvidence};
pub use structure::{Direction, OrderBlock, StructureBreak, SwingKind, SwingPoint};

/// Symbol type alias
pub type Symbol = String;
