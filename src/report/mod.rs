pub mod formatter;
pub mod waterfall;

pub use formatter::SummaryFormatter;
pub use waterfall::{StepKind, WaterfallStep, waterfall};
