pub mod activity;
pub mod report;

pub use activity::{ActivityRecord, AthleteProfile};
pub use report::{AnalysisReport, AthleteInfo, FormStatus, Highlights, Period, Summary};
