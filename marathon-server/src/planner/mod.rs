//! Movie marathon planner.
//!
//! Answers: "Given these films showing around this theater today, in what
//! order can I watch as many of them as possible?"
//!
//! The enumerator walks every feasible ordering of the requested titles
//! under window, buffer, travel and break constraints, keeping only
//! maximal itineraries. The ranker scores those and picks a short, varied
//! slate, and the conflict reporter explains what each pick leaves out.

mod config;
mod conflict;
mod enumerate;
mod rank;
mod search;

pub use config::{
    BREAK_RANGE, BUFFER_RANGE, FUDGE_MINS, GAP_CAP_RANGE, ParamError, SearchParams, TimeWindow,
    UNLIMITED_SPACING_MINS,
};
pub use conflict::{MissingReason, explain_missing, missing_reason};
pub use enumerate::{Enumeration, Enumerator, enumerate_itineraries};
pub use rank::{MAX_OPTIONS, Metrics, RankedItinerary, Rationale, rank_and_select};
pub use search::{NO_SCHEDULES, PlanOption, PlanResult, Planner, SearchError, SearchRequest};
