//! Service layer for business logic
//!
//! The CLI and any other front end talk to these services only; none of them
//! know which record store backend sits underneath.

pub mod clicks;
pub mod codegen;
pub mod redirect;
pub mod registry;
pub mod shortener;
pub mod stats;

pub use clicks::{ClickId, ClickRecorder, DEFAULT_LOCATION, DEFAULT_SOURCE};
pub use codegen::{Allocation, AllocationPolicy, CodeSource, RandomCodes, allocate_code};
pub use redirect::{RedirectService, Resolution};
pub use registry::CodeRegistry;
pub use shortener::{BatchOutcome, FieldError, RequestField, ShortenRequest, Shortener};
pub use stats::{CodeClicks, LinkStats, LinkStatus, StatsService};
