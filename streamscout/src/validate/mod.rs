//! Link validation and ranking.
//!
//! Every extraction ends here: candidates are deduplicated, unsafe URLs are
//! dropped, survivors are annotated with kind and quality and sorted best
//! first.

mod checks;
mod quality;
mod validator;

pub use checks::{
    check_candidate_url, has_injection_marker, is_private_host, is_web_scheme, RejectReason,
    INJECTION_MARKERS,
};
pub use quality::{detect_format, detect_kind, detect_quality};
pub use validator::{validate_and_rank, LinkValidator};
