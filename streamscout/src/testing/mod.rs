//! Testing utilities for streamscout.
//!
//! This module provides:
//! - Scripted and never-resolving transports
//! - HTML fixtures for each extraction strategy
//! - Assertions over ranked results

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{
    assert_all_safe, assert_contains_url, assert_lacks_url, assert_ranked, assert_status,
};
pub use fixtures::{
    full_featured_page, hostile_page, iframe_with_nested_iframe, nested_iframe_page,
    page_with_player_iframe, plain_article_page, FIXTURE_IFRAME_URL, FIXTURE_NESTED_IFRAME_URL,
    FIXTURE_PAGE_URL,
};
pub use mocks::{html_response, status_response, PendingTransport, ScriptedTransport};
