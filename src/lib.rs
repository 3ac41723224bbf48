//! The library code for `tagsieve`, the filtered post listing of a static
//! blog. The moving parts are:
//!
//! 1. Loading the post document once ([`crate::store`])
//! 2. Deriving the tag filter controls from it ([`crate::tag`])
//! 3. Holding the current query and active tag ([`crate::filter`])
//! 4. Regenerating the listing markup from those ([`crate::render`])
//!
//! [`crate::app::App`] owns all of that state and applies user
//! [`crate::app::Event`]s one at a time, re-rendering after each. The
//! light/dark preference ([`crate::theme`]) is independent of the listing and
//! only shares the page with it.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod app;
pub mod config;
pub mod filter;
pub mod logging;
pub mod post;
pub mod render;
pub mod store;
pub mod tag;
pub mod theme;
mod value;
