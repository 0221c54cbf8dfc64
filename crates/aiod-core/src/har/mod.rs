//! HAR (HTTP Archive) import: the other request format browsers export.
//!
//! Devtools can save the whole network log instead of a single cURL
//! command; this picks the media request out of it and produces the same
//! [`RequestDescriptor`](crate::request::RequestDescriptor) the paste parser
//! does.

mod parse;
mod resolve;

pub use resolve::resolve_har;
