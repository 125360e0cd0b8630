//! Host-page runtime of the Chattlin chat widget.
//!
//! This crate owns everything that happens on the page embedding the widget:
//! creating the widget frame, drawing the launcher bubble, persisting the
//! conversation cookie and relaying messages to and from the frame.
//!
//! The browser is reached only through three ports so the logic stays
//! testable off-browser and free of any runtime dependency:
//! - [`dom::Document`] for element creation, classes, styles and listeners
//! - [`session::CookieJar`] for `document.cookie`
//! - [`relay::FrameTransport`] for posting strings into the frame
//!
//! `chattlin-sdk` implements the ports over `web-sys`; [`dom::MemoryDocument`],
//! [`session::MemoryCookieJar`] and [`relay::RecordingTransport`] implement
//! them in memory.

pub mod bubble;
pub mod controller;
pub mod dom;
pub mod relay;
pub mod scroll;
pub mod session;
pub mod viewport;

pub use controller::{LifecycleState, WidgetController, WidgetRuntime};
