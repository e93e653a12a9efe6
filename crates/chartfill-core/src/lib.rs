#![forbid(unsafe_code)]

//! Chart descriptor model and normalization.
//!
//! A *descriptor* is the minimal chart shape a server emits: kind, title,
//! labels, datasets. [`normalize`] completes it into a full chart
//! configuration: default colors from the fixed [`PALETTE`], one fixed
//! options template, and a white canvas background plugin. Everything in
//! this crate is deterministic and side-effect free; rendering and page
//! hydration live in the `chartfill` facade crate.

pub mod builder;
pub mod descriptor;
pub mod error;
pub mod normalize;
pub mod options;
pub mod palette;

pub use descriptor::{ChartDescriptor, ChartKind, ChartPayload, ColorValue, Dataset, PluginSpec};
pub use error::{Error, Result};
pub use normalize::normalize;
pub use palette::{PALETTE, palette_color};
