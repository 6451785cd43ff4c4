//! Styled output pipeline.
//!
//! Everything between the decoded event stream and the screen:
//!
//! - **color**: color values, the 16-entry palette, baseline-aware resolution
//! - **link**: action-link destinations and the payload codec
//! - **fragment**: the output event / text fragment data model
//! - **styled**: fragment → styled run rendering
//! - **document**: the line assembler with deferred breaks
//!
//! # Data flow
//!
//! ```text
//! OutputEvent ──▶ Document::apply
//!                 ├── Text      ──▶ render_fragment ──▶ StyledRun
//!                 │                  ├── resolve (palette)
//!                 │                  └── encode_action (links)
//!                 ├── LineBreak ──▶ deferred-break state machine
//!                 └── Effect    ──▶ bell signal / dropped
//! ```

pub mod color;
pub mod document;
pub mod fragment;
pub mod link;
pub mod styled;

pub use color::{ColorRole, ColorValue, Palette, RgbColor};
pub use document::{Applied, Document, Line};
pub use fragment::{EffectFragment, OutputEvent, StyleFlags, TextFragment};
pub use link::{decode_action, encode_action, Link, SendTo};
pub use styled::{render_fragment, RunLink, StyledRun};
