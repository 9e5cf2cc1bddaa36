//! Interaction engine for a chip input control.
//!
//! The host owns the chip sequence and the rendering; this crate owns the
//! event-to-mutation logic: committing typed or pasted text into chips,
//! navigating and editing at an insertion gap among existing chips, and
//! showing debounced asynchronous suggestions. See [`ChipComposer`] for the
//! event surface.

mod buffer;
mod composer;
mod config;
mod popup;
mod scroll_state;

pub use buffer::InputBuffer;
pub use composer::ChipComposer;
pub use composer::ChipsUpdate;
pub use config::ChipConfig;
pub use config::FormatFn;
pub use config::SearchErrorHook;
