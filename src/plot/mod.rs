//! Terminal plotting for one-shot commands.

pub mod ascii;

pub use ascii::render_ascii_bars;
