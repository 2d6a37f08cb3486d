//! pistatus: feeds an i3bar-protocol status line from background samplers
//! and per-frame widgets.

pub mod config;
pub mod render;
pub mod sampler;
pub mod scheduler;
pub mod state;
pub mod stream;
pub mod types;
pub mod widgets;
