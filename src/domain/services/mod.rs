//! Pure domain services: hashing, jitter, layout and compositing.

mod compositor;
mod fingerprint;
mod jitter_rng;
mod layout;

pub use compositor::{
    CompositorSettings, DEFAULT_DELAY_CS, DEFAULT_FRAMES, DEFAULT_SHAKE, FrameCompositor,
};
pub use fingerprint::Fnv1a64;
pub use jitter_rng::JitterRng;
pub use layout::{Anchor, caption_anchor};
