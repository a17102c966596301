pub mod hit;
pub mod overlay;

pub use hit::{OverlayHit, hit_test, hit_test_box};
pub use overlay::{
    Affordance, AffordanceButton, GhostKind, OverlayBox, OverlayFrame, OverlayGhost,
    OverlayInput, OverlayTheme, render_overlay,
};

// Re-export kurbo so downstream crates don't need a direct dependency
pub use kurbo;
