pub mod dispatch;
pub mod stage0_ingest;
pub mod stage1_reconstruct;
pub mod stage2_aspects;
pub mod stage3_sentiment;
pub mod stage4_render;

pub use dispatch::*;
pub use stage0_ingest::*;
pub use stage1_reconstruct::*;
pub use stage2_aspects::*;
pub use stage3_sentiment::*;
pub use stage4_render::*;
