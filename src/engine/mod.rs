pub mod classifier;
pub mod ranker;
pub mod sponsors;

pub use classifier::is_active;
pub use ranker::{rank, RankParams};
pub use sponsors::top_sponsors;
