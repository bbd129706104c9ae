pub mod proverb;

pub use proverb::{merge, Proverb, ProverbPatch};
