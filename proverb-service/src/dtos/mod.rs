pub mod proverbs;

pub use proverbs::{
    CreateProverbRequest, MessageResponse, ProverbJson, ProverbResponse, UpdateProverbRequest,
};
