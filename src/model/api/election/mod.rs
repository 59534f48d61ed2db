mod spec;
mod view;

pub use spec::{CandidateUpdate, ElectionSpec};
pub use view::{
    CreatedView, ElectionData, JoinView, MutationView, RetrieveView, VirtualJoinView,
    VirtualRetrieveView,
};
