pub use self::{eye_frame::*, session::*, spawner::*};

pub(crate) mod eye_frame;
pub(crate) mod session;
pub(crate) mod spawner;
