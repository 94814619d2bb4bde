mod diagnostics;
mod game;
mod post;
mod standings;
mod team;

pub use diagnostics::*;
pub use game::*;
pub use post::*;
pub use standings::*;
pub use team::*;
