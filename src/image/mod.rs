pub mod buf;
pub mod depth;
pub mod io;
pub mod traits;

pub use self::buf::DepthImageBuf;
pub use self::depth::{DepthFrame, DepthImage};
pub use self::traits::{ImageView, Rows};
