pub mod alert;
pub mod health_map;
pub mod imagery;
pub mod reading;
pub mod source;
pub mod stats;
pub mod stress;

pub use alert::*;
pub use health_map::*;
pub use imagery::*;
pub use reading::*;
pub use source::*;
pub use stats::*;
pub use stress::*;
