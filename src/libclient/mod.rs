pub mod camera;
#[cfg(feature = "gui")]
pub mod drawing;
pub mod state;
pub mod surface;
