mod device_handle;
mod lighting_handle;
mod socket_handle;

pub use device_handle::*;
pub use lighting_handle::*;
pub use socket_handle::*;
