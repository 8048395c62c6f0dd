pub mod zipfile;

#[cfg(feature = "sevenz")]
pub mod sevenz;

pub use zipfile::ZipSession;

#[cfg(feature = "sevenz")]
pub use sevenz::SevenZSession;
