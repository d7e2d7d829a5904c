pub mod handlers;
pub mod mime;
mod path_utils;

#[cfg(test)]
mod fixture;

pub use handlers::StaticAssetResponder;
