pub mod io;
pub mod recording;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use io::*;
pub use recording::*;
