pub mod decode;
pub mod fetch;
pub mod health;
pub mod pipeline;
pub mod serve;
pub mod upload;

pub use decode::Decode;
pub use fetch::Fetch;
pub use health::Health;
pub use pipeline::Pipeline;
pub use serve::Serve;
pub use upload::Upload;
