pub mod format;
pub mod keywords;
pub mod link;
pub mod pipeline;
pub mod summary;
pub mod transcript;
pub mod wordcloud;

pub use format::*;
pub use keywords::*;
pub use link::*;
pub use pipeline::*;
pub use summary::*;
pub use transcript::*;
pub use wordcloud::*;
