pub mod render;
pub mod rewrite;
pub mod storage;

pub use render::{HttpRenderer, RenderError, RenderRequest, Renderer};
pub use rewrite::{CompletionClient, OpenAiClient, Rewriter};
pub use storage::{FileStorage, StorageError, StoredFile};
