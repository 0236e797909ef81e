mod bootstrap;
mod prompt;
mod store;

pub use bootstrap::load_map;
pub use prompt::{LinePrompt, TokenPrompt};
#[cfg(test)]
pub use store::MemoryTokenStore;
pub use store::{FileTokenStore, TokenStore, TokenStoreError};
