//! Embedding provider implementations.
//!
//! | Provider | Module | `EMBEDDING_PROVIDER` |
//! |---|---|---|
//! | Google Generative AI | [`google`] | `"google"` |
//! | Sentence Transformers (local, feature `local-embeddings`) | `sentence_transformer` | `"local"` |

pub mod google;
#[cfg(feature = "local-embeddings")]
pub mod sentence_transformer;
