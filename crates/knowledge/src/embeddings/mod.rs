//! Embedding capability.
//!
//! Text in, fixed-length vector out, normalized unless
//! `EmbeddingConfig::normalize` is off. Providers are deterministic
//! for equal input and are called at most once per text; failures surface
//! immediately as `AppError::Index`.

pub mod config;
pub mod provider;
pub mod providers;

pub use config::EmbeddingConfig;
pub use provider::{create_provider, EmbeddingProvider};

/// Scale a vector to unit length in place. Zero vectors are left alone.
pub fn normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}
