//! Shared test helpers.

use docsim::application::ingest::DuplicatePolicy;
use docsim::domain::error::DomainError;
use docsim::domain::ports::embedding_port::{EmbeddingProvider, InputType};
use docsim::DocSim;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const DIM: usize = 8;

/// Deterministic embedding provider with call counting and failure
/// injection, so tests can assert exactly when the embedder is consulted.
pub struct MockProvider {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    embed_calls: usize,
    fail: bool,
    zero_vectors: bool,
    delay: Option<Duration>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Every embed call fails.
    pub fn failing(self) -> Self {
        self.state.lock().unwrap().fail = true;
        self
    }

    /// Every embed call yields zero-magnitude vectors.
    pub fn zero_vectors(self) -> Self {
        self.state.lock().unwrap().zero_vectors = true;
        self
    }

    /// Sleep inside embed, to widen race windows in concurrency tests.
    pub fn with_delay(self, delay: Duration) -> Self {
        self.state.lock().unwrap().delay = Some(delay);
        self
    }

    pub fn embed_calls(&self) -> usize {
        self.state.lock().unwrap().embed_calls
    }
}

pub fn vectorize(text: &str) -> Vec<f32> {
    let mut v = vec![0.0_f32; DIM];
    for (i, b) in text.bytes().enumerate() {
        v[i % DIM] += b as f32 / 255.0;
    }
    v
}

#[async_trait::async_trait]
impl EmbeddingProvider for MockProvider {
    async fn embed(
        &self,
        texts: &[String],
        _input_type: InputType,
    ) -> Result<Vec<Vec<f32>>, DomainError> {
        let (fail, zero, delay) = {
            let mut state = self.state.lock().unwrap();
            state.embed_calls += 1;
            (state.fail, state.zero_vectors, state.delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(DomainError::Embedding("mock embed failure".to_string()));
        }
        Ok(texts
            .iter()
            .map(|t| {
                if zero {
                    vec![0.0; DIM]
                } else {
                    vectorize(t)
                }
            })
            .collect())
    }

    fn dimension(&self) -> usize {
        DIM
    }
}

pub fn setup() -> DocSim {
    setup_with(Arc::new(MockProvider::new()), DuplicatePolicy::Keep)
}

pub fn setup_with(embedder: Arc<MockProvider>, on_duplicate: DuplicatePolicy) -> DocSim {
    DocSim::with_providers(":memory:", embedder, on_duplicate).unwrap()
}
