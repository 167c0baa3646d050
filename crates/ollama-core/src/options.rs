//! Model runtime options.

use serde::{Deserialize, Serialize};

/// Load-time and runtime parameters forwarded to the model.
///
/// Every field is optional; unset fields are omitted from the request so the
/// server applies the model's own defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Options {
    // Load-time
    /// Enable NUMA support.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numa: Option<bool>,
    /// Context window size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_ctx: Option<u32>,
    /// Prompt processing batch size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_batch: Option<u32>,
    /// Number of layers offloaded to the GPU.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_gpu: Option<i32>,
    /// GPU used for small tensors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_gpu: Option<i32>,
    /// Reduce VRAM usage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_vram: Option<bool>,
    /// Use 16-bit floats for the KV cache.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub f16_kv: Option<bool>,
    /// Return logits for all tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logits_all: Option<bool>,
    /// Load only the vocabulary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocab_only: Option<bool>,
    /// Memory-map the model file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_mmap: Option<bool>,
    /// Lock the model in memory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_mlock: Option<bool>,
    /// Load the model for embeddings only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_only: Option<bool>,
    /// Number of CPU threads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_thread: Option<u32>,

    // Runtime
    /// Tokens kept from the initial prompt when the context overflows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_keep: Option<i32>,
    /// Sampling seed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    /// Maximum tokens to predict.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<i32>,
    /// Top-k sampling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    /// Top-p (nucleus) sampling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Tail-free sampling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tfs_z: Option<f64>,
    /// Locally typical sampling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typical_p: Option<f64>,
    /// Window considered for repetition penalties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_last_n: Option<i32>,
    /// Sampling temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Repetition penalty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_penalty: Option<f64>,
    /// Presence penalty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    /// Frequency penalty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    /// Mirostat mode (0, 1 or 2).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirostat: Option<u8>,
    /// Mirostat target entropy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirostat_tau: Option<f64>,
    /// Mirostat learning rate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirostat_eta: Option<f64>,
    /// Penalize newline tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penalize_newline: Option<bool>,
    /// Stop sequences.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
}

impl Options {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sampling temperature.
    #[must_use]
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the sampling seed.
    #[must_use]
    pub fn seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the context window size.
    #[must_use]
    pub fn num_ctx(mut self, num_ctx: u32) -> Self {
        self.num_ctx = Some(num_ctx);
        self
    }

    /// Set the maximum number of tokens to predict.
    #[must_use]
    pub fn num_predict(mut self, num_predict: i32) -> Self {
        self.num_predict = Some(num_predict);
        self
    }

    /// Add a stop sequence.
    #[must_use]
    pub fn stop(mut self, sequence: impl Into<String>) -> Self {
        self.stop.get_or_insert_with(Vec::new).push(sequence.into());
        self
    }
}
