//! # Batch Encoder
//!
//! Translates batches of raw text into [`TokenSequence`]s,
//! optionally bracketed by the model's ``<s>`` / ``</s>`` markers.

use std::{path::Path, sync::Arc};

use crate::{
    encoders::{MergeScanEncoder, TokenEncoder},
    errors::{WBResult, WordbaleError},
    types::{TokenId, TokenSequence},
    vocab::{TokenizerModel, io::load_model_path},
};

/// Which sentence boundary markers to add around each encoded text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryMarkers {
    /// Prepend the ``<s>`` token.
    pub add_bos: bool,

    /// Append the ``</s>`` token.
    pub add_eos: bool,
}

impl Default for BoundaryMarkers {
    fn default() -> Self {
        Self::BOTH
    }
}

impl BoundaryMarkers {
    /// Add both markers.
    pub const BOTH: Self = Self {
        add_bos: true,
        add_eos: true,
    };

    /// Add no markers.
    pub const NONE: Self = Self {
        add_bos: false,
        add_eos: false,
    };

    /// Sets `add_bos`.
    pub fn with_bos(
        self,
        add_bos: bool,
    ) -> Self {
        Self { add_bos, ..self }
    }

    /// Sets `add_eos`.
    pub fn with_eos(
        self,
        add_eos: bool,
    ) -> Self {
        Self { add_eos, ..self }
    }
}

/// Encodes batches of text with one bound tokenizer model.
///
/// Each text is encoded independently; output order matches input order.
/// Encoding does no I/O and never mutates the model.
#[derive(Debug, Clone)]
pub struct BatchEncoder<E = MergeScanEncoder<TokenId>>
where
    E: TokenEncoder<TokenId>,
{
    encoder: E,
}

impl BatchEncoder {
    /// Load a model file and bind an encoder to it.
    ///
    /// ## Errors
    /// [`WordbaleError::ModelNotFound`] if the model is missing or cannot be loaded.
    pub fn open<P: AsRef<Path>>(path: P) -> WBResult<Self> {
        let path = path.as_ref();
        let model: TokenizerModel<TokenId> = load_model_path(path).map_err(|e| match e {
            WordbaleError::ModelNotFound { .. } => e,
            other => WordbaleError::ModelNotFound {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        })?;
        log::info!("Loaded tokenizer model {:?} with {} tokens", path, model.len());
        Ok(Self::new(model.into()))
    }

    /// Bind an encoder to an already loaded model.
    pub fn new(model: Arc<TokenizerModel<TokenId>>) -> Self {
        Self::with_encoder(MergeScanEncoder::new(model))
    }
}

impl<E: TokenEncoder<TokenId>> BatchEncoder<E> {
    /// Wrap an existing [`TokenEncoder`].
    pub fn with_encoder(encoder: E) -> Self {
        Self { encoder }
    }

    /// The bound model.
    pub fn model(&self) -> &Arc<TokenizerModel<TokenId>> {
        self.encoder.model()
    }

    /// Encode one text.
    ///
    /// ## Arguments
    /// * `text` - The text to encode; may be empty.
    /// * `markers` - Which boundary markers to add.
    pub fn encode(
        &self,
        text: &str,
        markers: BoundaryMarkers,
    ) -> TokenSequence {
        let specials = self.model().specials();

        let mut tokens = Vec::with_capacity(text.len() / 2 + 2);
        if markers.add_bos {
            tokens.push(specials.bos());
        }
        self.encoder.encode_append(text, &mut tokens);
        if markers.add_eos {
            tokens.push(specials.eos());
        }
        tokens
    }

    /// Encode a batch of texts, adding both boundary markers.
    ///
    /// ## Arguments
    /// * `texts` - The texts to encode.
    ///
    /// ## Returns
    /// One [`TokenSequence`] per text, in input order.
    pub fn encode_batch<S: AsRef<str>>(
        &self,
        texts: &[S],
    ) -> Vec<TokenSequence> {
        self.encode_batch_with(texts, BoundaryMarkers::default())
    }

    /// Encode a batch of texts with explicit boundary markers.
    ///
    /// ## Arguments
    /// * `texts` - The texts to encode.
    /// * `markers` - Which boundary markers to add.
    ///
    /// ## Returns
    /// One [`TokenSequence`] per text, in input order.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, texts)))]
    pub fn encode_batch_with<S: AsRef<str>>(
        &self,
        texts: &[S],
        markers: BoundaryMarkers,
    ) -> Vec<TokenSequence> {
        texts
            .iter()
            .map(|text| self.encode(text.as_ref(), markers))
            .collect()
    }

    /// Encode a batch of texts on the ``rayon`` pool.
    ///
    /// Produces the same output as [`Self::encode_batch_with`].
    #[cfg(feature = "rayon")]
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, texts)))]
    pub fn par_encode_batch<S: AsRef<str> + Sync>(
        &self,
        texts: &[S],
        markers: BoundaryMarkers,
    ) -> Vec<TokenSequence> {
        use rayon::prelude::*;
        texts
            .par_iter()
            .map(|text| self.encode(text.as_ref(), markers))
            .collect()
    }
}
