//! Ordered store of numeric samples with an optional column header.
//!
//! Backs sample tables: each sample is one row of variable values, and the
//! rows are exposed as a live [`ObservableList`].

use thiserror::Error;

use crate::config::SamplesConfig;
use crate::observable::ObservableList;

/// Error when addressing a sample by index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SampleError {
    #[error("Sample index {index} out of range for {len} samples")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Insertion-ordered collection of samples.
#[derive(Debug)]
pub struct SampleSet<N> {
    samples: ObservableList<Vec<N>>,
    header: Vec<String>,
    header_prefix: String,
}

impl<N: Clone> SampleSet<N> {
    /// Create an empty set using the default "Var" header prefix.
    pub fn new() -> Self {
        Self::with_config(&SamplesConfig::default())
    }

    /// Create an empty set using the `[samples]` config section.
    pub fn with_config(config: &SamplesConfig) -> Self {
        Self {
            samples: ObservableList::new(),
            header: Vec::new(),
            header_prefix: config.header_prefix.clone(),
        }
    }

    /// Append a sample.
    pub fn add(&mut self, sample: Vec<N>) {
        self.samples.push(sample);
    }

    /// Remove and return the sample at `index`.
    pub fn remove(&mut self, index: usize) -> Result<Vec<N>, SampleError> {
        let len = self.samples.len();
        if index >= len {
            return Err(SampleError::IndexOutOfRange { index, len });
        }
        Ok(self.samples.remove(index))
    }

    /// Append names to the explicit header.
    pub fn set_header<I, S>(&mut self, header: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.header.extend(header.into_iter().map(Into::into));
    }

    /// Column names for the samples' variables.
    ///
    /// The explicit header if one was set. Otherwise, once samples exist,
    /// `"<prefix> 1" .. "<prefix> n"` for n = [`sample_size`](Self::sample_size);
    /// empty when there is neither.
    pub fn header(&self) -> Vec<String> {
        if !self.header.is_empty() {
            return self.header.clone();
        }
        (1..=self.sample_size()).map(|var| format!("{} {}", self.header_prefix, var)).collect()
    }

    /// Get a copy of the sample at `index`.
    pub fn sample(&self, index: usize) -> Option<Vec<N>> {
        self.samples.get(index)
    }

    /// Live list of all samples.
    pub fn samples_list(&self) -> ObservableList<Vec<N>> {
        self.samples.clone()
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if there are no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of variables per sample, taken from the first sample (0 when empty).
    pub fn sample_size(&self) -> usize {
        self.samples.with_items(|samples| samples.first().map_or(0, Vec::len))
    }
}

impl<N: Clone> Default for SampleSet<N> {
    fn default() -> Self {
        Self::new()
    }
}
