//! Records fed to the preprocessing pipeline

use uuid::Uuid;

use crate::tensor::RawArray;

/// A single input unit: either an already decoded array, a locator of
/// undecoded image data, or both.
///
/// When both are present the in-memory array takes precedence.
#[derive(Debug, Clone)]
pub struct Record {
    id: Uuid,
    tensor: Option<RawArray>,
    uri: Option<String>,
}

impl Default for Record {
    fn default() -> Self {
        Self::new()
    }
}

impl Record {
    /// Create an empty record with a fresh id
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            tensor: None,
            uri: None,
        }
    }

    /// Create a record holding an in-memory array
    pub fn from_tensor(tensor: impl Into<RawArray>) -> Self {
        Self::new().with_tensor(tensor)
    }

    /// Create a record pointing at an image resource
    pub fn from_uri(uri: impl Into<String>) -> Self {
        Self::new().with_uri(uri)
    }

    /// Set the in-memory array
    pub fn with_tensor(mut self, tensor: impl Into<RawArray>) -> Self {
        self.tensor = Some(tensor.into());
        self
    }

    /// Set the resource locator
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Unique id of this record
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// In-memory array, if any
    pub fn tensor(&self) -> Option<&RawArray> {
        self.tensor.as_ref()
    }

    /// Resource locator, if any
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }
}
