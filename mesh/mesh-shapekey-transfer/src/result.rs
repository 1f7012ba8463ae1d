//! Transfer outcome and metrics.

/// Outcome of a completed transfer.
///
/// Returned on success; failures surface as
/// [`TransferError`](crate::TransferError) instead.
#[derive(Debug, Clone, Default)]
pub struct TransferOutput {
    /// Names of the keys whose geometry was written, in worklist order.
    pub keys_transferred: Vec<String>,

    /// Destination vertices that found a correspondence and were written.
    pub vertices_matched: usize,

    /// Destination vertices left untouched for lack of a correspondence.
    pub vertices_skipped: usize,

    /// Indices of the skipped vertices, ascending.
    pub skipped_vertices: Vec<usize>,

    /// One human-readable diagnostic per skipped vertex.
    pub diagnostics: Vec<String>,
}

impl TransferOutput {
    /// Returns whether every destination vertex found a correspondence.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.vertices_skipped == 0
    }

    /// Returns a human-readable success message.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_shapekey_transfer::TransferOutput;
    ///
    /// let output = TransferOutput::default();
    /// assert!(output.summary().contains("shape key"));
    /// ```
    #[must_use]
    pub fn summary(&self) -> String {
        if self.vertices_skipped == 0 {
            format!(
                "transferred {} shape key(s) across {} vertices",
                self.keys_transferred.len(),
                self.vertices_matched
            )
        } else {
            format!(
                "transferred {} shape key(s) across {} vertices ({} skipped without a match)",
                self.keys_transferred.len(),
                self.vertices_matched,
                self.vertices_skipped
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_mentions_skips_only_when_present() {
        let mut output = TransferOutput {
            keys_transferred: vec!["Smile".to_owned()],
            vertices_matched: 10,
            ..TransferOutput::default()
        };
        assert!(!output.summary().contains("skipped"));
        assert!(output.is_complete());

        output.vertices_skipped = 2;
        output.skipped_vertices = vec![3, 7];
        assert!(output.summary().contains("2 skipped"));
        assert!(!output.is_complete());
    }
}
