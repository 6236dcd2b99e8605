//! Error types for rendering.

use std::fmt;

use cmark_ast::NodeType;

/// Error returned by a render call.
///
/// Rendering is a deterministic transform of an immutable tree, so none of
/// these are transient: retrying with the same input fails the same way.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The tree contains a node type no configured renderer claims.
    ///
    /// The built-in renderer set covers every core node type, so this means a
    /// node from an extension (or a custom producer) reached the renderer
    /// without a matching renderer registration.
    #[error("No renderer registered for node type `{node_type}`")]
    UnhandledNode {
        /// Type of the offending node.
        node_type: NodeType,
    },
    /// The output sink rejected a write.
    #[error("Failed to write output: {0}")]
    Write(#[from] fmt::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unhandled_node_message_names_type() {
        let err = RenderError::UnhandledNode {
            node_type: NodeType::Custom("youtube"),
        };
        assert_eq!(
            err.to_string(),
            "No renderer registered for node type `youtube`"
        );
    }

    #[test]
    fn test_write_error_from_fmt() {
        let err = RenderError::from(fmt::Error);
        assert!(matches!(err, RenderError::Write(_)));
    }
}
