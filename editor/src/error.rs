//! Error taxonomy for editor operations.
//!
//! Every error here is recoverable at single-operation granularity: a
//! failed operation leaves the scene and the history exactly as they
//! were before the attempt.

use std::fmt;

use lattice_core::SceneError;

use crate::property::EditKind;
use crate::resources::ResourceError;

#[derive(Debug, Clone, PartialEq)]
pub enum EditError {
    /// The property's edit kind is part of the closed tag set but has no
    /// snapshot representation; the edit is aborted, never guessed at.
    UnsupportedPropertyKind(EditKind),
    /// A lookup by object/component id or property name failed.
    TargetNotFound(String),
    /// Asynchronous asset resolution failed while building a command.
    ResourceResolution(ResourceError),
    /// A structural scene operation failed (cycle, bad index, missing
    /// node).
    Scene(SceneError),
    /// A reference-kind edit on this target is still resolving.
    EditInFlight(String),
    /// A command was applied or reverted out of sequence.
    InvalidState(String),
    /// The clipboard payload is missing or malformed.
    Clipboard(String),
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedPropertyKind(kind) => {
                write!(f, "unsupported property kind: {}", kind.name())
            }
            Self::TargetNotFound(msg) => write!(f, "target not found: {msg}"),
            Self::ResourceResolution(err) => write!(f, "resource resolution failed: {err}"),
            Self::Scene(err) => write!(f, "{err}"),
            Self::EditInFlight(msg) => write!(f, "edit already in flight: {msg}"),
            Self::InvalidState(msg) => write!(f, "invalid state: {msg}"),
            Self::Clipboard(msg) => write!(f, "clipboard: {msg}"),
        }
    }
}

impl std::error::Error for EditError {}

impl From<SceneError> for EditError {
    fn from(err: SceneError) -> Self {
        Self::Scene(err)
    }
}

impl From<ResourceError> for EditError {
    fn from(err: ResourceError) -> Self {
        Self::ResourceResolution(err)
    }
}

pub type EditResult<T = ()> = Result<T, EditError>;

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_core::Scene;

    #[test]
    fn display_forms() {
        assert_eq!(
            EditError::TargetNotFound("object #9".into()).to_string(),
            "target not found: object #9"
        );
        assert_eq!(
            EditError::UnsupportedPropertyKind(EditKind::Sound).to_string(),
            "unsupported property kind: sound"
        );
        assert_eq!(
            EditError::Clipboard("empty".into()).to_string(),
            "clipboard: empty"
        );
    }

    #[test]
    fn scene_errors_convert() {
        let mut scene = Scene::new();
        let ghost = scene.spawn("ghost");
        scene.remove_subtree(ghost).unwrap();
        let err: EditError = SceneError::ObjectNotFound(ghost).into();
        assert!(matches!(err, EditError::Scene(SceneError::ObjectNotFound(_))));
    }
}
