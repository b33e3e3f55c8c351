/// A specialized Result type for directing a script.
pub type DirectorResult<T> = Result<T, DirectorError>;

/// Everything that can abort directing a script into a timeline.
#[derive(Debug, thiserror::Error)]
pub enum DirectorError {
    #[error("object '{0}' is not on stage")]
    UnknownObject(String),

    #[error("object '{0}' is already on stage")]
    DuplicateObject(String),

    #[error("cue '{cue}' starts at {offset}s, before the previous cue at {previous}s")]
    CueOutOfOrder {
        cue: String,
        offset: f32,
        previous: f32,
    },

    #[error("cue '{cue}' has invalid offset {offset}")]
    InvalidCueOffset { cue: String, offset: f32 },

    #[error("invalid {what}: {value}")]
    InvalidTiming { what: &'static str, value: f32 },

    #[error("play step has no animations")]
    EmptyPlay,

    #[error("segment '{segment}' leaves objects on stage: {}", objects.join(", "))]
    SegmentLeak {
        segment: String,
        objects: Vec<String>,
    },

    #[error("cannot morph group '{0}' into a single shape")]
    GroupMorph(String),

    #[error("duplicate segment id '{0}'")]
    DuplicateSegment(String),

    #[error("{location} step {index}: {source}")]
    Step {
        location: String,
        index: usize,
        #[source]
        source: Box<DirectorError>,
    },
}

impl DirectorError {
    pub(crate) fn at_step(self, location: &str, index: usize) -> Self {
        DirectorError::Step {
            location: location.to_string(),
            index,
            source: Box::new(self),
        }
    }

    /// The underlying error, without step location wrappers
    pub fn root(&self) -> &DirectorError {
        match self {
            DirectorError::Step { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_location_wraps_root() {
        let err = DirectorError::UnknownObject("dot".into()).at_step("intro", 3);
        assert_eq!(err.to_string(), "intro step 3: object 'dot' is not on stage");
        assert!(matches!(err.root(), DirectorError::UnknownObject(id) if id == "dot"));
    }

    #[test]
    fn test_segment_leak_message_lists_objects() {
        let err = DirectorError::SegmentLeak {
            segment: "java".into(),
            objects: vec!["arrow_s".into(), "bg4".into()],
        };
        assert_eq!(
            err.to_string(),
            "segment 'java' leaves objects on stage: arrow_s, bg4"
        );
    }
}
