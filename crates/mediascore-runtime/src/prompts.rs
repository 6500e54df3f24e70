//! Prompts for model-assisted scoring.
//!
//! The system prompt fixes the reply shape; the per-criterion criteria text
//! travels in the user message as part of the `{task, criteria, input}`
//! envelope built by [`crate::scoring::ScoringRequest`].

use mediascore_core::{Criterion, MediaKind};

/// System prompt for text-only scoring requests.
pub const SCORER_SYSTEM_PROMPT: &str = "You are a strict scorer. \
Return only a compact JSON object with a numeric 'score' from 0 to 100 \
and a short 'rationale' string.";

/// System prompt for requests that carry an inline image.
pub const VISION_SCORER_SYSTEM_PROMPT: &str = "You are a strict vision scorer. \
Judge the attached image. Return only a compact JSON object with a numeric \
'score' from 0 to 100 and a short 'rationale' string.";

/// Size compliance for images: how close the pixel dimensions are to the target.
pub const SIZE_CRITERIA: &str = "Rate how well the asset dimensions fit the target \
canvas. 100 means an exact match; penalise each axis in proportion to its \
deviation from the target.";

/// Size compliance for video: no frames are available, only the description.
pub const VIDEO_SIZE_CRITERIA: &str = "This asset is a video and its frames are not \
available. From the description alone, rate how feasible it is to crop the video \
to a square frame without losing the subject. 50 means unknown.";

/// Subject adherence: does the asset depict what was asked for the brand.
pub const SUBJECT_CRITERIA: &str = "Rate how faithfully the asset depicts the subject \
described in the prompt and how well it fits the brand profile provided.";

/// Creativity: originality and richness of the requested style.
pub const CREATIVITY_CRITERIA: &str = "Rate the creativity of the asset: originality \
of composition and richness of style relative to the prompt.";

/// Mood consistency: does the asset convey the mood the prompt asks for.
pub const MOOD_CRITERIA: &str = "Rate how consistently the asset conveys the mood \
and atmosphere requested by the prompt.";

/// Criteria text for a criterion and media kind.
pub fn criteria_text(criterion: Criterion, media_kind: MediaKind) -> &'static str {
    match criterion {
        Criterion::SizeCompliance if media_kind.is_video() => VIDEO_SIZE_CRITERIA,
        Criterion::SizeCompliance => SIZE_CRITERIA,
        Criterion::SubjectAdherence => SUBJECT_CRITERIA,
        Criterion::Creativity => CREATIVITY_CRITERIA,
        Criterion::MoodConsistency => MOOD_CRITERIA,
    }
}

/// System prompt for a request shape.
pub fn system_prompt(with_image: bool) -> &'static str {
    if with_image {
        VISION_SCORER_SYSTEM_PROMPT
    } else {
        SCORER_SYSTEM_PROMPT
    }
}
