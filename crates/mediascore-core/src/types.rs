//! Core data model shared by the heuristics, the synthesizer and the runtime.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of media being evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Image,
    Video,
}

impl MediaKind {
    /// Classify a media location by its file extension.
    ///
    /// Unknown extensions are treated as images.
    pub fn from_path(location: &str) -> Self {
        let ext = location
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        match ext.as_str() {
            "mp4" | "mov" | "webm" | "avi" | "mkv" => MediaKind::Video,
            _ => MediaKind::Image,
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, MediaKind::Video)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// Brand attributes used as context for subject adherence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrandProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub vision: Option<String>,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default)]
    pub colors: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
}

impl BrandProfile {
    /// Create a profile carrying only a brand name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Brand name, or the empty string.
    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    /// Non-empty attributes as `(key, value)` pairs, in a fixed order.
    pub fn attributes(&self) -> Vec<(&'static str, &str)> {
        [
            ("name", &self.name),
            ("description", &self.description),
            ("vision", &self.vision),
            ("voice", &self.voice),
            ("colors", &self.colors),
            ("style", &self.style),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(|v| (key, v))
        })
        .collect()
    }
}

/// One media item to evaluate.
///
/// Supplied by the caller and borrowed read-only for the duration of an
/// evaluation. `media` holds bytes the caller has already read; the
/// orchestrator never touches `location` beyond reporting it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetRef {
    pub media_kind: MediaKind,
    pub location: String,
    pub media: Option<Vec<u8>>,
    pub prompt: String,
    pub brand: Option<BrandProfile>,
}

impl AssetRef {
    /// Create an image asset with a prompt and no media bytes.
    pub fn image(location: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            media_kind: MediaKind::Image,
            location: location.into(),
            media: None,
            prompt: prompt.into(),
            brand: None,
        }
    }

    /// Create a video asset with a prompt and no media bytes.
    pub fn video(location: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            media_kind: MediaKind::Video,
            ..Self::image(location, prompt)
        }
    }

    pub fn with_media(mut self, bytes: Vec<u8>) -> Self {
        self.media = Some(bytes);
        self
    }

    pub fn with_brand(mut self, brand: BrandProfile) -> Self {
        self.brand = Some(brand);
        self
    }

    /// Brand name, or the empty string when no brand is attached.
    pub fn brand_name(&self) -> &str {
        self.brand.as_ref().map(|b| b.name_or_empty()).unwrap_or("")
    }
}

/// The four scoring dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    SizeCompliance,
    SubjectAdherence,
    Creativity,
    MoodConsistency,
}

impl Criterion {
    /// All criteria in composite order.
    pub const ALL: [Criterion; 4] = [
        Criterion::SizeCompliance,
        Criterion::SubjectAdherence,
        Criterion::Creativity,
        Criterion::MoodConsistency,
    ];

    /// Weight of this criterion in the composite score.
    pub fn weight(&self) -> f64 {
        match self {
            Criterion::SizeCompliance => 0.25,
            Criterion::SubjectAdherence => 0.35,
            Criterion::Creativity => 0.20,
            Criterion::MoodConsistency => 0.20,
        }
    }

    /// Stable task identifier sent to the model provider.
    pub fn task_name(&self) -> &'static str {
        match self {
            Criterion::SizeCompliance => "size_compliance",
            Criterion::SubjectAdherence => "subject_adherence",
            Criterion::Creativity => "creativity",
            Criterion::MoodConsistency => "mood_consistency",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.task_name())
    }
}

/// Which strategy produced a criterion score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreSource {
    Vision,
    Text,
    Heuristic,
}

/// Clamp a raw score into `[0, 100]`.
///
/// NaN maps to 0 so the invariant holds for every input.
pub fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

/// Score for a single criterion.
///
/// `value` is always within `[0, 100]` when built through [`CriterionScore::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    pub source: ScoreSource,
}

impl CriterionScore {
    pub fn new(value: f64, source: ScoreSource) -> Self {
        Self {
            value: clamp_score(value),
            rationale: None,
            source,
        }
    }

    /// Score produced by a deterministic heuristic.
    pub fn heuristic(value: f64) -> Self {
        Self::new(value, ScoreSource::Heuristic)
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }
}

/// The four criterion scores, before aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionScores {
    pub size_compliance: CriterionScore,
    pub subject_adherence: CriterionScore,
    pub creativity: CriterionScore,
    pub mood_consistency: CriterionScore,
}

impl CriterionScores {
    pub fn get(&self, criterion: Criterion) -> &CriterionScore {
        match criterion {
            Criterion::SizeCompliance => &self.size_compliance,
            Criterion::SubjectAdherence => &self.subject_adherence,
            Criterion::Creativity => &self.creativity,
            Criterion::MoodConsistency => &self.mood_consistency,
        }
    }
}

/// Final result of one evaluation. Immutable once built by the synthesizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub size_compliance: CriterionScore,
    pub subject_adherence: CriterionScore,
    pub creativity: CriterionScore,
    pub mood_consistency: CriterionScore,
    pub end_score: u8,
}

impl EvaluationResult {
    pub fn score(&self, criterion: Criterion) -> &CriterionScore {
        match criterion {
            Criterion::SizeCompliance => &self.size_compliance,
            Criterion::SubjectAdherence => &self.subject_adherence,
            Criterion::Creativity => &self.creativity,
            Criterion::MoodConsistency => &self.mood_consistency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind_from_path() {
        assert_eq!(MediaKind::from_path("assets/a.PNG"), MediaKind::Image);
        assert_eq!(MediaKind::from_path("clip.mov"), MediaKind::Video);
        assert_eq!(MediaKind::from_path("clip.mkv"), MediaKind::Video);
        assert_eq!(MediaKind::from_path("no_extension"), MediaKind::Image);
    }

    #[test]
    fn test_criterion_weights_sum_to_one() {
        let total: f64 = Criterion::ALL.iter().map(|c| c.weight()).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_criterion_score_is_clamped() {
        assert_eq!(CriterionScore::new(150.0, ScoreSource::Text).value, 100.0);
        assert_eq!(CriterionScore::new(-30.0, ScoreSource::Text).value, 0.0);
        assert_eq!(CriterionScore::new(f64::NAN, ScoreSource::Text).value, 0.0);
    }

    #[test]
    fn test_brand_attributes_skip_blank_values() {
        let brand = BrandProfile {
            name: Some("Acme".to_string()),
            voice: Some("   ".to_string()),
            colors: Some("red, white".to_string()),
            ..Default::default()
        };
        assert_eq!(
            brand.attributes(),
            vec![("name", "Acme"), ("colors", "red, white")]
        );
    }

    #[test]
    fn test_asset_brand_name_defaults_to_empty() {
        let asset = AssetRef::image("a.png", "prompt");
        assert_eq!(asset.brand_name(), "");

        let asset = asset.with_brand(BrandProfile::named("Shoe"));
        assert_eq!(asset.brand_name(), "Shoe");
    }
}
