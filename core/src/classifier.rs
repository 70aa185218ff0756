//! Complaint text classification.
//!
//! The production classifier is a frozen TF-IDF + linear-model artifact
//! produced by offline training and loaded once at startup from two paired
//! JSON files (vectorizer + model). Both halves must load and agree on
//! version and shape; otherwise the desk runs in a degraded mode where
//! submissions are rejected instead of mis-filed. Retraining and redeploying
//! the artifact never touches persisted complaints or their schema.

use crate::error::DeskResult;
use serde::Deserialize;
use std::collections::HashMap;

/// A frozen text-to-category function.
///
/// Implementations are deterministic, pure, and safe for unsynchronized
/// concurrent use; the complaint service shares one behind an `Arc`.
pub trait Classifier: Send + Sync {
    /// Assign a category label to a complaint text.
    fn classify(&self, text: &str) -> String;

    /// The closed label set this classifier draws from.
    fn labels(&self) -> &[String];
}

#[derive(Debug, Clone, Deserialize)]
struct VectorizerArtifact {
    artifact_version: String,
    /// Term -> feature index.
    vocabulary: HashMap<String, usize>,
    /// Inverse document frequency per feature index.
    idf: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct ModelArtifact {
    artifact_version: String,
    classes: Vec<String>,
    /// One weight row per class, one column per feature.
    coefficients: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

/// The trained artifact: TF-IDF feature transform plus a one-vs-rest linear
/// predictor. `classify` scores every class and returns the argmax label.
#[derive(Debug)]
pub struct TfidfClassifier {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    classes: Vec<String>,
    coefficients: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

impl TfidfClassifier {
    /// Load and validate the paired artifact files.
    pub fn load(vectorizer_path: &str, model_path: &str) -> DeskResult<Self> {
        let raw = std::fs::read_to_string(vectorizer_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {vectorizer_path}: {e}"))?;
        let vectorizer: VectorizerArtifact = serde_json::from_str(&raw)?;

        let raw = std::fs::read_to_string(model_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {model_path}: {e}"))?;
        let model: ModelArtifact = serde_json::from_str(&raw)?;

        Self::from_artifacts(vectorizer, model)
    }

    fn from_artifacts(vectorizer: VectorizerArtifact, model: ModelArtifact) -> DeskResult<Self> {
        if vectorizer.artifact_version != model.artifact_version {
            return Err(anyhow::anyhow!(
                "Mismatched artifact pair: vectorizer {} vs model {}",
                vectorizer.artifact_version,
                model.artifact_version
            )
            .into());
        }
        let classifier = Self::from_parts(
            vectorizer.vocabulary,
            vectorizer.idf,
            model.classes,
            model.coefficients,
            model.intercepts,
        )?;
        log::info!(
            "loaded classifier artifact {} ({} labels, {} features)",
            vectorizer.artifact_version,
            classifier.classes.len(),
            classifier.idf.len()
        );
        Ok(classifier)
    }

    /// Build a classifier from already-deserialized pieces, checking that
    /// vocabulary, idf, and model shapes agree.
    pub fn from_parts(
        vocabulary: HashMap<String, usize>,
        idf: Vec<f64>,
        classes: Vec<String>,
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    ) -> DeskResult<Self> {
        if classes.is_empty() {
            return Err(anyhow::anyhow!("Model artifact has no classes").into());
        }
        if vocabulary.is_empty() {
            return Err(anyhow::anyhow!("Vectorizer artifact has an empty vocabulary").into());
        }
        if idf.len() != vocabulary.len() {
            return Err(anyhow::anyhow!(
                "Vectorizer shape mismatch: {} idf weights for {} vocabulary terms",
                idf.len(),
                vocabulary.len()
            )
            .into());
        }
        if let Some((term, &index)) = vocabulary.iter().find(|(_, &i)| i >= idf.len()) {
            return Err(anyhow::anyhow!(
                "Vocabulary term '{term}' has feature index {index} outside the idf range"
            )
            .into());
        }
        if coefficients.len() != classes.len() || intercepts.len() != classes.len() {
            return Err(anyhow::anyhow!(
                "Model shape mismatch: {} classes, {} coefficient rows, {} intercepts",
                classes.len(),
                coefficients.len(),
                intercepts.len()
            )
            .into());
        }
        if let Some(row) = coefficients.iter().find(|row| row.len() != idf.len()) {
            return Err(anyhow::anyhow!(
                "Model shape mismatch: coefficient row has {} columns for {} features",
                row.len(),
                idf.len()
            )
            .into());
        }
        Ok(Self {
            vocabulary,
            idf,
            classes,
            coefficients,
            intercepts,
        })
    }

    /// TF-IDF feature vector: term counts over the vocabulary, scaled by idf,
    /// L2-normalized. Matches the training pipeline's vectorizer defaults.
    fn vectorize(&self, text: &str) -> Vec<f64> {
        let lowered = text.to_lowercase();
        let mut x = vec![0.0; self.idf.len()];
        for token in tokens(&lowered) {
            if let Some(&index) = self.vocabulary.get(token) {
                x[index] += 1.0;
            }
        }
        for (value, idf) in x.iter_mut().zip(&self.idf) {
            *value *= idf;
        }
        let norm = x.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in x.iter_mut() {
                *value /= norm;
            }
        }
        x
    }
}

impl Classifier for TfidfClassifier {
    fn classify(&self, text: &str) -> String {
        let x = self.vectorize(text);
        let mut best = 0;
        let mut best_score = f64::NEG_INFINITY;
        for (index, (row, intercept)) in self.coefficients.iter().zip(&self.intercepts).enumerate()
        {
            let score = intercept + row.iter().zip(&x).map(|(w, v)| w * v).sum::<f64>();
            if score > best_score {
                best = index;
                best_score = score;
            }
        }
        self.classes[best].clone()
    }

    fn labels(&self) -> &[String] {
        &self.classes
    }
}

/// Word tokens of length >= 2, the same split the vectorizer was trained
/// with. Input must already be lowercased.
fn tokens(lowered: &str) -> impl Iterator<Item = &str> + '_ {
    lowered
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|token| token.chars().count() >= 2)
}

/// Fixed keyword-rule classifier: first rule whose keyword appears in the
/// text wins, otherwise the fallback label. A lightweight stand-in for the
/// trained artifact in tests and demos.
pub struct KeywordClassifier {
    rules: Vec<(String, String)>,
    labels: Vec<String>,
    fallback: String,
}

impl KeywordClassifier {
    pub fn new(rules: &[(&str, &str)], fallback: &str) -> Self {
        let mut labels: Vec<String> = Vec::new();
        for (_, label) in rules {
            if !labels.iter().any(|known| known == label) {
                labels.push((*label).to_string());
            }
        }
        if !labels.iter().any(|known| known == fallback) {
            labels.push(fallback.to_string());
        }
        Self {
            rules: rules
                .iter()
                .map(|(keyword, label)| (keyword.to_lowercase(), (*label).to_string()))
                .collect(),
            labels,
            fallback: fallback.to_string(),
        }
    }
}

impl Classifier for KeywordClassifier {
    fn classify(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        for (keyword, label) in &self.rules {
            if lowered.contains(keyword.as_str()) {
                return label.clone();
            }
        }
        self.fallback.clone()
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_classifier() -> TfidfClassifier {
        let vocabulary: HashMap<String, usize> = [
            ("cold".to_string(), 0),
            ("late".to_string(), 1),
            ("refund".to_string(), 2),
        ]
        .into_iter()
        .collect();
        TfidfClassifier::from_parts(
            vocabulary,
            vec![1.2, 1.5, 2.0],
            vec!["Food Quality Issue".into(), "Delivery Issue".into(), "Payment / Refund Issue".into()],
            vec![
                vec![2.0, 0.0, 0.0],
                vec![0.0, 2.0, 0.0],
                vec![0.0, 0.0, 2.0],
            ],
            vec![0.0, 0.0, 0.0],
        )
        .unwrap()
    }

    #[test]
    fn tokens_split_on_non_word_chars_and_drop_short_tokens() {
        let collected: Vec<&str> = tokens("the app crashed, order #42 - i lost rs. 250!").collect();
        assert_eq!(
            collected,
            vec!["the", "app", "crashed", "order", "42", "lost", "rs", "250"],
            "single-character tokens and punctuation should be dropped"
        );
    }

    #[test]
    fn classify_picks_the_dominant_term_class() {
        let classifier = tiny_classifier();
        assert_eq!(classifier.classify("my order was COLD"), "Food Quality Issue");
        assert_eq!(classifier.classify("driver was late late late"), "Delivery Issue");
        assert_eq!(classifier.classify("please refund me"), "Payment / Refund Issue");
    }

    #[test]
    fn classify_with_no_known_tokens_still_returns_a_label() {
        let classifier = tiny_classifier();
        let label = classifier.classify("zzz qqq");
        assert!(
            classifier.labels().contains(&label),
            "fallback label '{label}' must come from the label set"
        );
    }

    #[test]
    fn from_parts_rejects_idf_vocabulary_mismatch() {
        let vocabulary: HashMap<String, usize> = [("cold".to_string(), 0)].into_iter().collect();
        let result = TfidfClassifier::from_parts(
            vocabulary,
            vec![1.0, 2.0],
            vec!["A".into()],
            vec![vec![1.0, 1.0]],
            vec![0.0],
        );
        assert!(result.is_err(), "one vocabulary term with two idf weights must fail");
    }

    #[test]
    fn from_parts_rejects_short_coefficient_rows() {
        let vocabulary: HashMap<String, usize> =
            [("cold".to_string(), 0), ("late".to_string(), 1)].into_iter().collect();
        let result = TfidfClassifier::from_parts(
            vocabulary,
            vec![1.0, 1.0],
            vec!["A".into(), "B".into()],
            vec![vec![1.0, 1.0], vec![1.0]],
            vec![0.0, 0.0],
        );
        assert!(result.is_err(), "coefficient row narrower than the feature space must fail");
    }

    #[test]
    fn paired_artifacts_must_carry_the_same_version() {
        let vectorizer = VectorizerArtifact {
            artifact_version: "v1".into(),
            vocabulary: [("cold".to_string(), 0)].into_iter().collect(),
            idf: vec![1.0],
        };
        let model = ModelArtifact {
            artifact_version: "v2".into(),
            classes: vec!["A".into()],
            coefficients: vec![vec![1.0]],
            intercepts: vec![0.0],
        };
        assert!(
            TfidfClassifier::from_artifacts(vectorizer, model).is_err(),
            "vectorizer v1 paired with model v2 must be rejected"
        );
    }

    #[test]
    fn keyword_classifier_applies_first_matching_rule() {
        let classifier = KeywordClassifier::new(
            &[("cold", "Food Quality Issue"), ("late", "Delivery Issue")],
            "App / Technical Issue",
        );
        assert_eq!(classifier.classify("food was cold and late"), "Food Quality Issue");
        assert_eq!(classifier.classify("LATE again"), "Delivery Issue");
        assert_eq!(classifier.classify("nothing matches"), "App / Technical Issue");
        assert_eq!(classifier.labels().len(), 3);
    }
}
