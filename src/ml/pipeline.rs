//! The trained artifact: fitted encoder, forest and class ordering, plus
//! metadata about the run that produced it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use uuid::Uuid;

use super::encoder::FeatureEncoder;
use super::forest::{argmax, ForestParams, RandomForest};
use super::smote::Smote;
use super::ModelError;
use crate::models::job::{JobRecord, RiskCategory};
use crate::models::prediction::PredictResponse;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub model_id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub n_estimators: usize,
    /// Rows in the training partition before oversampling.
    pub train_rows: usize,
    /// Rows the forest was fit on, after oversampling.
    pub resampled_rows: usize,
    pub holdout_rows: usize,
    pub holdout_accuracy: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskPipeline {
    encoder: FeatureEncoder,
    forest: RandomForest,
    /// Class index to label, in forest output order.
    classes: Vec<RiskCategory>,
    pub metadata: ArtifactMetadata,
}

/// One inference result.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: RiskCategory,
    /// Probability per class, in `classes()` order.
    pub probabilities: Vec<(RiskCategory, f64)>,
}

impl Prediction {
    pub fn into_response(self) -> PredictResponse {
        PredictResponse {
            prediction: self.label,
            class_probabilities: self
                .probabilities
                .into_iter()
                .map(|(c, p)| (c.to_string(), p))
                .collect::<BTreeMap<_, _>>(),
        }
    }
}

impl RiskPipeline {
    /// Encode, oversample the training rows, then fit the forest.
    pub fn fit(
        records: &[JobRecord],
        labels: &[RiskCategory],
        smote: Smote,
        forest: ForestParams,
    ) -> Result<Self, ModelError> {
        if records.len() != labels.len() {
            return Err(ModelError::LengthMismatch {
                features: records.len(),
                labels: labels.len(),
            });
        }

        let encoder = FeatureEncoder::fit(records)?;
        let x = encoder.transform_all(records)?;
        let y: Vec<usize> = labels.iter().map(|c| c.index()).collect();

        let (x_res, y_res) = smote.fit_resample(&x, &y, RiskCategory::COUNT)?;
        tracing::info!(
            before = x.len(),
            after = x_res.len(),
            features = encoder.n_features(),
            "Training partition oversampled"
        );

        let model = RandomForest::fit(&x_res, &y_res, RiskCategory::COUNT, forest)?;

        Ok(Self {
            encoder,
            forest: model,
            classes: RiskCategory::all(),
            metadata: ArtifactMetadata {
                model_id: Uuid::new_v4(),
                trained_at: Utc::now(),
                n_estimators: forest.n_estimators,
                train_rows: x.len(),
                resampled_rows: x_res.len(),
                holdout_rows: 0,
                holdout_accuracy: None,
            },
        })
    }

    pub fn predict(&self, record: &JobRecord) -> Result<Prediction, ModelError> {
        let row = self.encoder.transform(record)?;
        let proba = self.forest.predict_proba(&row)?;
        let label = self.classes[argmax(&proba)];
        Ok(Prediction {
            label,
            probabilities: self.classes.iter().copied().zip(proba).collect(),
        })
    }

    pub fn classes(&self) -> &[RiskCategory] {
        &self.classes
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    pub fn n_features(&self) -> usize {
        self.encoder.n_features()
    }

    /// Write the artifact as JSON. The file appears only once fully written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let path = path.as_ref();
        let tmp = path.with_extension("tmp");
        let written = self
            .write_to(&tmp)
            .and_then(|()| fs::rename(&tmp, path).map_err(ModelError::from));
        if written.is_err() {
            // never leave a partial artifact behind
            let _ = fs::remove_file(&tmp);
        }
        written
    }

    fn write_to(&self, path: &Path) -> Result<(), ModelError> {
        let mut file = fs::File::create(path)?;
        serde_json::to_writer(&mut file, self)?;
        file.flush()?;
        file.sync_all()?;
        Ok(())
    }

    /// Read and structurally check an artifact.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let bytes = fs::read(path.as_ref())?;
        let pipeline: Self = serde_json::from_slice(&bytes)?;
        pipeline.validate()?;
        Ok(pipeline)
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.classes != RiskCategory::all() {
            return Err(ModelError::Corrupt(format!(
                "unexpected class ordering {:?}",
                self.classes
            )));
        }
        if self.forest.n_classes() != self.classes.len() {
            return Err(ModelError::Corrupt("forest/class count mismatch".into()));
        }
        if self.forest.n_features() != self.encoder.n_features() {
            return Err(ModelError::Corrupt(format!(
                "encoder yields {} features, forest expects {}",
                self.encoder.n_features(),
                self.forest.n_features()
            )));
        }
        self.forest.validate()
    }
}
