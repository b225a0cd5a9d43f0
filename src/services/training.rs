//! Offline training: load the labeled CSV, bin the replacement score into
//! risk categories, split, fit the pipeline, evaluate on the holdout and
//! persist the artifact.
//!
//! Each stage takes and returns plain data so it can be exercised on its own.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::path::Path;
use strum::IntoEnumIterator;
use tracing::{info, warn};

use crate::config::TrainConfig;
use crate::ml::forest::ForestParams;
use crate::ml::pipeline::RiskPipeline;
use crate::ml::smote::Smote;
use crate::ml::ModelError;
use crate::models::job::{JobRecord, RiskCategory, FEATURE_COLUMNS};

/// Continuous score the category is derived from.
pub const SCORE_COLUMN: &str = "ai_replacement_score";

/// Row identifier, never used as a feature.
pub const ID_COLUMN: &str = "job_id";

/// Fraction of the score range the lowest bin edge is pushed down by, so the
/// minimum score falls inside the first (left-open) bin.
const EDGE_ADJUSTMENT: f64 = 0.001;

/// A historical job record with its continuous replacement score.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledJob {
    pub record: JobRecord,
    pub score: f64,
}

/// Row indices of the two partitions.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassReport {
    pub label: RiskCategory,
    pub support: usize,
    pub precision: f64,
    pub recall: f64,
}

/// Holdout metrics.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub accuracy: f64,
    /// `confusion[actual][predicted]`
    pub confusion: [[usize; RiskCategory::COUNT]; RiskCategory::COUNT],
    pub per_class: Vec<ClassReport>,
}

#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub class_counts: [usize; RiskCategory::COUNT],
    pub train_rows: usize,
    pub test_rows: usize,
    pub evaluation: Evaluation,
}

/// Read a labeled dataset. Columns are matched by header name; `job_id` and
/// any column outside the feature schema are ignored.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Vec<LabeledJob>, TrainingError> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path.as_ref())?;
    read_dataset(reader)
}

pub fn read_dataset<R: std::io::Read>(
    mut reader: csv::Reader<R>,
) -> Result<Vec<LabeledJob>, TrainingError> {
    let headers = reader.headers()?.clone();
    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| TrainingError::MissingColumn(name.to_string()))
    };

    let mut columns = [0usize; FEATURE_COLUMNS.len()];
    for (slot, name) in columns.iter_mut().zip(FEATURE_COLUMNS) {
        *slot = position(name)?;
    }
    let score_col = position(SCORE_COLUMN)?;

    let ignored: Vec<&str> = headers
        .iter()
        .filter(|h| *h != SCORE_COLUMN && *h != ID_COLUMN && !FEATURE_COLUMNS.contains(h))
        .collect();
    if !ignored.is_empty() {
        warn!(columns = ?ignored, "Ignoring columns outside the feature schema");
    }

    let mut rows = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result?;
        // header is line 1
        let line = i + 2;
        let cell = |col: usize| record.get(col).unwrap_or("");
        let field = |n: usize| Cell {
            line,
            column: FEATURE_COLUMNS[n],
            value: cell(columns[n]),
        };

        let job = JobRecord {
            job_role: field(0).text()?,
            industry: field(1).text()?,
            country: field(2).text()?,
            year: field(3).int()?,
            automation_risk_percent: field(4).float()?,
            skill_gap_index: field(5).float()?,
            salary_before_usd: field(6).float()?,
            salary_after_usd: field(7).float()?,
            salary_change_percent: field(8).float()?,
            skill_demand_growth_percent: field(9).float()?,
            remote_feasibility_score: field(10).float()?,
            ai_adoption_level: field(11).float()?,
            education_requirement_level: field(12).int()?,
        };
        let score = Cell {
            line,
            column: SCORE_COLUMN,
            value: cell(score_col),
        }
        .float()?;

        rows.push(LabeledJob { record: job, score });
    }

    if rows.is_empty() {
        return Err(TrainingError::EmptyDataset);
    }
    info!(rows = rows.len(), "Dataset loaded");
    Ok(rows)
}

struct Cell<'a> {
    line: usize,
    column: &'static str,
    value: &'a str,
}

impl Cell<'_> {
    fn invalid(&self) -> TrainingError {
        TrainingError::InvalidCell {
            line: self.line,
            column: self.column,
            value: self.value.to_string(),
        }
    }

    fn text(&self) -> Result<String, TrainingError> {
        if self.value.is_empty() {
            return Err(self.invalid());
        }
        Ok(self.value.to_string())
    }

    fn float(&self) -> Result<f64, TrainingError> {
        match self.value.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(self.invalid()),
        }
    }

    /// Integers may be written with a zero fractional part ("3.0").
    fn int(&self) -> Result<i32, TrainingError> {
        if let Ok(v) = self.value.parse::<i32>() {
            return Ok(v);
        }
        match self.value.parse::<f64>() {
            Ok(v) if v.fract() == 0.0 && v.abs() <= f64::from(i32::MAX) => Ok(v as i32),
            _ => Err(self.invalid()),
        }
    }
}

/// Bin scores into three equal-width intervals over `[min, max]`.
///
/// Bins are right-closed; the lowest edge is lowered by 0.1% of the range so
/// the minimum itself is `Low`. Every category must end up with at least two
/// rows, otherwise a stratified split is impossible.
pub fn derive_target(scores: &[f64]) -> Result<Vec<RiskCategory>, TrainingError> {
    if scores.is_empty() {
        return Err(TrainingError::EmptyDataset);
    }
    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if !range.is_finite() || range <= 0.0 {
        return Err(TrainingError::DegenerateTarget { min, max });
    }

    let width = range / RiskCategory::COUNT as f64;
    let low_edge = min + width;
    let high_edge = min + 2.0 * width;
    tracing::debug!(
        lowest = min - range * EDGE_ADJUSTMENT,
        low_edge,
        high_edge,
        highest = max,
        "Target bin edges"
    );

    let labels: Vec<RiskCategory> = scores
        .iter()
        .map(|&s| {
            if s <= low_edge {
                RiskCategory::Low
            } else if s <= high_edge {
                RiskCategory::Medium
            } else {
                RiskCategory::High
            }
        })
        .collect();

    let counts = class_counts(&labels);
    for category in RiskCategory::iter() {
        let count = counts[category.index()];
        if count < 2 {
            return Err(TrainingError::InsufficientClass { category, count });
        }
    }
    info!(
        low = counts[0],
        medium = counts[1],
        high = counts[2],
        "Target derived"
    );
    Ok(labels)
}

pub fn class_counts(labels: &[RiskCategory]) -> [usize; RiskCategory::COUNT] {
    let mut counts = [0; RiskCategory::COUNT];
    for label in labels {
        counts[label.index()] += 1;
    }
    counts
}

/// Stratified holdout split: each class contributes `round(n * test_size)`
/// rows to the test partition, at least one and never all of them.
pub fn stratified_split(
    labels: &[RiskCategory],
    test_size: f64,
    seed: u64,
) -> Result<Split, TrainingError> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(TrainingError::InvalidTestSize(test_size));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for category in RiskCategory::iter() {
        let mut members: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, l)| **l == category)
            .map(|(i, _)| i)
            .collect();
        if members.len() < 2 {
            return Err(TrainingError::InsufficientClass {
                category,
                count: members.len(),
            });
        }
        members.shuffle(&mut rng);
        let n_test = ((members.len() as f64 * test_size).round() as usize)
            .clamp(1, members.len() - 1);
        test.extend_from_slice(&members[..n_test]);
        train.extend_from_slice(&members[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok(Split { train, test })
}

/// Fit encoder, oversampler and forest on the training partition.
pub fn fit_pipeline(
    records: &[JobRecord],
    labels: &[RiskCategory],
    config: &TrainConfig,
) -> Result<RiskPipeline, TrainingError> {
    let smote = Smote {
        k_neighbors: config.smote_k_neighbors,
        seed: config.seed,
    };
    let forest = ForestParams {
        n_estimators: config.n_estimators,
        max_depth: config.max_depth,
        min_samples_split: 2,
        seed: config.seed,
    };
    Ok(RiskPipeline::fit(records, labels, smote, forest)?)
}

/// Score the pipeline on rows it was not trained on.
pub fn evaluate(
    pipeline: &RiskPipeline,
    records: &[JobRecord],
    labels: &[RiskCategory],
) -> Result<Evaluation, TrainingError> {
    if records.is_empty() {
        return Err(TrainingError::EmptyDataset);
    }

    let mut confusion = [[0usize; RiskCategory::COUNT]; RiskCategory::COUNT];
    for (record, actual) in records.iter().zip(labels) {
        let predicted = pipeline.predict(record)?.label;
        confusion[actual.index()][predicted.index()] += 1;
    }

    let correct: usize = (0..RiskCategory::COUNT).map(|i| confusion[i][i]).sum();
    let per_class = RiskCategory::iter()
        .map(|label| {
            let i = label.index();
            let support: usize = confusion[i].iter().sum();
            let predicted: usize = confusion.iter().map(|row| row[i]).sum();
            ClassReport {
                label,
                support,
                precision: ratio(confusion[i][i], predicted),
                recall: ratio(confusion[i][i], support),
            }
        })
        .collect();

    Ok(Evaluation {
        accuracy: ratio(correct, records.len()),
        confusion,
        per_class,
    })
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn select<T: Clone>(items: &[T], idx: &[usize]) -> Vec<T> {
    idx.iter().map(|&i| items[i].clone()).collect()
}

/// Train on an in-memory dataset without touching the filesystem.
pub fn train(
    dataset: &[LabeledJob],
    config: &TrainConfig,
) -> Result<(RiskPipeline, TrainingReport), TrainingError> {
    let scores: Vec<f64> = dataset.iter().map(|row| row.score).collect();
    let labels = derive_target(&scores)?;
    let records: Vec<JobRecord> = dataset.iter().map(|row| row.record.clone()).collect();

    let split = stratified_split(&labels, config.test_size, config.seed)?;
    info!(
        train = split.train.len(),
        test = split.test.len(),
        "Stratified split"
    );

    let train_records = select(&records, &split.train);
    let train_labels = select(&labels, &split.train);
    let mut pipeline = fit_pipeline(&train_records, &train_labels, config)?;

    let test_records = select(&records, &split.test);
    let test_labels = select(&labels, &split.test);
    let evaluation = evaluate(&pipeline, &test_records, &test_labels)?;

    pipeline.metadata.holdout_rows = test_records.len();
    pipeline.metadata.holdout_accuracy = Some(evaluation.accuracy);

    let report = TrainingReport {
        class_counts: class_counts(&labels),
        train_rows: split.train.len(),
        test_rows: split.test.len(),
        evaluation,
    };
    Ok((pipeline, report))
}

/// Load, train, evaluate and save. Nothing is written unless every stage succeeds.
pub fn run(
    dataset_path: impl AsRef<Path>,
    model_path: impl AsRef<Path>,
    config: &TrainConfig,
) -> Result<TrainingReport, TrainingError> {
    let dataset = load_dataset(dataset_path)?;
    let (pipeline, report) = train(&dataset, config)?;
    pipeline.save(model_path.as_ref())?;

    info!(
        path = %model_path.as_ref().display(),
        model_id = %pipeline.metadata.model_id,
        accuracy = report.evaluation.accuracy,
        "Model trained and saved"
    );
    Ok(report)
}

#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dataset is missing required column '{0}'")]
    MissingColumn(String),

    #[error("Invalid value {value:?} for column '{column}' on line {line}")]
    InvalidCell {
        line: usize,
        column: &'static str,
        value: String,
    },

    #[error("Dataset has no rows")]
    EmptyDataset,

    #[error("Replacement score has no spread to bin (min {min}, max {max})")]
    DegenerateTarget { min: f64, max: f64 },

    #[error("Category {category} has {count} rows; at least 2 are needed to stratify")]
    InsufficientClass { category: RiskCategory, count: usize },

    #[error("test_size must be strictly between 0 and 1, got {0}")]
    InvalidTestSize(f64),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}
