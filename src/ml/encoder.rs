//! Column transform: one-hot blocks for categorical columns followed by the
//! numeric columns unchanged.
//!
//! Categories never seen while fitting encode to an all-zero block instead of
//! failing, so a record naming a new role, industry or country still yields a
//! prediction driven by its numeric features.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::ModelError;
use crate::models::job::{JobRecord, CATEGORICAL_COLUMNS, NUMERIC_COLUMNS};

/// Learned vocabulary for one categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalColumn {
    pub name: String,
    /// Sorted, deduplicated.
    pub categories: Vec<String>,
}

impl CategoricalColumn {
    fn position(&self, value: &str) -> Option<usize> {
        self.categories
            .binary_search_by(|c| c.as_str().cmp(value))
            .ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureEncoder {
    categorical: Vec<CategoricalColumn>,
    numeric: Vec<String>,
}

impl FeatureEncoder {
    /// Learn category vocabularies from the training rows.
    pub fn fit(records: &[JobRecord]) -> Result<Self, ModelError> {
        if records.is_empty() {
            return Err(ModelError::EmptyInput("encoder fit"));
        }

        let categorical = CATEGORICAL_COLUMNS
            .iter()
            .map(|&name| {
                let categories: BTreeSet<&str> = records
                    .iter()
                    .filter_map(|r| r.categorical(name))
                    .collect();
                CategoricalColumn {
                    name: name.to_string(),
                    categories: categories.into_iter().map(str::to_string).collect(),
                }
            })
            .collect();

        Ok(Self {
            categorical,
            numeric: NUMERIC_COLUMNS.iter().map(|c| c.to_string()).collect(),
        })
    }

    /// Width of an encoded row.
    pub fn n_features(&self) -> usize {
        self.categorical
            .iter()
            .map(|c| c.categories.len())
            .sum::<usize>()
            + self.numeric.len()
    }

    pub fn columns(&self) -> &[CategoricalColumn] {
        &self.categorical
    }

    /// Output column names, `column=value` for one-hot slots.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.n_features());
        for column in &self.categorical {
            for category in &column.categories {
                names.push(format!("{}={}", column.name, category));
            }
        }
        names.extend(self.numeric.iter().cloned());
        names
    }

    /// Encode one record. Columns are looked up by name.
    pub fn transform(&self, record: &JobRecord) -> Result<Vec<f64>, ModelError> {
        let mut row = vec![0.0; self.n_features()];
        let mut offset = 0;

        for column in &self.categorical {
            let value = record
                .categorical(&column.name)
                .ok_or_else(|| ModelError::UnknownColumn(column.name.clone()))?;
            if let Some(pos) = column.position(value) {
                row[offset + pos] = 1.0;
            }
            offset += column.categories.len();
        }

        for (i, name) in self.numeric.iter().enumerate() {
            let value = record
                .numeric(name)
                .ok_or_else(|| ModelError::UnknownColumn(name.clone()))?;
            if !value.is_finite() {
                return Err(ModelError::NonFinite(name.clone()));
            }
            row[offset + i] = value;
        }

        Ok(row)
    }

    pub fn transform_all(&self, records: &[JobRecord]) -> Result<Vec<Vec<f64>>, ModelError> {
        records.iter().map(|r| self.transform(r)).collect()
    }
}
