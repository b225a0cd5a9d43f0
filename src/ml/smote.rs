//! Synthetic minority oversampling.
//!
//! Every class is topped up to the size of the largest one. A synthetic row is
//! placed at a random point on the segment between a real minority row and one
//! of its `k` nearest same-class neighbours.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::ModelError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Smote {
    pub k_neighbors: usize,
    pub seed: u64,
}

impl Default for Smote {
    fn default() -> Self {
        Self {
            k_neighbors: 5,
            seed: 42,
        }
    }
}

impl Smote {
    /// Return the input rows followed by the synthetic rows, with labels.
    pub fn fit_resample(
        &self,
        x: &[Vec<f64>],
        y: &[usize],
        n_classes: usize,
    ) -> Result<(Vec<Vec<f64>>, Vec<usize>), ModelError> {
        if x.is_empty() {
            return Err(ModelError::EmptyInput("oversampling"));
        }
        if x.len() != y.len() {
            return Err(ModelError::LengthMismatch {
                features: x.len(),
                labels: y.len(),
            });
        }
        if self.k_neighbors == 0 {
            return Err(ModelError::InvalidParameter(
                "k_neighbors must be at least 1".into(),
            ));
        }

        let mut members: Vec<Vec<usize>> = vec![Vec::new(); n_classes];
        for (i, &label) in y.iter().enumerate() {
            if label >= n_classes {
                return Err(ModelError::LabelOutOfRange { label, n_classes });
            }
            members[label].push(i);
        }
        let target = members.iter().map(Vec::len).max().unwrap_or(0);

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut out_x = x.to_vec();
        let mut out_y = y.to_vec();

        for (class, idx) in members.iter().enumerate() {
            // absent classes cannot be synthesized
            if idx.is_empty() || idx.len() >= target {
                continue;
            }
            let needed = target - idx.len();
            let neighbours = nearest_neighbours(x, idx, self.k_neighbors);

            for _ in 0..needed {
                let pick = rng.gen_range(0..idx.len());
                let base = &x[idx[pick]];
                let row = match neighbours[pick].len() {
                    0 => base.clone(),
                    len => {
                        let other = &x[neighbours[pick][rng.gen_range(0..len)]];
                        let gap: f64 = rng.gen();
                        base.iter()
                            .zip(other)
                            .map(|(a, b)| a + gap * (b - a))
                            .collect()
                    }
                };
                out_x.push(row);
                out_y.push(class);
            }

            tracing::debug!(class, original = idx.len(), synthesized = needed, "Oversampled class");
        }

        Ok((out_x, out_y))
    }
}

/// For each member, the row indices of its `k` closest other members.
fn nearest_neighbours(x: &[Vec<f64>], members: &[usize], k: usize) -> Vec<Vec<usize>> {
    let k = k.min(members.len().saturating_sub(1));
    members
        .iter()
        .map(|&i| {
            let mut dists: Vec<(f64, usize)> = members
                .iter()
                .filter(|&&j| j != i)
                .map(|&j| (squared_distance(&x[i], &x[j]), j))
                .collect();
            if k < dists.len() {
                dists.select_nth_unstable_by(k, |a, b| a.0.total_cmp(&b.0));
                dists.truncate(k);
            }
            dists.into_iter().map(|(_, j)| j).collect()
        })
        .collect()
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(p, q)| (p - q) * (p - q)).sum()
}
