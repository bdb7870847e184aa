//! Per-column z-score normalization.

use crate::model::error::ModelError;

/// Retains a sample together with its per-column mean and standard deviation.
///
/// Standard deviations of zero are clamped to `1.0`, so constant columns normalize to zero
/// instead of dividing by zero.
///
/// For fine-tuning, the statistics computed from new observations are replaced with the
/// baseline model's via [`Normalizer::with_statistics`], which expresses the new sample on
/// the scale the baseline was trained on.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalizer {
    data: Vec<Vec<f64>>,
    mean: Vec<f64>,
    std_dev: Vec<f64>,
}

impl Normalizer {
    /// Computes column statistics for `rows`. Every row must have the same width.
    pub fn new(rows: &[Vec<f64>]) -> Result<Self, ModelError> {
        let width = rows.first().map(Vec::len).ok_or(ModelError::EmptySample)?;
        if width == 0 {
            return Err(ModelError::EmptySample);
        }
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(ModelError::RaggedSample {
                row,
                expected: width,
                found: r.len(),
            });
        }

        let n = rows.len() as f64;
        let mean: Vec<f64> = (0..width)
            .map(|c| rows.iter().map(|r| r[c]).sum::<f64>() / n)
            .collect();
        // Population standard deviation
        let std_dev: Vec<f64> = (0..width)
            .map(|c| {
                let variance = rows.iter().map(|r| (r[c] - mean[c]).powi(2)).sum::<f64>() / n;
                clamp_std(variance.sqrt())
            })
            .collect();

        Ok(Self {
            data: rows.to_vec(),
            mean,
            std_dev,
        })
    }

    /// Convenience constructor for a single column.
    pub fn from_column(values: &[f64]) -> Result<Self, ModelError> {
        let rows: Vec<Vec<f64>> = values.iter().map(|v| vec![*v]).collect();
        Self::new(&rows)
    }

    /// Replaces the computed statistics with externally supplied ones.
    pub fn with_statistics(
        mut self,
        mean: Vec<f64>,
        std_dev: Vec<f64>,
    ) -> Result<Self, ModelError> {
        let width = self.mean.len();
        for found in [mean.len(), std_dev.len()] {
            if found != width {
                return Err(ModelError::StatisticsWidth {
                    expected: width,
                    found,
                });
            }
        }
        self.mean = mean;
        self.std_dev = std_dev.into_iter().map(clamp_std).collect();
        Ok(self)
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn std_dev(&self) -> &[f64] {
        &self.std_dev
    }

    /// The retained sample expressed as `(x - mean) / std_dev`.
    pub fn normalize(&self) -> Vec<Vec<f64>> {
        self.data
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(c, v)| (v - self.mean[c]) / self.std_dev[c])
                    .collect()
            })
            .collect()
    }

    /// Inverse of [`Normalizer::normalize`].
    ///
    /// With `columns`, each row of `normalized` holds one value per listed column and is
    /// mapped back with those columns' statistics.
    pub fn denormalize(
        &self,
        normalized: &[Vec<f64>],
        columns: Option<&[usize]>,
    ) -> Result<Vec<Vec<f64>>, ModelError> {
        let width = self.mean.len();
        let columns: Vec<usize> = match columns {
            Some(columns) => {
                if let Some(&column) = columns.iter().find(|&&c| c >= width) {
                    return Err(ModelError::ColumnOutOfRange { column, width });
                }
                columns.to_vec()
            }
            None => (0..width).collect(),
        };

        normalized
            .iter()
            .enumerate()
            .map(|(row, values)| {
                if values.len() != columns.len() {
                    return Err(ModelError::RaggedSample {
                        row,
                        expected: columns.len(),
                        found: values.len(),
                    });
                }
                Ok(values
                    .iter()
                    .zip(&columns)
                    .map(|(v, &c)| v * self.std_dev[c] + self.mean[c])
                    .collect())
            })
            .collect()
    }
}

fn clamp_std(std_dev: f64) -> f64 {
    if std_dev == 0.0 {
        1.0
    } else {
        std_dev
    }
}
