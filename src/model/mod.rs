pub mod artifact;
pub mod composite;
pub mod error;
pub mod normalize;
pub mod sine_regression;
pub mod trainer;

/// Maps a day index to a predicted value.
pub trait DayPredictor {
    fn predict(&self, day: f64) -> f64;

    fn predict_many(&self, days: &[f64]) -> Vec<f64> {
        days.iter().map(|d| self.predict(*d)).collect()
    }
}
