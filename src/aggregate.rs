use crate::model::{RawSampleTable, SummaryMetadata, VehicleStats};

/// Per-vehicle mean and sample count, in ascending vehicle id order.
pub fn compute_stats(errors: &RawSampleTable) -> Vec<VehicleStats> {
    errors
        .iter()
        .filter(|(_, samples)| !samples.is_empty())
        .map(|(vehicle_id, samples)| VehicleStats {
            vehicle_id: vehicle_id.clone(),
            mean_error: mean(samples),
            sample_count: samples.len() as u64,
        })
        .collect()
}

/// Run-level metadata over the union of all samples, so vehicles with more
/// samples weigh more in the overall figures.
pub fn summarize(errors: &RawSampleTable) -> SummaryMetadata {
    let all_errors: Vec<f64> = errors.values().flatten().copied().collect();

    let (overall_mean, overall_max) = if all_errors.is_empty() {
        (None, None)
    } else {
        let max = all_errors.iter().copied().fold(f64::MIN, f64::max);
        (Some(mean(&all_errors)), Some(max))
    };

    SummaryMetadata {
        generated_at: None,
        total_entries: Some(all_errors.len() as u64),
        active_vehicles: Some(errors.values().filter(|samples| !samples.is_empty()).count() as u64),
        overall_mean,
        overall_max,
    }
}

pub fn reduce(errors: &RawSampleTable) -> (Vec<VehicleStats>, SummaryMetadata) {
    (compute_stats(errors), summarize(errors))
}

fn mean(samples: &[f64]) -> f64 {
    samples.iter().sum::<f64>() / samples.len() as f64
}
