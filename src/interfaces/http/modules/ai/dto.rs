use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

use crate::application::optimizer::ChargingPlan;

/// Every field accepts a number or a string. Missing, empty or zero values
/// fall back to the defaults.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRequest {
    #[schema(value_type = Option<String>, example = "Car")]
    pub vehicle_type: Option<Value>,
    #[schema(value_type = Option<f64>, example = 60)]
    pub battery_capacity: Option<Value>,
    #[schema(value_type = Option<f64>, example = 35)]
    pub current_percentage: Option<Value>,
    #[schema(value_type = Option<f64>, example = 80)]
    pub target_percentage: Option<Value>,
    #[schema(value_type = Option<String>, example = "Fast")]
    pub charger_type: Option<Value>,
    #[schema(value_type = Option<f64>, example = 150)]
    pub charger_power: Option<Value>,
    #[schema(value_type = Option<f64>, example = 8)]
    pub cost_per_kwh: Option<Value>,
    #[schema(value_type = Option<String>, example = "6 PM – 10 PM")]
    pub peak_hours: Option<Value>,
}

fn as_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

impl From<OptimizeRequest> for ChargingPlan {
    fn from(r: OptimizeRequest) -> Self {
        Self {
            vehicle_type: as_text(r.vehicle_type),
            battery_capacity: as_text(r.battery_capacity),
            current_percentage: as_text(r.current_percentage),
            target_percentage: as_text(r.target_percentage),
            charger_type: as_text(r.charger_type),
            charger_power: as_text(r.charger_power),
            cost_per_kwh: as_text(r.cost_per_kwh),
            peak_hours: as_text(r.peak_hours),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OptimizeResponse {
    /// Plain-text optimization report
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_and_strings_both_become_text() {
        let request: OptimizeRequest = serde_json::from_value(json!({
            "vehicleType": "SUV",
            "batteryCapacity": 75,
            "currentPercentage": "20",
            "chargerPower": 7.4,
            "costPerKwh": 0,
            "peakHours": ""
        }))
        .unwrap();
        let plan = ChargingPlan::from(request);

        assert_eq!(plan.vehicle_type.as_deref(), Some("SUV"));
        assert_eq!(plan.battery_capacity.as_deref(), Some("75"));
        assert_eq!(plan.current_percentage.as_deref(), Some("20"));
        assert_eq!(plan.charger_power.as_deref(), Some("7.4"));
        assert_eq!(plan.cost_per_kwh, None);
        assert_eq!(plan.peak_hours, None);
        assert_eq!(plan.target_percentage, None);
    }
}
