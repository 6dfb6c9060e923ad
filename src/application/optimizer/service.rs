use std::sync::Arc;

use crate::domain::DomainResult;
use crate::infrastructure::ai::AiClient;

/// Parameters of the charge to optimize. Missing values take the defaults
/// of a mid-size car on a public fast charger.
#[derive(Debug, Clone, Default)]
pub struct ChargingPlan {
    pub vehicle_type: Option<String>,
    pub battery_capacity: Option<String>,
    pub current_percentage: Option<String>,
    pub target_percentage: Option<String>,
    pub charger_type: Option<String>,
    pub charger_power: Option<String>,
    pub cost_per_kwh: Option<String>,
    pub peak_hours: Option<String>,
}

fn or<'a>(value: &'a Option<String>, default: &'a str) -> &'a str {
    value.as_deref().unwrap_or(default)
}

pub fn build_prompt(plan: &ChargingPlan) -> String {
    format!(
        "You are an advanced AI-powered EV Charging Optimization Engine.

Vehicle Type: {}
Battery Capacity (kWh): {}
Current Battery Level (%): {}
Target Battery Level (%): {}
Charger Type: {}
Charger Power Output (kW): {}
Electricity Cost per kWh (₹): {}
Peak Hours: {}

Analyze the above and provide a clear, well-formatted charging optimization report. Include:
1. Energy Required (kWh)
2. Estimated Charging Time
3. Estimated Cost (₹)
4. Peak Hour Analysis
5. Optimization Level (Low / Moderate / Highly Optimized)
6. Smart Recommendation for battery health and cost savings

Keep it concise, professional, and easy to read. Use plain text with clear headings. Do NOT use markdown code blocks or JSON format.",
        or(&plan.vehicle_type, "Car"),
        or(&plan.battery_capacity, "60"),
        or(&plan.current_percentage, "35"),
        or(&plan.target_percentage, "80"),
        or(&plan.charger_type, "Fast"),
        or(&plan.charger_power, "150"),
        or(&plan.cost_per_kwh, "8"),
        or(&plan.peak_hours, "6 PM – 10 PM"),
    )
}

pub struct OptimizerService {
    ai: Arc<AiClient>,
}

impl OptimizerService {
    pub fn new(ai: Arc<AiClient>) -> Self {
        Self { ai }
    }

    /// Ask the AI backend for a plain-text optimization report.
    pub async fn optimize(&self, plan: &ChargingPlan) -> DomainResult<String> {
        self.ai.generate(&build_prompt(plan)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use crate::infrastructure::ai::AiConfig;

    #[test]
    fn prompt_uses_defaults_for_missing_fields() {
        let prompt = build_prompt(&ChargingPlan::default());
        assert!(prompt.starts_with("You are an advanced AI-powered EV Charging Optimization Engine."));
        assert!(prompt.contains("Vehicle Type: Car\n"));
        assert!(prompt.contains("Battery Capacity (kWh): 60\n"));
        assert!(prompt.contains("Current Battery Level (%): 35\n"));
        assert!(prompt.contains("Target Battery Level (%): 80\n"));
        assert!(prompt.contains("Charger Power Output (kW): 150\n"));
        assert!(prompt.contains("Peak Hours: 6 PM – 10 PM\n"));
        assert!(prompt.contains("6. Smart Recommendation"));
    }

    #[test]
    fn prompt_uses_supplied_values() {
        let prompt = build_prompt(&ChargingPlan {
            vehicle_type: Some("Scooter".into()),
            battery_capacity: Some("3.5".into()),
            ..Default::default()
        });
        assert!(prompt.contains("Vehicle Type: Scooter\n"));
        assert!(prompt.contains("Battery Capacity (kWh): 3.5\n"));
        assert!(prompt.contains("Charger Type: Fast\n"));
    }

    #[tokio::test]
    async fn missing_key_is_reported() {
        let svc = OptimizerService::new(Arc::new(AiClient::new(AiConfig::default())));
        let err = svc.optimize(&ChargingPlan::default()).await.unwrap_err();
        assert!(matches!(err, DomainError::Internal(_)));
        assert_eq!(err.to_string(), "Server AI API key not configured.");
    }
}
