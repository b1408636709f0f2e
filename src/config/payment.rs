//! Payment configuration

use serde::Deserialize;

use crate::application::handlers::billing::GatewayPlanIds;

use super::error::ValidationError;

/// Payment configuration (Razorpay)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentConfig {
    /// Razorpay key id (rzp_test_... or rzp_live_...)
    pub razorpay_key_id: String,

    /// Razorpay key secret; also signs the hosted checkout callback
    pub razorpay_key_secret: String,

    /// Webhook signing secret
    pub razorpay_webhook_secret: String,

    /// Razorpay plan id for pro monthly billing
    #[serde(default)]
    pub razorpay_plan_pro_monthly: String,

    /// Razorpay plan id for pro yearly billing
    #[serde(default)]
    pub razorpay_plan_pro_yearly: String,

    /// Razorpay plan id for enterprise monthly billing
    #[serde(default)]
    pub razorpay_plan_enterprise_monthly: String,

    /// Razorpay plan id for enterprise yearly billing
    #[serde(default)]
    pub razorpay_plan_enterprise_yearly: String,
}

impl PaymentConfig {
    /// Check if using Razorpay test mode
    pub fn is_test_mode(&self) -> bool {
        self.razorpay_key_id.starts_with("rzp_test_")
    }

    /// Check if using Razorpay live mode
    pub fn is_live_mode(&self) -> bool {
        self.razorpay_key_id.starts_with("rzp_live_")
    }

    /// Gateway plan ids keyed by catalog slug and cycle
    pub fn gateway_plan_ids(&self) -> GatewayPlanIds {
        GatewayPlanIds {
            pro_monthly: self.razorpay_plan_pro_monthly.clone(),
            pro_yearly: self.razorpay_plan_pro_yearly.clone(),
            enterprise_monthly: self.razorpay_plan_enterprise_monthly.clone(),
            enterprise_yearly: self.razorpay_plan_enterprise_yearly.clone(),
        }
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.razorpay_key_id.is_empty() {
            return Err(ValidationError::MissingRequired("RAZORPAY_KEY_ID"));
        }
        if self.razorpay_key_secret.is_empty() {
            return Err(ValidationError::MissingRequired("RAZORPAY_KEY_SECRET"));
        }
        if self.razorpay_webhook_secret.is_empty() {
            return Err(ValidationError::InvalidWebhookSecret);
        }

        // Verify the key prefix so a publishable key can't slip in
        if !self.razorpay_key_id.starts_with("rzp_") {
            return Err(ValidationError::InvalidRazorpayKeyId);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> PaymentConfig {
        PaymentConfig {
            razorpay_key_id: "rzp_test_abc123".to_string(),
            razorpay_key_secret: "secret123".to_string(),
            razorpay_webhook_secret: "whsec_xyz".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_is_test_mode() {
        let config = valid_config();
        assert!(config.is_test_mode());
        assert!(!config.is_live_mode());
    }

    #[test]
    fn test_is_live_mode() {
        let config = PaymentConfig {
            razorpay_key_id: "rzp_live_abc123".to_string(),
            ..valid_config()
        };
        assert!(config.is_live_mode());
        assert!(!config.is_test_mode());
    }

    #[test]
    fn test_validation_missing_key_id() {
        let config = PaymentConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_missing_webhook_secret() {
        let config = PaymentConfig {
            razorpay_webhook_secret: String::new(),
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_key_prefix() {
        let config = PaymentConfig {
            razorpay_key_id: "sk_test_abc123".to_string(),
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_gateway_plan_ids_mapping() {
        let config = PaymentConfig {
            razorpay_plan_pro_monthly: "plan_a".to_string(),
            razorpay_plan_pro_yearly: "plan_b".to_string(),
            ..valid_config()
        };
        let ids = config.gateway_plan_ids();
        assert_eq!(ids.pro_monthly, "plan_a");
        assert_eq!(ids.pro_yearly, "plan_b");
        assert!(ids.enterprise_monthly.is_empty());
    }
}
