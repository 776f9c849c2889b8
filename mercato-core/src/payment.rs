use async_trait::async_trait;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Verdict returned by the payment boundary for an order total.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentOutcome {
    Approved,
    Declined,
    Error,
}

/// Single-call payment boundary.
///
/// A real gateway integration replaces the stand-in without touching the
/// order workflow.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Submit the order total and return the gateway's verdict.
    async fn authorize(&self, amount: Decimal) -> PaymentOutcome;
}

/// Stand-in gateway drawing uniformly from the three outcomes.
pub struct RandomPaymentGateway;

#[async_trait]
impl PaymentGateway for RandomPaymentGateway {
    async fn authorize(&self, _amount: Decimal) -> PaymentOutcome {
        const OUTCOMES: [PaymentOutcome; 3] = [
            PaymentOutcome::Approved,
            PaymentOutcome::Declined,
            PaymentOutcome::Error,
        ];
        OUTCOMES[rand::thread_rng().gen_range(0..OUTCOMES.len())]
    }
}

/// Gateway that always answers the configured outcome. Used by tests and
/// local demos that need a deterministic checkout.
pub struct FixedPaymentGateway {
    outcome: PaymentOutcome,
}

impl FixedPaymentGateway {
    pub fn new(outcome: PaymentOutcome) -> Self {
        Self { outcome }
    }
}

#[async_trait]
impl PaymentGateway for FixedPaymentGateway {
    async fn authorize(&self, _amount: Decimal) -> PaymentOutcome {
        self.outcome
    }
}
