//! Benchmark variants: nama + seed event

use chrono::Utc;
use uuid::Uuid;

use crate::model::{Envelope, SubscriptionType, UserRegisteredEvent};

#[derive(Debug, Clone)]
pub struct Variant {
    pub name: String,
    pub seed: UserRegisteredEvent,
}

impl Variant {
    pub fn new(name: impl Into<String>, seed: UserRegisteredEvent) -> Self {
        Self {
            name: name.into(),
            seed,
        }
    }
}

/// Empat variant default, satu user id bersama
pub fn default_variants() -> Vec<Variant> {
    let user_id = Uuid::new_v4();
    let seed = |last_name: &str, tier: SubscriptionType, score: f64| {
        UserRegisteredEvent::new(
            user_id,
            "John",
            last_name,
            true,
            tier,
            Utc::now(),
            score,
            Envelope::new(),
        )
    };

    vec![
        Variant::new("free", seed("Freeman", SubscriptionType::Free, 9.2)),
        Variant::new("lite", seed("Litewski", SubscriptionType::Lite, 7.2)),
        Variant::new("free-low-score", seed("Lowell", SubscriptionType::Free, 1.0)),
        Variant::new("pro", seed("Provenzano", SubscriptionType::Pro, 9.0)),
    ]
}
