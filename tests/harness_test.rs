//! End-to-end round-trip tests: pipeline + model + harness
//!
//! Usage:
//!   cargo test --test harness_test

use std::cell::Cell;
use std::collections::HashSet;
use std::num::NonZeroU64;

use chrono::Utc;
use uuid::Uuid;

use serde_speed::bench::{default_variants, Harness, RoundTripError, Variant};
use serde_speed::core::{RegistryError, Schema, SchemaRegistry};
use serde_speed::model::{
    millis_precision, Envelope, ModelError, SubscriptionType, UserRegisteredEvent, WireRecord, WireValue,
};
use serde_speed::protocol::{AvroCodec, CodecError, SchemaCodec, SerdeError, SerdePipeline};

const USER_REGISTERED: &str = include_str!("../schemas/user-registered.avsc");
const SUBJECT: &str = "input-topic-value";

fn schema() -> Schema {
    Schema::parse_str(USER_REGISTERED).unwrap()
}

fn runs(n: u64) -> NonZeroU64 {
    NonZeroU64::new(n).unwrap()
}

fn john(tier: SubscriptionType, score: f64) -> UserRegisteredEvent {
    UserRegisteredEvent::new(
        Uuid::new_v4(),
        "John",
        "Doe",
        true,
        tier,
        Utc::now(),
        score,
        Envelope::new(),
    )
}

#[test]
fn test_end_to_end_scenario() {
    let mut registry = SchemaRegistry::new();
    let mut harness = Harness::new(&mut registry, SerdePipeline::avro(SUBJECT, schema()), runs(3));
    let variant = Variant::new("free", john(SubscriptionType::Free, 9.2));

    let mut chain = vec![variant.seed.envelope.clone()];
    let report = harness
        .run_variant_with(&variant, |_, event| chain.push(event.envelope.clone()))
        .unwrap();

    // Seed + 3 iterasi, semua id berbeda
    assert_eq!(chain.len(), 4);
    let ids: HashSet<Uuid> = chain.iter().map(|e| e.envelope_id).collect();
    assert_eq!(ids.len(), 4);

    for pair in chain.windows(2) {
        assert_eq!(pair[1].parent_id, Some(pair[0].envelope_id));
    }

    assert_eq!(report.test_runs, 3);
    assert_eq!(report.last_event.envelope, chain[3]);
    let expected = 1.0 / report.per_message_secs();
    assert!((report.throughput().unwrap() - expected).abs() <= expected * 1e-12);
}

#[test]
fn test_long_lineage_chain() {
    let mut registry = SchemaRegistry::new();
    let mut harness = Harness::new(&mut registry, SerdePipeline::avro(SUBJECT, schema()), runs(200));
    let variant = Variant::new("pro", john(SubscriptionType::Pro, 9.0));

    let mut previous = variant.seed.envelope.envelope_id;
    let mut seen = HashSet::from([previous]);
    harness
        .run_variant_with(&variant, |_, event| {
            assert_eq!(event.envelope.parent_id, Some(previous));
            assert!(seen.insert(event.envelope.envelope_id), "envelope id reused");
            previous = event.envelope.envelope_id;
        })
        .unwrap();

    assert_eq!(seen.len(), 201);
}

#[test]
fn test_round_trip_preserves_event_at_millis() {
    let mut registry = SchemaRegistry::new();
    let mut pipeline = SerdePipeline::avro(SUBJECT, schema());
    let mut event = john(SubscriptionType::Lite, 7.2);
    event.envelope = Envelope::builder().parent_id(Uuid::new_v4()).build();

    let bytes = pipeline.encode(&mut registry, &event.to_wire()).unwrap();
    let back = UserRegisteredEvent::from_wire(&pipeline.decode(&registry, &bytes).unwrap()).unwrap();

    let mut expected = event.clone();
    expected.registration_timestamp = millis_precision(event.registration_timestamp);
    expected.envelope.event_timestamp = millis_precision(event.envelope.event_timestamp);
    assert_eq!(back, expected);
}

#[test]
fn test_reencode_is_bit_identical() {
    let mut registry = SchemaRegistry::new();
    let mut pipeline = SerdePipeline::avro(SUBJECT, schema());
    let event = john(SubscriptionType::Free, 1.0);

    let first = pipeline.encode(&mut registry, &event.to_wire()).unwrap();
    let decoded = UserRegisteredEvent::from_wire(&pipeline.decode(&registry, &first).unwrap()).unwrap();
    let second = pipeline.encode(&mut registry, &decoded.to_wire()).unwrap();
    let decoded_again =
        UserRegisteredEvent::from_wire(&pipeline.decode(&registry, &second).unwrap()).unwrap();
    let third = pipeline.encode(&mut registry, &decoded_again.to_wire()).unwrap();

    assert_eq!(first, second);
    assert_eq!(second, third);
}

#[test]
fn test_decode_with_desynced_registry() {
    let mut producer_registry = SchemaRegistry::new();
    let consumer_registry = SchemaRegistry::new();
    let mut pipeline = SerdePipeline::avro(SUBJECT, schema());

    let bytes = pipeline
        .encode(&mut producer_registry, &john(SubscriptionType::Free, 9.2).to_wire())
        .unwrap();

    assert_eq!(
        pipeline.decode(&consumer_registry, &bytes),
        Err(SerdeError::Registry(RegistryError::UnknownSchemaId(1)))
    );
}

#[test]
fn test_failing_variant_does_not_stop_siblings() {
    // Schema tanpa symbol PRO: variant "pro" gagal saat encode
    let narrow = USER_REGISTERED.replace(r#"["FREE", "LITE", "PRO"]"#, r#"["FREE", "LITE"]"#);
    assert_ne!(narrow, USER_REGISTERED);

    let mut registry = SchemaRegistry::new();
    let pipeline = SerdePipeline::avro(SUBJECT, Schema::parse_str(&narrow).unwrap());
    let mut harness = Harness::new(&mut registry, pipeline, runs(10));

    let variants = default_variants();
    let results = harness.run_all(&variants);
    assert_eq!(results.len(), 4);

    for (variant, result) in variants.iter().zip(&results) {
        if variant.name == "pro" {
            let err = result.as_ref().unwrap_err();
            assert_eq!(err.variant, "pro");
            assert_eq!(err.iteration, None);
            assert!(matches!(
                err.source,
                RoundTripError::Serde(SerdeError::Codec(CodecError::InField { .. }))
            ));
        } else {
            assert_eq!(result.as_ref().unwrap().test_runs, 10);
        }
    }
}

/// Codec yang merusak `subscription_type` mulai decode ke-`fail_on`
struct GoldCodec {
    decodes: Cell<u64>,
    fail_on: u64,
}

impl SchemaCodec for GoldCodec {
    fn encode(&self, schema: &Schema, value: &WireValue, out: &mut Vec<u8>) -> Result<(), CodecError> {
        AvroCodec.encode(schema, value, out)
    }

    fn decode(&self, schema: &Schema, bytes: &[u8]) -> Result<WireValue, CodecError> {
        let mut value = AvroCodec.decode(schema, bytes)?;
        self.decodes.set(self.decodes.get() + 1);
        if self.decodes.get() >= self.fail_on {
            if let Some(fields) = value.as_record_mut() {
                fields.insert("subscription_type".into(), WireValue::from("GOLD"));
            }
        }
        Ok(value)
    }
}

#[test]
fn test_error_reports_iteration() {
    let codec = GoldCodec {
        decodes: Cell::new(0),
        fail_on: 4,
    };
    let mut registry = SchemaRegistry::new();
    let mut harness = Harness::new(&mut registry, SerdePipeline::new(SUBJECT, schema(), codec), runs(10));
    let variant = Variant::new("free", john(SubscriptionType::Free, 9.2));

    let mut produced = 0;
    let err = harness
        .run_variant_with(&variant, |_, _| produced += 1)
        .unwrap_err();

    // decode 1 = warm-up, decode 2..4 = iterasi 0..2
    assert_eq!(err.iteration, Some(2));
    assert_eq!(produced, 2);
    assert_eq!(
        err.source,
        RoundTripError::Model(ModelError::InvalidEnumeration {
            field: "subscription_type".into(),
            value: "GOLD".into()
        })
    );
}

#[test]
fn test_registry_shared_across_pipelines() {
    let mut registry = SchemaRegistry::new();
    let mut a = SerdePipeline::avro(SUBJECT, schema());
    let mut b = SerdePipeline::avro(SUBJECT, schema());
    let event = john(SubscriptionType::Free, 9.2).to_wire();

    let bytes = a.encode(&mut registry, &event).unwrap();
    b.encode(&mut registry, &event).unwrap();

    assert_eq!(a.schema_id(), b.schema_id());
    assert_eq!(registry.len(), 1);
    // Pipeline lain bisa decode frame yang sama
    assert_eq!(b.decode(&registry, &bytes).unwrap(), event);
}
