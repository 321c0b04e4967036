#![cfg(all(feature = "kernel", feature = "wellness", feature = "config"))]

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use holistic_wellness::config::RuntimeConfig;
use holistic_wellness::kernel::{DispatchRequest, DispatchResult, CHAT_AGENTS};
use holistic_wellness::primitives::{
    Capability, CapabilityBuilder, CapabilityRef, FieldType, InputShape, Namespace,
};
use holistic_wellness::runtime::Runtime;
use holistic_wellness::tools::{InvocationOutcome, ToolError};
use serde_json::{Value, json};

fn runtime() -> Runtime {
    Runtime::from_config(&RuntimeConfig::default()).expect("runtime")
}

fn peer(namespace: &str, name: &str, inputs: InputShape) -> Capability {
    Capability::builder(Namespace::new(namespace).unwrap())
        .name(name)
        .map(|b| b.inputs(inputs))
        .and_then(CapabilityBuilder::build)
        .unwrap()
}

#[tokio::test]
async fn no_peers_and_no_self_care_yields_empty_result() {
    let runtime = runtime();
    let result = runtime
        .dispatcher()
        .dispatch(&DispatchRequest::new("anyone there?"))
        .await
        .unwrap();

    assert_eq!(result, DispatchResult::default());
    assert!(result.self_care.is_none());
}

#[tokio::test]
async fn self_care_scores_the_neutral_profile() {
    let runtime = runtime();
    let result = runtime
        .dispatcher()
        .dispatch(&DispatchRequest::new("hi").with_self_care(true))
        .await
        .unwrap();

    let report = result.self_care.unwrap();
    let report = report.result().expect("self-care succeeds");
    assert_eq!(report["wellnessScore"], 67);
    assert_eq!(report["category"], "00124");
    assert_eq!(report["avatarState"], "neutral");
    assert!(
        report["suggestion"]
            .as_str()
            .unwrap()
            .starts_with("Thoughtful coach: ")
    );
}

#[tokio::test]
async fn throwing_peer_is_reported_not_raised() {
    let runtime = runtime();
    runtime
        .registry()
        .register_handler(peer("weather", "chat", InputShape::message()), |_: Value| async move {
            Err::<Value, _>(ToolError::handler("forecast service unreachable"))
        })
        .unwrap();

    let result = runtime
        .dispatcher()
        .dispatch(&DispatchRequest::new("will it rain?"))
        .await
        .unwrap();

    assert_eq!(result.peer_responses.len(), 1);
    assert_eq!(result.peer_responses[0].namespace.as_str(), "weather");
    assert!(!result.peer_responses[0].outcome.is_success());
}

#[tokio::test]
async fn superset_shape_is_not_a_peer() {
    let runtime = runtime();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    runtime
        .registry()
        .register_handler(
            peer("weather", "forecast", InputShape::message().field("extra", FieldType::Number)),
            move |_: Value| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(Value::Null)
                }
            },
        )
        .unwrap();

    let result = runtime
        .dispatcher()
        .dispatch(&DispatchRequest::new("hello"))
        .await
        .unwrap();

    assert!(result.peer_responses.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let runtime = runtime();
    let err = runtime
        .registry()
        .register_handler(
            peer("holistic-wellness", "process_datastream", InputShape::new()),
            |v: Value| async move { Ok(v) },
        )
        .expect_err("duplicate");
    assert!(matches!(err, ToolError::DuplicateCapability { .. }));
}

#[tokio::test]
async fn chat_agents_round_trip_through_the_registry() {
    let runtime = runtime();
    for namespace in ["journal", "coach"] {
        runtime
            .registry()
            .register_handler(peer(namespace, "reply", InputShape::message()), move |args: Value| async move {
                Ok(json!({ "from": namespace, "echo": args["message"] }))
            })
            .unwrap();
    }

    let chat: CapabilityRef = format!("holistic-wellness.{CHAT_AGENTS}").parse().unwrap();
    let outcome = runtime
        .call(&chat, json!({ "message": "rough day", "includeSelfCare": true }))
        .await
        .unwrap();

    let InvocationOutcome::Success { result } = outcome else {
        panic!("chat_agents failed: {outcome:?}");
    };
    let peers = result["peerResponses"].as_array().unwrap();
    let agents: Vec<&str> = peers.iter().map(|p| p["agent"].as_str().unwrap()).collect();
    assert_eq!(agents, vec!["journal", "coach"]);
    assert_eq!(peers[1]["response"]["result"]["echo"], "rough day");
    assert_eq!(result["selfCare"]["status"], "success");
}

#[tokio::test]
async fn chat_agents_keeps_every_peer_when_the_fan_out_outlasts_one_time_limit() {
    let config = RuntimeConfig {
        invocation_timeout_ms: Some(100),
        max_concurrency: NonZeroUsize::new(1).unwrap(),
        ..RuntimeConfig::default()
    };
    let runtime = Runtime::from_config(&config).unwrap();
    for namespace in ["alpha", "beta", "gamma"] {
        runtime
            .registry()
            .register_handler(peer(namespace, "reply", InputShape::message()), move |_: Value| async move {
                tokio::time::sleep(Duration::from_millis(60)).await;
                Ok(json!({ "from": namespace }))
            })
            .unwrap();
    }

    let chat: CapabilityRef = format!("holistic-wellness.{CHAT_AGENTS}").parse().unwrap();
    let outcome = runtime.call(&chat, json!({ "message": "hi" })).await.unwrap();

    let InvocationOutcome::Success { result } = outcome else {
        panic!("fan-out lost: {outcome:?}");
    };
    let peers = result["peerResponses"].as_array().unwrap();
    assert_eq!(peers.len(), 3);
    for (peer, expected) in peers.iter().zip(["alpha", "beta", "gamma"]) {
        assert_eq!(peer["response"]["status"], "success");
        assert_eq!(peer["response"]["result"]["from"], expected);
    }
}

#[tokio::test]
async fn chat_agents_accepts_both_self_care_flags() {
    let runtime = runtime();
    let chat: CapabilityRef = format!("holistic-wellness.{CHAT_AGENTS}").parse().unwrap();
    let outcome = runtime
        .call(
            &chat,
            json!({ "message": "hi", "includeSelfCare": true, "includeSelf": true }),
        )
        .await
        .unwrap();

    let result = outcome.result().expect("both flags accepted");
    assert_eq!(result["selfCare"]["result"]["wellnessScore"], 67);
}

#[tokio::test]
async fn unknown_capability_is_an_explicit_error() {
    let runtime = runtime();
    let missing: CapabilityRef = "weather.get_alerts".parse().unwrap();
    let err = runtime.call(&missing, json!({})).await.unwrap_err();
    assert!(matches!(err, ToolError::NotFound { .. }));
}

#[tokio::test]
async fn isolated_runtimes_do_not_share_registries() {
    let first = runtime();
    let second = runtime();
    first
        .registry()
        .register_handler(peer("echo", "say", InputShape::message()), |v: Value| async move { Ok(v) })
        .unwrap();

    assert_eq!(
        first.registry().len().unwrap(),
        second.registry().len().unwrap() + 1
    );
}
