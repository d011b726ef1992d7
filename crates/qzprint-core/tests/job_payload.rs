//! Integration tests for the print job payload.
//!
//! These tests build jobs through the public API and check the exact JSON the
//! agent receives inside a `print` request envelope, exercising the job model,
//! option merging, and the request envelope together.

use qzprint_core::{
    AgentCall, AgentReply, AgentRequest, PrintJob, PrintKind, PrintOptions, SignAlgorithm,
};
use serde_json::{json, Value};

/// Wraps a job in a `print` request and parses the encoded frame back as
/// generic JSON, the way the agent sees it.
fn as_agent_sees_it(job: &PrintJob, options: &PrintOptions) -> Value {
    let req = AgentRequest::new(AgentCall::Print, job.to_params(options));
    let frame = req.encode().expect("encode must succeed");
    serde_json::from_str(&frame).expect("frame must be valid JSON")
}

#[test]
fn test_receipt_job_frame_has_expected_shape() {
    // Arrange: an HTML receipt for the default thermal printer
    let html = "<html><body><div class=\"pos-receipt-print\">Total 12.50</div></body></html>";
    let job = PrintJob::new("XP-80C", html, PrintKind::Pixel);

    // Act
    let frame = as_agent_sees_it(&job, &PrintOptions::new());

    // Assert
    assert_eq!(frame["call"], "print");
    assert_eq!(
        frame["params"],
        json!({
            "printer": { "name": "XP-80C" },
            "options": { "scaleContent": false },
            "data": [{
                "type": "pixel",
                "format": "html",
                "flavor": "plain",
                "data": html,
            }],
        })
    );
}

#[test]
fn test_raw_job_frame_uses_command_format() {
    let job = PrintJob::new("Zebra GK420d", "^XA^FO50,50^FDqz^FS^XZ", PrintKind::Raw);

    let frame = as_agent_sees_it(&job, &PrintOptions::new());

    let entry = &frame["params"]["data"][0];
    assert_eq!(entry["type"], "raw");
    assert_eq!(entry["format"], "command");
    assert_eq!(entry["flavor"], "plain");
}

#[test]
fn test_caller_options_reach_the_frame() {
    let job = PrintJob::new("XP-80C", "<p/>", PrintKind::Pixel);
    let options = PrintOptions::new().with("copies", 2).with("scaleContent", true);

    let frame = as_agent_sees_it(&job, &options);

    assert_eq!(frame["params"]["options"]["copies"], 2);
    assert_eq!(frame["params"]["options"]["scaleContent"], true);
}

#[test]
fn test_kind_mapping_holds_for_every_kind() {
    for kind in [PrintKind::Pixel, PrintKind::Raw] {
        let job = PrintJob::new("p", "d", kind);
        let entry = job.entry();
        let expected_format = if kind == PrintKind::Pixel { "html" } else { "command" };
        assert_eq!(entry["format"], expected_format, "kind {kind}");
        assert_eq!(entry["flavor"], "plain", "kind {kind}");
    }
}

#[test]
fn test_handshake_frame_round_trips_through_agent_parser() {
    // Arrange: the frame a client sends right after the socket opens
    let req = AgentRequest::new(AgentCall::Handshake, json!({ "certificate": "PEM" }))
        .with_signature("sig==".to_string(), SignAlgorithm::Sha1);

    // Act: a fake agent parses the frame into the same struct
    let parsed: AgentRequest = serde_json::from_str(&req.encode().unwrap()).unwrap();

    // Assert
    assert_eq!(parsed.agent_call(), Some(AgentCall::Handshake));
    assert_eq!(parsed.challenge(), req.challenge());
    assert_eq!(parsed.sign_algorithm, Some(SignAlgorithm::Sha1));
}

#[test]
fn test_agent_error_reply_becomes_err() {
    let frame = r#"{"uid":"42","error":"Specified printer could not be found."}"#;
    let reply = AgentReply::decode(frame).unwrap();
    assert_eq!(reply.uid, "42");
    assert_eq!(
        reply.into_result(),
        Err("Specified printer could not be found.".to_string())
    );
}
