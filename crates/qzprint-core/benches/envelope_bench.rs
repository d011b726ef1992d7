//! Criterion benchmarks for building and encoding print requests.
//!
//! A receipt print builds one job, merges its options, wraps it in a request
//! envelope and serialises it.  This measures that hot path for a typical
//! receipt-sized HTML document and for the handshake challenge digest.
//!
//! Run with:
//! ```bash
//! cargo bench --package qzprint-core --bench envelope_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use qzprint_core::{
    handshake_challenge, AgentCall, AgentRequest, PrintJob, PrintKind, PrintOptions,
};
use serde_json::json;

fn receipt_html() -> String {
    let mut html = String::from("<html><body><table>");
    for line in 0..40 {
        html.push_str(&format!("<tr><td>Item {line}</td><td>1</td><td>2.50</td></tr>"));
    }
    html.push_str("</table></body></html>");
    html
}

fn bench_encode_print_request(c: &mut Criterion) {
    let html = receipt_html();
    let options = PrintOptions::new().with("copies", 1);

    c.bench_function("encode_print_request", |b| {
        b.iter(|| {
            let job = PrintJob::new("XP-80C", black_box(html.as_str()), PrintKind::Pixel);
            let req = AgentRequest::new(AgentCall::Print, job.to_params(&options));
            black_box(req.encode())
        })
    });
}

fn bench_handshake_challenge(c: &mut Criterion) {
    let params = json!({ "certificate": "-----BEGIN CERTIFICATE-----\nMIID...\n-----END CERTIFICATE-----" });

    c.bench_function("handshake_challenge", |b| {
        b.iter(|| handshake_challenge("websocket.handshake", black_box(&params), 1_700_000_000_000))
    });
}

criterion_group!(benches, bench_encode_print_request, bench_handshake_challenge);
criterion_main!(benches);
