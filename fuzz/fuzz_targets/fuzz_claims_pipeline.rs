//! Fuzz target for the create/decode pipeline.
//!
//! Builds principals and hook-added claims from arbitrary input and checks
//! that every created token decodes back to the same claims.
//!
//! Run with:
//! cargo +nightly fuzz run fuzz_claims_pipeline -- -max_total_time=600

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use serde_json::json;
use std::sync::Arc;
use xavyo_jwt::{ClaimsExt, HookDispatcher, JwtManager, SimplePrincipal, UnsignedEncoder};

/// Arbitrary input for one pipeline run
#[derive(Arbitrary, Debug)]
struct PipelineInput {
    username: String,
    roles: Vec<String>,
    extra_claims: Vec<(String, String, i32)>,
}

fuzz_target!(|input: PipelineInput| {
    // Skip very long strings to avoid memory issues
    if input.username.len() > 1000 || input.roles.len() > 32 || input.extra_claims.len() > 32 {
        return;
    }

    let dispatcher = Arc::new(HookDispatcher::new());
    for (name, value, priority) in input.extra_claims {
        if name == "roles" || name == "username" {
            continue;
        }
        dispatcher.subscribe_created(name.clone(), priority, move |event| {
            event.data_mut().insert(name.clone(), json!(value));
        });
    }

    let manager = JwtManager::new(UnsignedEncoder::new(), dispatcher);
    let principal = SimplePrincipal::new(input.username.as_str()).with_roles(input.roles.clone());

    let Ok(token) = manager.create(&principal) else {
        return;
    };
    let claims = manager.decode(&token).expect("created token must decode");

    assert_eq!(claims.str_claim("username"), Some(input.username.as_str()));
    assert_eq!(
        claims.roles(),
        input.roles.iter().map(String::as_str).collect::<Vec<_>>()
    );
});
