//! End-to-end behavior of the main-page / query example tree.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use http::StatusCode;
use ramus::core::{ExtractionSource, MissingKind, TEXT_PLAIN_UTF_8};
use ramus::prelude::*;
use ramus_test::TestClient;

fn query_handler(ctx: &mut RequestContext) -> Result<(), HandlerError> {
    let value = int_parameter("amount").get(ctx)?;
    let square = value
        .checked_mul(value)
        .ok_or_else(|| HandlerError::internal("square overflows i64"))?;
    ctx.complete(format!("The value is {value}. It's square is {square}"))?;
    Ok(())
}

fn example_tree() -> Route {
    get([
        path("", [complete("This is the main page!")]),
        path("query", [handle(query_handler)]),
    ])
}

fn client() -> TestClient {
    TestClient::new(example_tree())
}

fn missing_amount(kind: MissingKind) -> RejectionReason {
    RejectionReason::MissingParameter {
        source_kind: ExtractionSource::Query,
        name: "amount".to_string(),
        kind,
    }
}

#[test]
fn main_page() {
    client()
        .get("/")
        .send()
        .assert_status(StatusCode::OK)
        .assert_content_type(TEXT_PLAIN_UTF_8)
        .assert_body_eq("This is the main page!");
}

#[test]
fn query_with_positive_amount() {
    client()
        .get("/query?amount=5")
        .send()
        .assert_status(StatusCode::OK)
        .assert_body_eq("The value is 5. It's square is 25");
}

#[test]
fn query_with_negative_amount() {
    client()
        .get("/query?amount=-3")
        .send()
        .assert_status(StatusCode::OK)
        .assert_body_eq("The value is -3. It's square is 9");
}

#[test]
fn query_without_amount() {
    client()
        .get("/query")
        .send()
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_primary_reason(&missing_amount(MissingKind::Required))
        .assert_body_eq("Request is missing required query parameter 'amount'");
}

#[test]
fn query_with_malformed_amount() {
    client()
        .get("/query?amount=abc")
        .send()
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_primary_reason(&missing_amount(MissingKind::Malformed));
}

#[test]
fn post_is_not_allowed() {
    let response = client().post("/query?amount=1").send();
    response
        .assert_status(StatusCode::METHOD_NOT_ALLOWED)
        .assert_header("allow", "GET");
    assert!(!response.is_completed());
}

#[test]
fn unknown_path() {
    client()
        .get("/unknown")
        .send()
        .assert_status(StatusCode::NOT_FOUND)
        .assert_primary_reason(&RejectionReason::NotFound);
}

#[test]
fn percent_encoded_path_matches_decoded_route() {
    client()
        .get("/qu%65ry?amount=%2B4")
        .send()
        .assert_status(StatusCode::OK)
        .assert_body_eq("The value is 4. It's square is 16");
}

#[test]
fn overflowing_square_is_internal_error() {
    let response = client().get(format!("/query?amount={}", i64::MAX)).send();
    response
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .assert_body_eq("There was an internal server error.");
}

#[test]
fn trees_built_twice_are_equal() {
    let handler = handle(query_handler);
    let build = || {
        get([
            path("", [complete("This is the main page!")]),
            path("query", [handler.clone()]),
        ])
    };
    assert_eq!(build(), build());
}

#[test]
fn complete_body_round_trips_utf8() {
    let text = "grüße, 世界";
    let response = TestClient::new(complete(text)).get("/").send();
    assert_eq!(response.text().unwrap(), text);
}

#[test]
fn evaluation_is_identical_across_threads() {
    const URIS: [&str; 5] = ["/", "/query?amount=5", "/query", "/query?amount=abc", "/unknown"];
    let router = Router::new(example_tree());

    let run = |router: Router| {
        std::thread::spawn(move || {
            URIS.iter()
                .map(|uri| {
                    let request = Request::builder().uri(*uri).build().unwrap();
                    router.evaluate(request).into_response()
                })
                .collect::<Vec<_>>()
        })
    };

    let a = run(router.clone()).join().unwrap();
    let b = run(router).join().unwrap();
    assert_eq!(a, b);
}

#[test]
fn extraction_parses_once_per_request() {
    let parses = Arc::new(AtomicUsize::new(0));
    let amount = {
        let parses = Arc::clone(&parses);
        Extraction::custom(ExtractionSource::Query, "amount", "counted-int", move |raw| {
            parses.fetch_add(1, Ordering::SeqCst);
            raw.parse::<i64>().map_err(|e| e.to_string())
        })
    };

    let root = handle(move |ctx: &mut RequestContext| -> Result<(), HandlerError> {
        let first = amount.get(ctx)?;
        let second = amount.get(ctx)?;
        assert_eq!(first, second);
        ctx.complete(first.to_string())?;
        Ok(())
    });

    let client = TestClient::new(root);
    client.get("/?amount=7").send().assert_body_eq("7");
    client.get("/?amount=8").send().assert_body_eq("8");
    assert_eq!(parses.load(Ordering::SeqCst), 2);
}

#[test]
fn json_completion_honours_accept() {
    #[derive(serde::Serialize)]
    struct Square {
        value: i64,
        square: i64,
    }

    let root = get([path(
        "square",
        [handle(|ctx: &mut RequestContext| -> Result<(), HandlerError> {
            let value = int_parameter("amount").get(ctx)?;
            ctx.complete_with(&Square { value, square: value * value }, &JsonMarshaller)?;
            Ok(())
        })],
    )]);
    let client = TestClient::new(root);

    let response = client.get("/square?amount=4").send();
    response.assert_status(StatusCode::OK).assert_content_type("application/json");
    assert_eq!(response.json_value().unwrap()["square"], 16);

    client
        .get("/square?amount=4")
        .accept("text/plain")
        .send()
        .assert_status(StatusCode::NOT_ACCEPTABLE);
}
