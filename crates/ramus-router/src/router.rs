//! Route tree evaluation.

use std::sync::Arc;

use ramus_core::{
    CompletionError, HandlerError, Rejection, RejectionReason, Request, RequestContext, Response,
};

use crate::route::{Route, SharedHandler};

/// The result of evaluating a route tree against one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A terminal recorded a response.
    Completed(Response),
    /// Every branch declined.
    Rejected(Rejection),
}

impl Outcome {
    /// Returns `true` for [`Outcome::Completed`].
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Returns the recorded response, if any.
    #[must_use]
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::Completed(response) => Some(response),
            Self::Rejected(_) => None,
        }
    }

    /// Returns the rejection, if any.
    #[must_use]
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Completed(_) => None,
            Self::Rejected(rejection) => Some(rejection),
        }
    }

    /// Converts the outcome into the response written to the client.
    #[must_use]
    pub fn into_response(self) -> Response {
        match self {
            Self::Completed(response) => response,
            Self::Rejected(rejection) => rejection.to_response(),
        }
    }
}

/// Evaluates requests against an immutable route tree.
///
/// A `Router` is cheap to clone and safe to share between threads; each
/// evaluation owns its own [`RequestContext`].
///
/// # Example
///
/// ```
/// use ramus_router::{complete, get, path, Router};
/// use ramus_core::Request;
/// use http::StatusCode;
///
/// let router = Router::new(get([path("", [complete("This is the main page!")])]));
///
/// let request = Request::builder().uri("/").build().unwrap();
/// let response = router.evaluate(request).into_response();
/// assert_eq!(response.status(), StatusCode::OK);
/// assert_eq!(response.body_str(), Some("This is the main page!"));
///
/// let request = Request::builder().uri("/missing").build().unwrap();
/// assert_eq!(router.evaluate(request).into_response().status(), StatusCode::NOT_FOUND);
/// ```
#[derive(Debug, Clone)]
pub struct Router {
    root: Arc<Route>,
}

impl Router {
    /// Creates a router for a route tree.
    #[must_use]
    pub fn new(root: Route) -> Self {
        Self {
            root: Arc::new(root),
        }
    }

    /// Returns the root of the route tree.
    #[must_use]
    pub fn root(&self) -> &Route {
        &self.root
    }

    /// Evaluates a request in a fresh context.
    #[must_use]
    pub fn evaluate(&self, request: Request) -> Outcome {
        let mut ctx = RequestContext::new(request);
        self.evaluate_context(&mut ctx)
    }

    /// Evaluates the request held by `ctx`.
    ///
    /// Use this when the host needs the context's [`CancelHandle`](ramus_core::CancelHandle)
    /// before evaluation starts. If a response was recorded it is the
    /// outcome, whatever the handler returned afterwards.
    pub fn evaluate_context(&self, ctx: &mut RequestContext) -> Outcome {
        let remaining = ctx.request().path();
        let span = tracing::debug_span!(
            "evaluate",
            request_id = %ctx.request_id(),
            method = %ctx.request().method(),
            path = %remaining,
        );
        let _guard = span.enter();

        let result = evaluate_route(&self.root, &remaining, ctx);

        match (ctx.response(), result) {
            (Some(response), _) => {
                tracing::debug!(status = response.status().as_u16(), "request completed");
                Outcome::Completed(response.clone())
            }
            (None, Err(rejection)) => {
                tracing::debug!(
                    status = rejection.status_code().as_u16(),
                    reason = %rejection,
                    "request rejected"
                );
                Outcome::Rejected(rejection)
            }
            (None, Ok(())) => {
                Outcome::Rejected(Rejection::single(RejectionReason::HandlerDidNotComplete))
            }
        }
    }
}

type Evaluation = Result<(), Rejection>;

fn reject(reason: RejectionReason) -> Evaluation {
    Err(Rejection::single(reason))
}

fn evaluate_route(route: &Route, remaining: &str, ctx: &mut RequestContext) -> Evaluation {
    if ctx.is_cancelled() {
        return reject(RejectionReason::Cancelled);
    }

    match route {
        Route::Method { method, children } => {
            if ctx.request().method() == method {
                evaluate_children(children, remaining, ctx)
            } else {
                tracing::trace!(expected = %method, "method guard declined");
                reject(RejectionReason::MethodNotAllowed {
                    allowed: method.clone(),
                })
            }
        }
        Route::Path { pattern, children } => {
            if remaining == pattern.as_ref() {
                evaluate_children(children, "", ctx)
            } else {
                tracing::trace!(pattern = %pattern, remaining, "path guard declined");
                reject(RejectionReason::NotFound)
            }
        }
        Route::Handle(handler) => run_handler(handler, ctx),
        Route::Complete(text) => match ctx.complete(text.as_ref()) {
            Ok(()) => Ok(()),
            Err(err) => completion_failed(err),
        },
    }
}

fn evaluate_children(children: &[Route], remaining: &str, ctx: &mut RequestContext) -> Evaluation {
    if children.is_empty() {
        return reject(RejectionReason::Unmatched);
    }

    let mut rejection = Rejection::new();
    for child in children {
        match evaluate_route(child, remaining, ctx) {
            Ok(()) => return Ok(()),
            Err(declined) => {
                let fatal = declined.is_fatal();
                rejection.merge(declined);
                if fatal {
                    break;
                }
            }
        }
    }
    Err(rejection)
}

fn run_handler(handler: &SharedHandler, ctx: &mut RequestContext) -> Evaluation {
    let result = handler.handler().handle(ctx);

    if ctx.is_completed() {
        if let Err(err) = result {
            tracing::warn!(error = %err, "handler failed after completing; response stands");
        }
        return Ok(());
    }

    match result {
        Ok(()) if ctx.is_cancelled() => reject(RejectionReason::Cancelled),
        Ok(()) => {
            tracing::warn!("handler returned without completing");
            reject(RejectionReason::HandlerDidNotComplete)
        }
        Err(HandlerError::Extraction(err)) => {
            tracing::debug!(error = %err, "extraction failed");
            reject(RejectionReason::from(&err))
        }
        Err(HandlerError::Completion(err)) => completion_failed(err),
        Err(HandlerError::Internal(err)) => {
            tracing::error!(error = %err, "handler failed");
            reject(RejectionReason::HandlerError {
                message: format!("{err:#}"),
            })
        }
    }
}

fn completion_failed(err: CompletionError) -> Evaluation {
    match err {
        CompletionError::AlreadyCompleted => Ok(()),
        CompletionError::Cancelled => reject(RejectionReason::Cancelled),
        CompletionError::UnacceptableContent(unacceptable) => {
            tracing::debug!(offered = %unacceptable.offered, "no acceptable content type");
            reject(RejectionReason::UnacceptableContent {
                accepted: unacceptable.accepted,
            })
        }
        CompletionError::Serialization(message) => {
            tracing::error!(error = %message, "response serialization failed");
            reject(RejectionReason::HandlerError { message })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::{complete, get, handle, path, post};
    use http::{header, Method, StatusCode};
    use proptest::prelude::*;
    use ramus_core::{JsonMarshaller, MissingKind};
    use ramus_extract::int_parameter;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn request(method: Method, uri: &str) -> Request {
        Request::builder().method(method).uri(uri).build().unwrap()
    }

    fn query_handler(ctx: &mut RequestContext) -> Result<(), HandlerError> {
        let amount = int_parameter("amount").get(ctx)?;
        ctx.complete(format!("The amount was {amount}"))?;
        Ok(())
    }

    fn example() -> Router {
        Router::new(get([
            path("", [complete("This is the main page!")]),
            path("query", [handle(query_handler)]),
        ]))
    }

    fn evaluate(router: &Router, method: Method, uri: &str) -> Response {
        router.evaluate(request(method, uri)).into_response()
    }

    #[test]
    fn test_root_completes() {
        let response = evaluate(&example(), Method::GET, "/");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.content_type(), Some("text/plain; charset=utf-8"));
        assert_eq!(response.body_str(), Some("This is the main page!"));
    }

    #[test]
    fn test_query_extraction() {
        let response = evaluate(&example(), Method::GET, "/query?amount=5");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body_str(), Some("The amount was 5"));
    }

    #[test]
    fn test_missing_and_malformed_parameter() {
        let router = example();

        let outcome = router.evaluate(request(Method::GET, "/query"));
        let Outcome::Rejected(rejection) = &outcome else {
            panic!("expected rejection");
        };
        assert!(matches!(
            rejection.primary(),
            Some(RejectionReason::MissingParameter { name, kind: MissingKind::Required, .. }) if name == "amount"
        ));
        assert_eq!(outcome.into_response().status(), StatusCode::BAD_REQUEST);

        let response = evaluate(&router, Method::GET, "/query?amount=abc");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.body_str(),
            Some("The query parameter 'amount' was malformed")
        );
    }

    #[test]
    fn test_unknown_path_and_wrong_method() {
        let router = example();
        assert_eq!(
            evaluate(&router, Method::GET, "/nope").status(),
            StatusCode::NOT_FOUND
        );

        let response = evaluate(&router, Method::POST, "/");
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(header::ALLOW).unwrap(), "GET");
    }

    #[test]
    fn test_first_completing_sibling_wins() {
        let router = Router::new(get([path("", [complete("a"), complete("b")])]));
        assert_eq!(evaluate(&router, Method::GET, "/").body_str(), Some("a"));
    }

    #[test]
    fn test_not_found_beats_method_not_allowed() {
        let siblings = [post([complete("posted")]), path("x", [complete("x")])];
        let mut ctx = RequestContext::new(request(Method::GET, "/y"));
        let rejection = evaluate_children(&siblings, "y", &mut ctx).unwrap_err();
        assert_eq!(rejection.reasons().len(), 2);
        assert_eq!(rejection.primary(), Some(&RejectionReason::NotFound));

        let router = Router::new(path("", [post([complete("posted")])]));
        let outcome = router.evaluate(request(Method::GET, "/"));
        assert_eq!(
            outcome.into_response().status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[test]
    fn test_guard_without_children_declines() {
        let router = Router::new(get([]));
        let outcome = router.evaluate(request(Method::GET, "/"));
        assert_eq!(
            outcome.rejection().unwrap().reasons(),
            &[RejectionReason::Unmatched]
        );
        assert_eq!(outcome.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_handler_without_completion_is_internal_error() {
        let router = Router::new(handle(|_: &mut RequestContext| -> Result<(), HandlerError> { Ok(()) }));
        let response = evaluate(&router, Method::GET, "/");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body_str(), Some("There was an internal server error."));
    }

    #[test]
    fn test_handler_error_stops_siblings() {
        let later = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&later);
        let router = Router::new(get([
            handle(|_: &mut RequestContext| -> Result<(), HandlerError> {
                Err(HandlerError::internal("disk on fire"))
            }),
            handle(move |ctx: &mut RequestContext| -> Result<(), HandlerError> {
                counter.fetch_add(1, Ordering::SeqCst);
                ctx.complete("fallback")?;
                Ok(())
            }),
        ]));

        let response = evaluate(&router, Method::GET, "/");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!response.body_str().unwrap().contains("disk"));
        assert_eq!(later.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_did_not_complete_falls_through_to_sibling() {
        let router = Router::new(get([
            handle(|_: &mut RequestContext| -> Result<(), HandlerError> { Ok(()) }),
            complete("second"),
        ]));
        assert_eq!(evaluate(&router, Method::GET, "/").body_str(), Some("second"));
    }

    #[test]
    fn test_response_stands_when_handler_fails_after_completing() {
        let router = Router::new(handle(|ctx: &mut RequestContext| -> Result<(), HandlerError> {
            ctx.complete("first")?;
            ctx.complete("second")?;
            Ok(())
        }));

        let response = evaluate(&router, Method::GET, "/");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body_str(), Some("first"));
    }

    #[test]
    fn test_unacceptable_content_is_406() {
        let router = Router::new(handle(|ctx: &mut RequestContext| -> Result<(), HandlerError> {
            ctx.complete_with(&vec![1, 2, 3], &JsonMarshaller)?;
            Ok(())
        }));
        let request = Request::builder()
            .uri("/")
            .header("accept", "text/html")
            .build()
            .unwrap();

        let response = router.evaluate(request).into_response();
        assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
    }

    #[test]
    fn test_serialization_failure_is_500() {
        let router = Router::new(handle(|ctx: &mut RequestContext| -> Result<(), HandlerError> {
            let keyed_by_tuple = std::collections::BTreeMap::from([((1, 2), 3)]);
            ctx.complete_with(&keyed_by_tuple, &JsonMarshaller)?;
            Ok(())
        }));

        let outcome = router.evaluate(request(Method::GET, "/"));
        assert!(matches!(
            outcome.rejection().and_then(Rejection::primary),
            Some(RejectionReason::HandlerError { .. })
        ));
        let response = outcome.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body_str(), Some("There was an internal server error."));
    }

    #[test]
    fn test_cancelled_context_is_rejected() {
        let router = example();
        let mut ctx = RequestContext::new(request(Method::GET, "/"));
        ctx.cancel_handle().cancel();

        let outcome = router.evaluate_context(&mut ctx);
        assert_eq!(
            outcome.rejection().unwrap().primary(),
            Some(&RejectionReason::Cancelled)
        );
        assert!(!ctx.is_completed());
    }

    #[test]
    fn test_cancel_during_handler_stops_siblings() {
        let router = Router::new(get([
            handle(|ctx: &mut RequestContext| -> Result<(), HandlerError> {
                ctx.cancel_handle().cancel();
                ctx.complete("too late")?;
                Ok(())
            }),
            complete("never"),
        ]));

        let outcome = router.evaluate(request(Method::GET, "/"));
        assert_eq!(
            outcome.rejection().unwrap().primary(),
            Some(&RejectionReason::Cancelled)
        );
    }

    #[test]
    fn test_memo_is_shared_across_siblings() {
        let parses = Arc::new(AtomicUsize::new(0));
        let counting = {
            let parses = Arc::clone(&parses);
            ramus_extract::Extraction::custom(
                ramus_core::ExtractionSource::Query,
                "n",
                "counted",
                move |raw| {
                    parses.fetch_add(1, Ordering::SeqCst);
                    raw.parse::<i64>().map_err(|e| e.to_string())
                },
            )
        };
        let first = counting.clone();
        let router = Router::new(get([
            handle(move |ctx: &mut RequestContext| -> Result<(), HandlerError> {
                let _ = first.get(ctx)?;
                Ok(())
            }),
            handle(move |ctx: &mut RequestContext| -> Result<(), HandlerError> {
                let n = counting.get(ctx)?;
                ctx.complete(n.to_string())?;
                Ok(())
            }),
        ]));

        let response = evaluate(&router, Method::GET, "/?n=4");
        assert_eq!(response.body_str(), Some("4"));
        assert_eq!(parses.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_evaluation_is_deterministic() {
        let router = example();
        let threads: Vec<_> = (0..2)
            .map(|_| {
                let router = router.clone();
                std::thread::spawn(move || {
                    (0..50)
                        .map(|_| evaluate(&router, Method::GET, "/query?amount=5"))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for thread in threads {
            for response in thread.join().unwrap() {
                assert_eq!(response.body_str(), Some("The amount was 5"));
            }
        }
    }

    fn declining_branch() -> impl Strategy<Value = Route> {
        prop_oneof![
            Just(post([complete("posted")])),
            Just(path("elsewhere", [complete("x")])),
            Just(get([])),
            Just(handle(query_handler)),
        ]
    }

    proptest! {
        #[test]
        fn prop_primary_reason_ignores_sibling_order(
            branches in prop::collection::vec(declining_branch(), 1..6)
                .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
        ) {
            let (original, shuffled) = branches;
            let a = Router::new(get(original)).evaluate(request(Method::GET, "/"));
            let b = Router::new(get(shuffled)).evaluate(request(Method::GET, "/"));

            let rank = |outcome: &Outcome| {
                outcome.rejection().and_then(Rejection::primary).map(RejectionReason::specificity)
            };
            prop_assert_eq!(rank(&a), rank(&b));
            prop_assert_eq!(a.into_response().status(), b.into_response().status());
        }
    }
}
