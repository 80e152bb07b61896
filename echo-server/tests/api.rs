use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use echo_server::{config::EchoConfig, mux, server, DEFAULT_MAX_ECHO_BYTES};
use http_body_util::BodyExt;
use service_core::Phase;
use tokio::sync::oneshot;
use tower::ServiceExt;

fn app() -> Router {
    mux(DEFAULT_MAX_ECHO_BYTES)
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

#[tokio::test]
async fn post_hello_is_echoed() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/user")
                .body(Body::from("hello"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await, "hello");
}

#[tokio::test]
async fn any_method_is_accepted() {
    for method in ["GET", "PUT", "DELETE", "PATCH"] {
        let resp = app()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri("/user")
                    .body(Body::from(method))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{method}");
        assert_eq!(body_bytes(resp).await, method);
    }
}

#[tokio::test]
async fn binary_body_is_echoed_verbatim() {
    let payload: Vec<u8> = (0..=255).collect();
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/user")
                .body(Body::from(payload.clone()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_bytes(resp).await.to_vec(), payload);
}

#[tokio::test]
async fn body_past_cap_is_not_buffered() {
    let resp = mux(8)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/user")
                .body(Body::from(vec![b'a'; 4096]))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn other_paths_are_404() {
    let resp = app()
        .oneshot(Request::builder().uri("/users").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn echo_over_real_socket() {
    use clap::Parser;

    let config = EchoConfig::parse_from(["echo-server", "--bind", "127.0.0.1:0"]);
    let service = server::start(&config).await.unwrap();
    let addr = service.local_addr().unwrap();
    let mut phases = service.subscribe();

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(service.serve(async move {
        let _ = stop_rx.await;
    }));
    phases.wait_for(|p| *p == Phase::Running).await.unwrap();

    let echoed = tokio::task::spawn_blocking(move || {
        let mut resp = ureq::post(&format!("http://{addr}/user"))
            .send("hello".as_bytes())
            .unwrap();
        resp.body_mut().read_to_string().unwrap()
    })
    .await
    .unwrap();
    assert_eq!(echoed, "hello");

    stop_tx.send(()).unwrap();
    handle.await.unwrap().unwrap();
    assert_eq!(*phases.borrow(), Phase::Stopped);
}
