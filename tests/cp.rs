use std::{
    convert::Infallible,
    fs,
    net::{SocketAddr, TcpListener},
    sync::{Arc, Mutex},
};

use hyper::{
    service::{make_service_fn, service_fn},
    Body, Request, Response, Server, StatusCode,
};
use serde_json::{json, Value};
use shipcopy::{cp, CopyRequest, Docker, Error};
use tar::{Builder, Header};

#[derive(Clone, Debug)]
struct Recorded {
    method: String,
    path: String,
    body: Value,
}

/// Answers every request with the same status and body, remembering what it was asked
struct FakeDaemon {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl FakeDaemon {
    fn start(
        status: StatusCode,
        body: Vec<u8>,
    ) -> FakeDaemon {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = requests.clone();
        let make_svc = make_service_fn(move |_conn| {
            let recorded = recorded.clone();
            let body = body.clone();
            async move {
                Ok::<_, Infallible>(service_fn(move |req: Request<Body>| {
                    let recorded = recorded.clone();
                    let body = body.clone();
                    async move {
                        let method = req.method().to_string();
                        let path = req.uri().path().to_owned();
                        let bytes = hyper::body::to_bytes(req.into_body())
                            .await
                            .unwrap_or_default();
                        recorded.lock().unwrap().push(Recorded {
                            method,
                            path,
                            body: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
                        });
                        Ok::<_, Infallible>(
                            Response::builder()
                                .status(status)
                                .body(Body::from(body))
                                .unwrap(),
                        )
                    }
                }))
            }
        });
        let server = Server::bind(&([127, 0, 0, 1], 0).into()).serve(make_svc);
        let addr = server.local_addr();
        tokio::spawn(server);
        FakeDaemon { addr, requests }
    }

    fn docker(&self) -> Docker {
        Docker::tcp(self.addr.to_string())
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

fn archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut ar = Builder::new(Vec::new());
    for (path, data) in entries {
        let mut header = Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_uid(4242);
        header.set_gid(4242);
        ar.append_data(&mut header, path, *data).unwrap();
    }
    ar.into_inner().unwrap()
}

#[tokio::test]
async fn streams_raw_body_to_stdout() {
    let body = archive(&[("passwd", &b"root:x:0:0:root:/root:/bin/sh\n"[..])]);
    let daemon = FakeDaemon::start(StatusCode::OK, body.clone());
    let request = CopyRequest::parse("mycontainer:/etc/passwd", "-").unwrap();

    let mut out = Vec::new();
    cp::run(&daemon.docker(), &request, &mut out).await.unwrap();

    assert_eq!(out, body);
    let requests = daemon.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/containers/mycontainer/copy");
    assert_eq!(
        requests[0].body,
        json!({"Resource": "/etc/passwd", "HostPath": "-"})
    );
}

#[tokio::test]
async fn large_bodies_arrive_in_order() {
    let body: Vec<u8> = (0..300_000u32).map(|i| (i % 251) as u8).collect();
    let daemon = FakeDaemon::start(StatusCode::OK, body.clone());
    let request = CopyRequest::parse("mycontainer:/blob", "-").unwrap();

    let mut out = Vec::new();
    cp::run(&daemon.docker(), &request, &mut out).await.unwrap();

    assert_eq!(out.len(), body.len());
    assert!(out == body);
}

#[tokio::test]
async fn extracts_archive_into_directory() {
    let scratch = tempfile::tempdir().unwrap();
    let dest = scratch.path().join("out");
    let body = archive(&[("data/x.txt", &b"hello from the container"[..])]);
    let daemon = FakeDaemon::start(StatusCode::OK, body);
    let request = CopyRequest::parse("mycontainer:/data", dest.to_str().unwrap()).unwrap();

    let mut out = Vec::new();
    cp::run(&daemon.docker(), &request, &mut out).await.unwrap();

    assert!(out.is_empty());
    let extracted = dest.join("data").join("x.txt");
    assert_eq!(fs::read(&extracted).unwrap(), b"hello from the container");
    assert_eq!(
        daemon.requests()[0].body,
        json!({"Resource": "/data", "HostPath": dest.to_str().unwrap()})
    );

    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        let host_uid = fs::metadata(scratch.path()).unwrap().uid();
        assert_eq!(fs::metadata(&extracted).unwrap().uid(), host_uid);
        assert_ne!(fs::metadata(&extracted).unwrap().uid(), 4242);
    }
}

#[tokio::test]
async fn unknown_container_is_reported_by_name() {
    let scratch = tempfile::tempdir().unwrap();
    let dest = scratch.path().join("out");
    let daemon = FakeDaemon::start(
        StatusCode::NOT_FOUND,
        br#"{"message":"no such id: ghost"}"#.to_vec(),
    );
    let request = CopyRequest::parse("ghost:/data", dest.to_str().unwrap()).unwrap();

    let mut out = Vec::new();
    match cp::run(&daemon.docker(), &request, &mut out).await {
        Err(Error::ContainerNotFound(id)) => assert_eq!(id, "ghost"),
        other => panic!("expected ContainerNotFound, got {:?}", other),
    }
    assert!(!dest.exists());
    assert!(out.is_empty());
}

#[tokio::test]
async fn malformed_locator_never_reaches_the_daemon() {
    let daemon = FakeDaemon::start(StatusCode::OK, Vec::new());

    for locator in &["mycontainer", "a:b:c"] {
        match CopyRequest::parse(locator, "/tmp/out") {
            Err(Error::InvalidArgument(_)) => {}
            other => panic!("expected InvalidArgument, got {:?}", other),
        }
    }
    assert!(daemon.requests().is_empty());
}

#[tokio::test]
async fn unexpected_status_is_a_fault() {
    let scratch = tempfile::tempdir().unwrap();
    let dest = scratch.path().join("out");
    let daemon = FakeDaemon::start(
        StatusCode::INTERNAL_SERVER_ERROR,
        br#"{"message":"boom"}"#.to_vec(),
    );
    let request = CopyRequest::parse("mycontainer:/data", dest.to_str().unwrap()).unwrap();

    let mut out = Vec::new();
    match cp::run(&daemon.docker(), &request, &mut out).await {
        Err(Error::Fault { code, message }) => {
            assert_eq!(code, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(message, "boom");
        }
        other => panic!("expected Fault, got {:?}", other),
    }
    assert!(!dest.exists());
}

#[tokio::test]
async fn corrupt_archive_fails_with_io_error() {
    let scratch = tempfile::tempdir().unwrap();
    let daemon = FakeDaemon::start(StatusCode::OK, vec![1u8; 100]);
    let request = CopyRequest::parse("mycontainer:/data", scratch.path().to_str().unwrap()).unwrap();

    let mut out = Vec::new();
    match cp::run(&daemon.docker(), &request, &mut out).await {
        Err(Error::IO(_)) => {}
        other => panic!("expected IO error, got {:?}", other),
    }
}

#[tokio::test]
async fn unreachable_daemon_is_a_transport_error() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let docker = Docker::tcp(addr.to_string());
    let request = CopyRequest::parse("mycontainer:/data", "-").unwrap();

    let mut out = Vec::new();
    match cp::run(&docker, &request, &mut out).await {
        Err(Error::Hyper(_)) => {}
        other => panic!("expected Hyper error, got {:?}", other),
    }
}
